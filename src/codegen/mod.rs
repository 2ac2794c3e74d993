//! Code generation backends
//!
//! One backend: C++11 headers (and an optional implementation file)
//! following the IDL to C++11 language mapping.

pub mod cpp;

pub use cpp::{CppGenerator, GeneratorConfig};
