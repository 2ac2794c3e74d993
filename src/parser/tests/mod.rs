//! Parser test suite

mod grammar;
