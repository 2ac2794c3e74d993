//! Abstract syntax tree for CORBA IDL
//!
//! The parser produces this tree; the C++ emitter consumes it by
//! exhaustive pattern matching. Nodes own their children outright (a
//! strict tree, no back-edges), carry the source location they were
//! parsed at, and — for definitions — the fully qualified name computed
//! from the scope stack at binding time.

use crate::common::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== TYPES ====================

/// IDL basic types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicType {
    Void,
    Boolean,
    Char,
    WChar,
    Octet,
    Short,
    UShort,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    LongDouble,
    Any,
    Object,
}

impl BasicType {
    /// The IDL spelling of the type, for diagnostics.
    pub fn idl_name(&self) -> &'static str {
        match self {
            BasicType::Void => "void",
            BasicType::Boolean => "boolean",
            BasicType::Char => "char",
            BasicType::WChar => "wchar",
            BasicType::Octet => "octet",
            BasicType::Short => "short",
            BasicType::UShort => "unsigned short",
            BasicType::Long => "long",
            BasicType::ULong => "unsigned long",
            BasicType::LongLong => "long long",
            BasicType::ULongLong => "unsigned long long",
            BasicType::Float => "float",
            BasicType::Double => "double",
            BasicType::LongDouble => "long double",
            BasicType::Any => "any",
            BasicType::Object => "Object",
        }
    }
}

/// A type specification with its source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Type {
    pub kind: TypeKind,
    pub loc: SourceLocation,
}

/// Type specification variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    Basic(BasicType),
    /// `sequence<T>` or `sequence<T, bound>`
    Sequence {
        element: Box<Type>,
        bound: Option<u64>,
    },
    /// `string`, `string<bound>`, `wstring`, `wstring<bound>`
    Str {
        bound: Option<u64>,
        wide: bool,
    },
    /// A possibly-absolute scoped name such as `::M::S`
    ScopedName {
        parts: Vec<String>,
        absolute: bool,
    },
    /// Fixed array with one extent per dimension, outermost first
    Array {
        element: Box<Type>,
        dims: Vec<u64>,
    },
}

impl Type {
    pub fn new(kind: TypeKind, loc: SourceLocation) -> Self {
        Self { kind, loc }
    }

    pub fn basic(basic: BasicType, loc: SourceLocation) -> Self {
        Self::new(TypeKind::Basic(basic), loc)
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Basic(BasicType::Void))
    }
}

/// Render a scoped name with `::` separators, keeping a leading `::`.
pub fn scoped_name_to_string(parts: &[String], absolute: bool) -> String {
    let joined = parts.join("::");
    if absolute {
        format!("::{joined}")
    } else {
        joined
    }
}

// ==================== CONSTANT VALUES ====================

/// A compile-time constant value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl ConstValue {
    /// Interpret the value as an unsigned extent or bound.
    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            ConstValue::Int(v) => Some(*v as u64),
            ConstValue::UInt(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::UInt(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{v}"),
            ConstValue::Str(s) => write!(f, "{s:?}"),
            ConstValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

// ==================== DEFINITIONS ====================

/// A named declarator with optional array extents: `name` or `name[2][3]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub name: String,
    pub dims: Vec<u64>,
}

/// One member of a struct or exception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructMember {
    pub ty: Type,
    pub name: String,
    pub loc: SourceLocation,
}

/// `module Name { ... };` — re-openable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub fq_name: String,
    pub definitions: Vec<Definition>,
    pub loc: SourceLocation,
}

/// `interface Name : Base { ... };` or a forward declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub fq_name: String,
    pub bases: Vec<String>,
    pub contents: Vec<Definition>,
    pub is_abstract: bool,
    pub is_local: bool,
    pub is_forward: bool,
    pub loc: SourceLocation,
}

/// `struct Name { ... };` (a forward declaration has no members)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Struct {
    pub name: String,
    pub fq_name: String,
    pub members: Vec<StructMember>,
    pub loc: SourceLocation,
}

/// `enum Name { A, B, C };`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    pub name: String,
    pub fq_name: String,
    pub enumerators: Vec<String>,
    pub loc: SourceLocation,
}

/// `typedef <type> name[, name2[N], ...];`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typedef {
    pub name: String,
    pub fq_name: String,
    pub original: Type,
    pub declarators: Vec<Declarator>,
    pub loc: SourceLocation,
}

/// `const <type> name = <value>;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Const {
    pub name: String,
    pub fq_name: String,
    pub ty: Type,
    pub value: ConstValue,
    pub loc: SourceLocation,
}

/// `exception Name { ... };` (members may be empty)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exception {
    pub name: String,
    pub fq_name: String,
    pub members: Vec<StructMember>,
    pub loc: SourceLocation,
}

/// A union case label: `default:` or `case <value>:`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaseLabel {
    Default,
    Value(ConstValue),
}

/// One union branch with its labels and member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionCase {
    pub labels: Vec<CaseLabel>,
    pub ty: Type,
    pub name: String,
    pub loc: SourceLocation,
}

/// `union Name switch (<type>) { ... };`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Union {
    pub name: String,
    pub fq_name: String,
    pub discriminator: Type,
    pub cases: Vec<UnionCase>,
    pub loc: SourceLocation,
}

/// Parameter passing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamDirection {
    In,
    Out,
    InOut,
}

/// One operation parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub direction: ParamDirection,
    pub ty: Type,
    pub name: String,
    pub loc: SourceLocation,
}

/// An interface operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub fq_name: String,
    pub return_type: Type,
    pub parameters: Vec<Parameter>,
    pub raises: Vec<String>,
    pub is_oneway: bool,
    pub loc: SourceLocation,
}

/// An interface attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub fq_name: String,
    pub ty: Type,
    pub is_readonly: bool,
    pub loc: SourceLocation,
}

/// Any named definition, at top level or nested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Definition {
    Module(Module),
    Interface(Interface),
    Struct(Struct),
    Enum(Enum),
    Typedef(Typedef),
    Const(Const),
    Exception(Exception),
    Union(Union),
    Operation(Operation),
    Attribute(Attribute),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Module(d) => &d.name,
            Definition::Interface(d) => &d.name,
            Definition::Struct(d) => &d.name,
            Definition::Enum(d) => &d.name,
            Definition::Typedef(d) => &d.name,
            Definition::Const(d) => &d.name,
            Definition::Exception(d) => &d.name,
            Definition::Union(d) => &d.name,
            Definition::Operation(d) => &d.name,
            Definition::Attribute(d) => &d.name,
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            Definition::Module(d) => &d.loc,
            Definition::Interface(d) => &d.loc,
            Definition::Struct(d) => &d.loc,
            Definition::Enum(d) => &d.loc,
            Definition::Typedef(d) => &d.loc,
            Definition::Const(d) => &d.loc,
            Definition::Exception(d) => &d.loc,
            Definition::Union(d) => &d.loc,
            Definition::Operation(d) => &d.loc,
            Definition::Attribute(d) => &d.loc,
        }
    }
}

/// Root of a parsed IDL file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub filename: String,
    pub definitions: Vec<Definition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_name_rendering() {
        let parts = vec!["M".to_string(), "S".to_string()];
        assert_eq!(scoped_name_to_string(&parts, false), "M::S");
        assert_eq!(scoped_name_to_string(&parts, true), "::M::S");
    }

    #[test]
    fn const_value_as_unsigned() {
        assert_eq!(ConstValue::Int(16).as_unsigned(), Some(16));
        assert_eq!(ConstValue::UInt(3).as_unsigned(), Some(3));
        assert_eq!(ConstValue::Str("x".into()).as_unsigned(), None);
        assert_eq!(ConstValue::Bool(true).as_unsigned(), None);
    }

    #[test]
    fn idl_names_spell_multi_word_types() {
        assert_eq!(BasicType::ULongLong.idl_name(), "unsigned long long");
        assert_eq!(BasicType::LongDouble.idl_name(), "long double");
        assert_eq!(BasicType::Octet.idl_name(), "octet");
    }

    #[test]
    fn void_detection() {
        let loc = SourceLocation::start_of("t.idl");
        assert!(Type::basic(BasicType::Void, loc.clone()).is_void());
        assert!(!Type::basic(BasicType::Long, loc).is_void());
    }
}
