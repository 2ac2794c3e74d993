//! Token definitions for the IDL lexer

use crate::common::SourceLocation;
use serde::{Deserialize, Serialize};

/// Token kinds recognized by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // End of file
    Eof,

    // Literals
    Identifier,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,
    WideStringLiteral,
    WideCharLiteral,

    // Keywords
    KwModule,
    KwInterface,
    KwStruct,
    KwUnion,
    KwSwitch,
    KwCase,
    KwDefault,
    KwEnum,
    KwConst,
    KwTypedef,
    KwException,
    KwAttribute,
    KwReadonly,
    KwIn,
    KwOut,
    KwInout,
    KwOneway,
    KwRaises,
    KwContext,
    KwSequence,
    KwString,
    KwWstring,
    KwFixed,
    KwAbstract,
    KwLocal,
    KwNative,
    KwValuetype,
    KwTruncatable,
    KwSupports,
    KwPublic,
    KwPrivate,
    KwFactory,
    KwCustom,

    // Basic type keywords
    KwVoid,
    KwBoolean,
    KwChar,
    KwWchar,
    KwOctet,
    KwShort,
    KwLong,
    KwFloat,
    KwDouble,
    KwUnsigned,
    KwAny,
    KwObject,
    KwTrue,
    KwFalse,

    // Punctuation
    Semicolon,
    Colon,
    DoubleColon,
    Comma,
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftAngle,
    RightAngle,
    Equals,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    LeftShift,
    RightShift,

    // Preprocessor artifacts
    Pragma,
    LineDirective,
    Unknown,
}

/// Decoded literal payload attached to a token
///
/// Integer literals that fit a signed 64-bit value decode to `Int`;
/// larger ones (hex masks like `0xFFFFFFFFFFFFFFFF`) decode to `UInt`
/// so no bit pattern is reinterpreted at the token layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum TokenValue {
    #[default]
    None,
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Char(char),
}

/// A token with its kind, decoded value, original text, and location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub text: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            value: TokenValue::None,
            text: text.into(),
            location,
        }
    }

    pub fn with_value(
        kind: TokenKind,
        value: TokenValue,
        text: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self {
            kind,
            value,
            text: text.into(),
            location,
        }
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self::new(TokenKind::Eof, "", location)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Map an identifier to its keyword kind, if any.
///
/// `TRUE`/`FALSE` and `true`/`false` both map to the boolean keywords.
pub fn lookup_keyword(name: &str) -> Option<TokenKind> {
    let kind = match name {
        "module" => TokenKind::KwModule,
        "interface" => TokenKind::KwInterface,
        "struct" => TokenKind::KwStruct,
        "union" => TokenKind::KwUnion,
        "switch" => TokenKind::KwSwitch,
        "case" => TokenKind::KwCase,
        "default" => TokenKind::KwDefault,
        "enum" => TokenKind::KwEnum,
        "const" => TokenKind::KwConst,
        "typedef" => TokenKind::KwTypedef,
        "exception" => TokenKind::KwException,
        "attribute" => TokenKind::KwAttribute,
        "readonly" => TokenKind::KwReadonly,
        "in" => TokenKind::KwIn,
        "out" => TokenKind::KwOut,
        "inout" => TokenKind::KwInout,
        "oneway" => TokenKind::KwOneway,
        "raises" => TokenKind::KwRaises,
        "context" => TokenKind::KwContext,
        "sequence" => TokenKind::KwSequence,
        "string" => TokenKind::KwString,
        "wstring" => TokenKind::KwWstring,
        "fixed" => TokenKind::KwFixed,
        "abstract" => TokenKind::KwAbstract,
        "local" => TokenKind::KwLocal,
        "native" => TokenKind::KwNative,
        "valuetype" => TokenKind::KwValuetype,
        "truncatable" => TokenKind::KwTruncatable,
        "supports" => TokenKind::KwSupports,
        "public" => TokenKind::KwPublic,
        "private" => TokenKind::KwPrivate,
        "factory" => TokenKind::KwFactory,
        "custom" => TokenKind::KwCustom,
        "void" => TokenKind::KwVoid,
        "boolean" => TokenKind::KwBoolean,
        "char" => TokenKind::KwChar,
        "wchar" => TokenKind::KwWchar,
        "octet" => TokenKind::KwOctet,
        "short" => TokenKind::KwShort,
        "long" => TokenKind::KwLong,
        "float" => TokenKind::KwFloat,
        "double" => TokenKind::KwDouble,
        "unsigned" => TokenKind::KwUnsigned,
        "any" => TokenKind::KwAny,
        "Object" => TokenKind::KwObject,
        "TRUE" | "true" => TokenKind::KwTrue,
        "FALSE" | "false" => TokenKind::KwFalse,
        _ => return None,
    };
    Some(kind)
}

impl TokenKind {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            KwModule
                | KwInterface
                | KwStruct
                | KwUnion
                | KwSwitch
                | KwCase
                | KwDefault
                | KwEnum
                | KwConst
                | KwTypedef
                | KwException
                | KwAttribute
                | KwReadonly
                | KwIn
                | KwOut
                | KwInout
                | KwOneway
                | KwRaises
                | KwContext
                | KwSequence
                | KwString
                | KwWstring
                | KwFixed
                | KwAbstract
                | KwLocal
                | KwNative
                | KwValuetype
                | KwTruncatable
                | KwSupports
                | KwPublic
                | KwPrivate
                | KwFactory
                | KwCustom
                | KwVoid
                | KwBoolean
                | KwChar
                | KwWchar
                | KwOctet
                | KwShort
                | KwLong
                | KwFloat
                | KwDouble
                | KwUnsigned
                | KwAny
                | KwObject
                | KwTrue
                | KwFalse
        )
    }

    /// Check if this token is a literal (identifiers included)
    pub fn is_literal(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Identifier
                | IntegerLiteral
                | FloatLiteral
                | StringLiteral
                | CharLiteral
                | WideStringLiteral
                | WideCharLiteral
        )
    }

    /// Check if this token is an arithmetic or bitwise operator
    pub fn is_operator(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Plus | Minus
                | Star
                | Slash
                | Percent
                | Ampersand
                | Pipe
                | Caret
                | Tilde
                | LeftShift
                | RightShift
        )
    }

    /// Get the string representation of the token kind
    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Eof => "<eof>",
            Identifier => "<identifier>",
            IntegerLiteral => "<integer>",
            FloatLiteral => "<float>",
            StringLiteral => "<string>",
            CharLiteral => "<char>",
            WideStringLiteral => "<wstring>",
            WideCharLiteral => "<wchar>",
            KwModule => "module",
            KwInterface => "interface",
            KwStruct => "struct",
            KwUnion => "union",
            KwSwitch => "switch",
            KwCase => "case",
            KwDefault => "default",
            KwEnum => "enum",
            KwConst => "const",
            KwTypedef => "typedef",
            KwException => "exception",
            KwAttribute => "attribute",
            KwReadonly => "readonly",
            KwIn => "in",
            KwOut => "out",
            KwInout => "inout",
            KwOneway => "oneway",
            KwRaises => "raises",
            KwContext => "context",
            KwSequence => "sequence",
            KwString => "string",
            KwWstring => "wstring",
            KwFixed => "fixed",
            KwAbstract => "abstract",
            KwLocal => "local",
            KwNative => "native",
            KwValuetype => "valuetype",
            KwTruncatable => "truncatable",
            KwSupports => "supports",
            KwPublic => "public",
            KwPrivate => "private",
            KwFactory => "factory",
            KwCustom => "custom",
            KwVoid => "void",
            KwBoolean => "boolean",
            KwChar => "char",
            KwWchar => "wchar",
            KwOctet => "octet",
            KwShort => "short",
            KwLong => "long",
            KwFloat => "float",
            KwDouble => "double",
            KwUnsigned => "unsigned",
            KwAny => "any",
            KwObject => "Object",
            KwTrue => "TRUE",
            KwFalse => "FALSE",
            Semicolon => ";",
            Colon => ":",
            DoubleColon => "::",
            Comma => ",",
            LeftBrace => "{",
            RightBrace => "}",
            LeftParen => "(",
            RightParen => ")",
            LeftBracket => "[",
            RightBracket => "]",
            LeftAngle => "<",
            RightAngle => ">",
            Equals => "=",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Ampersand => "&",
            Pipe => "|",
            Caret => "^",
            Tilde => "~",
            LeftShift => "<<",
            RightShift => ">>",
            Pragma => "#pragma",
            LineDirective => "#line",
            Unknown => "<unknown>",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_hits_and_misses() {
        assert_eq!(lookup_keyword("module"), Some(TokenKind::KwModule));
        assert_eq!(lookup_keyword("Object"), Some(TokenKind::KwObject));
        assert_eq!(lookup_keyword("object"), None);
        assert_eq!(lookup_keyword("frobnicate"), None);
    }

    #[test]
    fn boolean_keywords_accept_both_spellings() {
        assert_eq!(lookup_keyword("TRUE"), Some(TokenKind::KwTrue));
        assert_eq!(lookup_keyword("true"), Some(TokenKind::KwTrue));
        assert_eq!(lookup_keyword("FALSE"), Some(TokenKind::KwFalse));
        assert_eq!(lookup_keyword("false"), Some(TokenKind::KwFalse));
    }

    #[test]
    fn classification() {
        assert!(TokenKind::KwSequence.is_keyword());
        assert!(TokenKind::StringLiteral.is_literal());
        assert!(TokenKind::LeftShift.is_operator());
        assert!(!TokenKind::Semicolon.is_operator());
        assert!(!TokenKind::Identifier.is_keyword());
    }
}
