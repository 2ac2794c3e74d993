//! Recursive descent parser for CORBA IDL
//!
//! Single-pass predictive descent with one token of look-ahead. The
//! parser owns the lexer, builds the tree, and drives the symbol table
//! in lock-step with the grammar's scope nesting: module, interface,
//! struct, union, and exception bodies push a scope on `{` and pop it on
//! `}`. Constant expressions are folded to values as they are parsed.
//!
//! Errors never abort the parse. A syntax error flips the parser into
//! panic mode, which suppresses further diagnostics until
//! [`Parser::synchronize`] has skipped to a likely definition boundary;
//! `parse()` always returns a (possibly partial) translation unit.

pub mod recovery;

#[cfg(test)]
mod tests;

use crate::ast::*;
use crate::diagnostics::Diagnostic;
use crate::lexer::{Lexer, Token, TokenKind, TokenValue};
use crate::resolve::{SymbolKind, SymbolTable};
use tracing::debug;

/// Parser state
pub struct Parser {
    lexer: Lexer,
    current: Token,
    previous: Token,
    panic_mode: bool,
    diagnostics: Vec<Diagnostic>,
    lexer_errors_seen: usize,
    symbols: SymbolTable,
}

impl Parser {
    pub fn new(source: &str, filename: impl Into<String>) -> Self {
        let mut lexer = Lexer::new(source, filename);
        let placeholder = Token::eof(lexer.current_location());
        let mut parser = Self {
            lexer,
            current: placeholder.clone(),
            previous: placeholder,
            panic_mode: false,
            diagnostics: Vec::new(),
            lexer_errors_seen: 0,
            symbols: SymbolTable::new(),
        };
        parser.advance();
        parser
    }

    /// Parse the whole input into a translation unit.
    pub fn parse(&mut self) -> TranslationUnit {
        let filename = self.current.location.file.clone();
        debug!(file = %filename, "parsing translation unit");

        let mut definitions = Vec::new();
        while !self.check(TokenKind::Eof) {
            if let Some(def) = self.parse_definition() {
                definitions.push(def);
            } else {
                self.synchronize();
            }
        }

        self.forward_lexer_errors();
        debug!(
            definitions = definitions.len(),
            errors = self.error_count(),
            "parse finished"
        );
        TranslationUnit {
            filename,
            definitions,
        }
    }

    /// All diagnostics collected so far, lexical and syntactic.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Only the warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| !d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| !d.is_warning()).count()
    }

    /// The symbol table populated during the parse, for the emitter.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Take ownership of the symbol table and diagnostics.
    pub fn into_parts(self) -> (SymbolTable, Vec<Diagnostic>) {
        (self.symbols, self.diagnostics)
    }

    // ==================== TOKEN HELPERS ====================

    fn advance(&mut self) {
        self.previous = self.current.clone();
        loop {
            let token = self.lexer.next_token();
            self.forward_lexer_errors();
            match token.kind {
                // Line directives already had their side effect in the
                // lexer; pragmas are tolerated anywhere between tokens.
                TokenKind::LineDirective | TokenKind::Pragma | TokenKind::Unknown => continue,
                _ => {
                    self.current = token;
                    return;
                }
            }
        }
    }

    fn forward_lexer_errors(&mut self) {
        while self.lexer_errors_seen < self.lexer.errors().len() {
            let diag = self.lexer.errors()[self.lexer_errors_seen].clone();
            self.diagnostics.push(diag);
            self.lexer_errors_seen += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current.kind)
    }

    fn expect(&mut self, kind: TokenKind, message: &str) {
        if self.check(kind) {
            self.advance();
        } else {
            self.error(message);
        }
    }

    fn expect_semicolon(&mut self) {
        self.expect(TokenKind::Semicolon, "Expected ';'");
    }

    // ==================== ERROR HANDLING ====================

    fn error(&mut self, message: impl Into<String>) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;

        let mut message = message.into();
        if self.current.kind == TokenKind::Eof {
            message.push_str(" at end of file");
        } else {
            message.push_str(&format!(" (got '{}')", self.current.text));
        }
        self.diagnostics
            .push(Diagnostic::error(message, self.current.location.clone()));
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::warning(message, self.current.location.clone()));
    }

    /// Record a name-binding error without entering panic mode; the
    /// token stream is not skewed, so recovery is unnecessary.
    fn semantic_error(&mut self, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::error(message, self.previous.location.clone()));
    }

    /// Skip tokens until a likely definition boundary.
    fn synchronize(&mut self) {
        self.panic_mode = false;

        while !self.check(TokenKind::Eof) {
            if recovery::is_definition_end(self.previous.kind) {
                // A closing brace is usually followed by its semicolon
                if self.previous.kind == TokenKind::RightBrace
                    && self.check(TokenKind::Semicolon)
                {
                    self.advance();
                }
                return;
            }
            if recovery::is_definition_start(self.current.kind) {
                return;
            }
            self.advance();
        }
    }

    /// Insert a symbol in the current scope, reporting clashes.
    ///
    /// Reopening a module and completing a forward-declared interface or
    /// struct both re-insert an identical kind under the same name; the
    /// prior symbol survives and no error is raised.
    fn bind(&mut self, name: &str, kind: SymbolKind, value: Option<ConstValue>) {
        if self.symbols.add_symbol(name, kind, value) {
            return;
        }
        let tolerated = matches!(
            kind,
            SymbolKind::Module | SymbolKind::Interface | SymbolKind::Struct
        ) && self.symbols.lookup_local(name).map(|s| s.kind) == Some(kind);
        if !tolerated {
            self.semantic_error(format!("Duplicate definition of '{name}' in this scope"));
        }
    }

    // ==================== DEFINITIONS ====================

    fn parse_definition(&mut self) -> Option<Definition> {
        let is_abstract = self.eat(TokenKind::KwAbstract);
        let is_local = self.eat(TokenKind::KwLocal);

        if self.check(TokenKind::KwModule) {
            if is_abstract || is_local {
                self.error("'abstract' and 'local' cannot be applied to modules");
            }
            return self.parse_module().map(Definition::Module);
        }

        if self.check(TokenKind::KwInterface) {
            return self
                .parse_interface(is_abstract, is_local)
                .map(Definition::Interface);
        }

        if is_abstract || is_local {
            self.error("'abstract' and 'local' can only be applied to interfaces");
        }

        match self.current.kind {
            TokenKind::KwStruct => self.parse_struct().map(Definition::Struct),
            TokenKind::KwUnion => self.parse_union().map(Definition::Union),
            TokenKind::KwEnum => self.parse_enum().map(Definition::Enum),
            TokenKind::KwTypedef => self.parse_typedef().map(Definition::Typedef),
            TokenKind::KwConst => self.parse_const().map(Definition::Const),
            TokenKind::KwException => self.parse_exception().map(Definition::Exception),
            _ => {
                self.error("Expected definition (module, interface, struct, etc.)");
                None
            }
        }
    }

    fn parse_module(&mut self) -> Option<Module> {
        let loc = self.current.location.clone();
        self.expect(TokenKind::KwModule, "Expected 'module'");

        if !self.check(TokenKind::Identifier) {
            self.error("Expected module name");
            return None;
        }
        let name = self.current.text.clone();
        self.advance();
        debug!(module = %name, "entering module");

        self.bind(&name, SymbolKind::Module, None);
        self.symbols.enter_scope(&name);
        let fq_name = self.symbols.current_scope_name().to_string();

        self.expect(TokenKind::LeftBrace, "Expected '{' after module name");

        let mut definitions = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            if let Some(def) = self.parse_definition() {
                definitions.push(def);
            } else {
                self.synchronize();
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' at end of module");
        self.expect_semicolon();

        self.symbols.leave_scope();
        Some(Module {
            name,
            fq_name,
            definitions,
            loc,
        })
    }

    fn parse_interface(&mut self, is_abstract: bool, is_local: bool) -> Option<Interface> {
        let loc = self.current.location.clone();
        self.expect(TokenKind::KwInterface, "Expected 'interface'");

        if !self.check(TokenKind::Identifier) {
            self.error("Expected interface name");
            return None;
        }
        let name = self.current.text.clone();
        self.advance();

        // Forward declaration: bind the name, do not enter a scope
        if self.eat(TokenKind::Semicolon) {
            self.bind(&name, SymbolKind::Interface, None);
            return Some(Interface {
                fq_name: self.symbols.qualify(&name),
                name,
                bases: Vec::new(),
                contents: Vec::new(),
                is_abstract,
                is_local,
                is_forward: true,
                loc,
            });
        }

        let bases = if self.check(TokenKind::Colon) {
            self.parse_inheritance_spec()
        } else {
            Vec::new()
        };

        self.bind(&name, SymbolKind::Interface, None);
        let fq_name = self.symbols.qualify(&name);
        self.symbols.enter_scope(&name);
        debug!(interface = %fq_name, "entering interface");

        self.expect(TokenKind::LeftBrace, "Expected '{' after interface name");

        let mut contents = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            let readonly = self.eat(TokenKind::KwReadonly);
            let oneway = self.eat(TokenKind::KwOneway);

            if self.check(TokenKind::KwAttribute) {
                if oneway {
                    self.warning("'oneway' cannot be applied to attributes");
                }
                if let Some(attr) = self.parse_attribute(readonly) {
                    contents.push(Definition::Attribute(attr));
                } else {
                    self.synchronize();
                }
            } else if recovery::is_definition_start(self.current.kind) {
                if readonly || oneway {
                    self.warning(
                        "'readonly' and 'oneway' can only be applied to attributes and operations",
                    );
                }
                if let Some(def) = self.parse_definition() {
                    contents.push(def);
                } else {
                    self.synchronize();
                }
            } else {
                if readonly {
                    self.warning("'readonly' can only be applied to attributes");
                }
                let Some(return_type) = self.parse_type_spec() else {
                    self.synchronize();
                    continue;
                };

                if !self.check(TokenKind::Identifier) {
                    self.error("Expected operation name");
                    self.synchronize();
                    continue;
                }
                let op_name = self.current.text.clone();
                self.advance();

                if let Some(op) = self.parse_operation(return_type, op_name, oneway) {
                    contents.push(Definition::Operation(op));
                }
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' at end of interface");
        self.expect_semicolon();

        self.symbols.leave_scope();
        Some(Interface {
            name,
            fq_name,
            bases,
            contents,
            is_abstract,
            is_local,
            is_forward: false,
            loc,
        })
    }

    fn parse_struct(&mut self) -> Option<Struct> {
        let loc = self.current.location.clone();
        self.expect(TokenKind::KwStruct, "Expected 'struct'");

        if !self.check(TokenKind::Identifier) {
            self.error("Expected struct name");
            return None;
        }
        let name = self.current.text.clone();
        self.advance();

        // Forward declaration
        if self.eat(TokenKind::Semicolon) {
            self.bind(&name, SymbolKind::Struct, None);
            return Some(Struct {
                fq_name: self.symbols.qualify(&name),
                name,
                members: Vec::new(),
                loc,
            });
        }

        self.bind(&name, SymbolKind::Struct, None);
        self.symbols.enter_scope(&name);
        let fq_name = self.symbols.current_scope_name().to_string();

        self.expect(TokenKind::LeftBrace, "Expected '{' after struct name");

        let mut members = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            if let Some(mut parsed) = self.parse_members() {
                members.append(&mut parsed);
            } else {
                self.synchronize();
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' at end of struct");
        self.expect_semicolon();

        self.symbols.leave_scope();
        Some(Struct {
            name,
            fq_name,
            members,
            loc,
        })
    }

    fn parse_union(&mut self) -> Option<Union> {
        let loc = self.current.location.clone();
        self.expect(TokenKind::KwUnion, "Expected 'union'");

        if !self.check(TokenKind::Identifier) {
            self.error("Expected union name");
            return None;
        }
        let name = self.current.text.clone();
        self.advance();

        self.expect(TokenKind::KwSwitch, "Expected 'switch' after union name");
        self.expect(TokenKind::LeftParen, "Expected '(' after 'switch'");

        let discriminator = self.parse_type_spec()?;

        self.expect(
            TokenKind::RightParen,
            "Expected ')' after discriminator type",
        );

        self.bind(&name, SymbolKind::Union, None);
        self.symbols.enter_scope(&name);
        let fq_name = self.symbols.current_scope_name().to_string();

        self.expect(TokenKind::LeftBrace, "Expected '{' after union switch");

        let mut cases = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            if let Some(case) = self.parse_union_case() {
                cases.push(case);
            } else {
                self.synchronize();
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' at end of union");
        self.expect_semicolon();

        self.symbols.leave_scope();
        Some(Union {
            name,
            fq_name,
            discriminator,
            cases,
            loc,
        })
    }

    fn parse_enum(&mut self) -> Option<Enum> {
        let loc = self.current.location.clone();
        self.expect(TokenKind::KwEnum, "Expected 'enum'");

        if !self.check(TokenKind::Identifier) {
            self.error("Expected enum name");
            return None;
        }
        let name = self.current.text.clone();
        self.advance();

        self.expect(TokenKind::LeftBrace, "Expected '{' after enum name");

        let mut enumerators = Vec::new();
        loop {
            if !self.check(TokenKind::Identifier) {
                self.error("Expected enumerator name");
                break;
            }
            enumerators.push(self.current.text.clone());
            self.advance();
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' at end of enum");
        self.expect_semicolon();

        self.bind(&name, SymbolKind::Enum, None);
        let fq_name = self.symbols.qualify(&name);

        // Enumerators are symbols of the surrounding scope
        for value in enumerators.clone() {
            self.bind(&value, SymbolKind::EnumValue, None);
        }

        Some(Enum {
            name,
            fq_name,
            enumerators,
            loc,
        })
    }

    fn parse_typedef(&mut self) -> Option<Typedef> {
        let loc = self.current.location.clone();
        self.expect(TokenKind::KwTypedef, "Expected 'typedef'");

        let original = self.parse_type_spec()?;

        let declarators = self.parse_declarators();
        if declarators.is_empty() {
            self.error("Expected declarator");
            return None;
        }

        self.expect_semicolon();

        for decl in &declarators {
            self.bind(&decl.name, SymbolKind::Typedef, None);
        }

        let name = declarators[0].name.clone();
        let fq_name = self.symbols.qualify(&name);
        Some(Typedef {
            name,
            fq_name,
            original,
            declarators,
            loc,
        })
    }

    fn parse_const(&mut self) -> Option<Const> {
        let loc = self.current.location.clone();
        self.expect(TokenKind::KwConst, "Expected 'const'");

        let ty = self.parse_type_spec()?;

        if !self.check(TokenKind::Identifier) {
            self.error("Expected const name");
            return None;
        }
        let name = self.current.text.clone();
        self.advance();

        self.expect(TokenKind::Equals, "Expected '=' after const name");

        let value = self.parse_const_expr();

        self.expect_semicolon();

        self.bind(&name, SymbolKind::Constant, Some(value.clone()));
        let fq_name = self.symbols.qualify(&name);
        Some(Const {
            name,
            fq_name,
            ty,
            value,
            loc,
        })
    }

    fn parse_exception(&mut self) -> Option<Exception> {
        let loc = self.current.location.clone();
        self.expect(TokenKind::KwException, "Expected 'exception'");

        if !self.check(TokenKind::Identifier) {
            self.error("Expected exception name");
            return None;
        }
        let name = self.current.text.clone();
        self.advance();

        self.bind(&name, SymbolKind::Exception, None);
        self.symbols.enter_scope(&name);
        let fq_name = self.symbols.current_scope_name().to_string();

        self.expect(TokenKind::LeftBrace, "Expected '{' after exception name");

        let mut members = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            if let Some(mut parsed) = self.parse_members() {
                members.append(&mut parsed);
            } else {
                self.synchronize();
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' at end of exception");
        self.expect_semicolon();

        self.symbols.leave_scope();
        Some(Exception {
            name,
            fq_name,
            members,
            loc,
        })
    }

    // ==================== INTERFACE MEMBERS ====================

    fn parse_operation(
        &mut self,
        return_type: Type,
        name: String,
        is_oneway: bool,
    ) -> Option<Operation> {
        let loc = self.previous.location.clone();
        let fq_name = self.symbols.qualify(&name);

        self.expect(TokenKind::LeftParen, "Expected '(' after operation name");

        let mut parameters = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if let Some(param) = self.parse_parameter() {
                    parameters.push(param);
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen, "Expected ')' after parameters");

        let raises = if self.check(TokenKind::KwRaises) {
            self.parse_raises_expr()
        } else {
            Vec::new()
        };

        self.expect_semicolon();

        self.bind(&name, SymbolKind::Operation, None);

        if is_oneway {
            if !return_type.is_void() {
                self.warning(format!(
                    "oneway operation '{name}' should have a void return type"
                ));
            }
            if parameters
                .iter()
                .any(|p| p.direction != ParamDirection::In)
            {
                self.warning(format!(
                    "oneway operation '{name}' should not have out or inout parameters"
                ));
            }
        }

        Some(Operation {
            name,
            fq_name,
            return_type,
            parameters,
            raises,
            is_oneway,
            loc,
        })
    }

    fn parse_attribute(&mut self, is_readonly: bool) -> Option<Attribute> {
        let loc = self.current.location.clone();
        self.expect(TokenKind::KwAttribute, "Expected 'attribute'");

        let ty = self.parse_type_spec()?;

        if !self.check(TokenKind::Identifier) {
            self.error("Expected attribute name");
            return None;
        }
        let name = self.current.text.clone();
        self.advance();

        self.expect_semicolon();

        self.bind(&name, SymbolKind::Attribute, None);
        let fq_name = self.symbols.qualify(&name);
        Some(Attribute {
            name,
            fq_name,
            ty,
            is_readonly,
            loc,
        })
    }

    fn parse_parameter(&mut self) -> Option<Parameter> {
        let loc = self.current.location.clone();

        let direction = self.parse_param_direction();

        let ty = self.parse_type_spec()?;

        if !self.check(TokenKind::Identifier) {
            self.error("Expected parameter name");
            return None;
        }
        let name = self.current.text.clone();
        self.advance();

        Some(Parameter {
            direction,
            ty,
            name,
            loc,
        })
    }

    fn parse_param_direction(&mut self) -> ParamDirection {
        if self.eat(TokenKind::KwIn) {
            ParamDirection::In
        } else if self.eat(TokenKind::KwOut) {
            ParamDirection::Out
        } else if self.eat(TokenKind::KwInout) {
            ParamDirection::InOut
        } else {
            // Tolerant extension: an omitted direction means 'in'
            ParamDirection::In
        }
    }

    /// Parse one `type declarator (, declarator)* ;` member line,
    /// expanded to one member per declarator.
    fn parse_members(&mut self) -> Option<Vec<StructMember>> {
        let loc = self.current.location.clone();

        let ty = self.parse_type_spec()?;

        let declarators = self.parse_declarators();
        if declarators.is_empty() {
            self.error("Expected member name");
            return None;
        }

        self.expect_semicolon();

        let members = declarators
            .into_iter()
            .map(|decl| {
                let member_ty = if decl.dims.is_empty() {
                    ty.clone()
                } else {
                    Type::new(
                        TypeKind::Array {
                            element: Box::new(ty.clone()),
                            dims: decl.dims,
                        },
                        loc.clone(),
                    )
                };
                StructMember {
                    ty: member_ty,
                    name: decl.name,
                    loc: loc.clone(),
                }
            })
            .collect();
        Some(members)
    }

    fn parse_union_case(&mut self) -> Option<UnionCase> {
        let loc = self.current.location.clone();
        let mut labels = Vec::new();

        while self.at_any(&[TokenKind::KwCase, TokenKind::KwDefault]) {
            if self.eat(TokenKind::KwDefault) {
                self.expect(TokenKind::Colon, "Expected ':' after 'default'");
                labels.push(CaseLabel::Default);
            } else {
                self.advance();
                let value = self.parse_const_expr();
                self.expect(TokenKind::Colon, "Expected ':' after case value");
                labels.push(CaseLabel::Value(value));
            }
        }

        if labels.is_empty() {
            self.error("Expected 'case' or 'default'");
            return None;
        }

        let ty = self.parse_type_spec()?;

        if !self.check(TokenKind::Identifier) {
            self.error("Expected member name in union case");
            return None;
        }
        let name = self.current.text.clone();
        self.advance();

        self.expect_semicolon();

        Some(UnionCase {
            labels,
            ty,
            name,
            loc,
        })
    }

    // ==================== TYPES ====================

    fn parse_type_spec(&mut self) -> Option<Type> {
        match self.current.kind {
            TokenKind::KwSequence => self.parse_sequence_type(),
            TokenKind::KwString => self.parse_string_type(false),
            TokenKind::KwWstring => self.parse_string_type(true),
            _ => self.parse_simple_type_spec(),
        }
    }

    fn parse_simple_type_spec(&mut self) -> Option<Type> {
        if is_base_type_keyword(self.current.kind) {
            let loc = self.current.location.clone();
            let basic = self.parse_basic_type();
            return Some(Type::basic(basic, loc));
        }

        if self.check(TokenKind::Identifier) || self.check(TokenKind::DoubleColon) {
            return self.parse_scoped_name();
        }

        self.error("Expected type specification");
        None
    }

    fn parse_sequence_type(&mut self) -> Option<Type> {
        let loc = self.current.location.clone();
        self.expect(TokenKind::KwSequence, "Expected 'sequence'");
        self.expect(TokenKind::LeftAngle, "Expected '<' after 'sequence'");

        let element = self.parse_type_spec()?;

        let bound = if self.eat(TokenKind::Comma) {
            self.parse_const_expr().as_unsigned()
        } else {
            None
        };

        self.expect(
            TokenKind::RightAngle,
            "Expected '>' at end of sequence type",
        );

        Some(Type::new(
            TypeKind::Sequence {
                element: Box::new(element),
                bound,
            },
            loc,
        ))
    }

    fn parse_string_type(&mut self, wide: bool) -> Option<Type> {
        let loc = self.current.location.clone();
        self.advance();

        let bound = if self.eat(TokenKind::LeftAngle) {
            let bound = self.parse_const_expr().as_unsigned();
            self.expect(TokenKind::RightAngle, "Expected '>' at end of string bound");
            bound
        } else {
            None
        };

        Some(Type::new(TypeKind::Str { bound, wide }, loc))
    }

    fn parse_scoped_name(&mut self) -> Option<Type> {
        let loc = self.current.location.clone();
        let absolute = self.eat(TokenKind::DoubleColon);

        if !self.check(TokenKind::Identifier) {
            self.error("Expected identifier in scoped name");
            return None;
        }

        let mut parts = Vec::new();
        loop {
            if !self.check(TokenKind::Identifier) {
                self.error("Expected identifier after '::'");
                break;
            }
            parts.push(self.current.text.clone());
            self.advance();
            if !self.eat(TokenKind::DoubleColon) {
                break;
            }
        }

        Some(Type::new(TypeKind::ScopedName { parts, absolute }, loc))
    }

    fn parse_basic_type(&mut self) -> BasicType {
        if self.eat(TokenKind::KwVoid) {
            return BasicType::Void;
        }
        if self.eat(TokenKind::KwBoolean) {
            return BasicType::Boolean;
        }
        if self.eat(TokenKind::KwChar) {
            return BasicType::Char;
        }
        if self.eat(TokenKind::KwWchar) {
            return BasicType::WChar;
        }
        if self.eat(TokenKind::KwOctet) {
            return BasicType::Octet;
        }
        if self.eat(TokenKind::KwAny) {
            return BasicType::Any;
        }
        if self.eat(TokenKind::KwObject) {
            return BasicType::Object;
        }
        if self.eat(TokenKind::KwFloat) {
            return BasicType::Float;
        }
        if self.eat(TokenKind::KwDouble) {
            return BasicType::Double;
        }

        let is_unsigned = self.eat(TokenKind::KwUnsigned);

        if self.eat(TokenKind::KwShort) {
            return if is_unsigned {
                BasicType::UShort
            } else {
                BasicType::Short
            };
        }

        if self.eat(TokenKind::KwLong) {
            if self.eat(TokenKind::KwLong) {
                return if is_unsigned {
                    BasicType::ULongLong
                } else {
                    BasicType::LongLong
                };
            }
            if self.eat(TokenKind::KwDouble) {
                return BasicType::LongDouble;
            }
            return if is_unsigned {
                BasicType::ULong
            } else {
                BasicType::Long
            };
        }

        if is_unsigned {
            self.error("Expected 'short' or 'long' after 'unsigned'");
        }

        BasicType::Void
    }

    // ==================== DECLARATORS ====================

    fn parse_declarator(&mut self) -> Option<Declarator> {
        if !self.check(TokenKind::Identifier) {
            self.error("Expected identifier");
            return None;
        }
        let name = self.current.text.clone();
        self.advance();

        let mut dims = Vec::new();
        while self.eat(TokenKind::LeftBracket) {
            let size = self.parse_const_expr().as_unsigned().unwrap_or(0);
            dims.push(size);
            self.expect(TokenKind::RightBracket, "Expected ']'");
        }

        Some(Declarator { name, dims })
    }

    fn parse_declarators(&mut self) -> Vec<Declarator> {
        let mut declarators = Vec::new();

        match self.parse_declarator() {
            Some(decl) => declarators.push(decl),
            None => return declarators,
        }

        while self.eat(TokenKind::Comma) {
            match self.parse_declarator() {
                Some(decl) => declarators.push(decl),
                None => break,
            }
        }

        declarators
    }

    // ==================== QUALIFIED NAME LISTS ====================

    fn parse_inheritance_spec(&mut self) -> Vec<String> {
        let mut bases = Vec::new();

        self.expect(TokenKind::Colon, "Expected ':' for inheritance");

        loop {
            match self.parse_qualified_name("Expected base interface name") {
                Some(base) => bases.push(base),
                None => break,
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        bases
    }

    fn parse_raises_expr(&mut self) -> Vec<String> {
        let mut exceptions = Vec::new();

        self.expect(TokenKind::KwRaises, "Expected 'raises'");
        self.expect(TokenKind::LeftParen, "Expected '(' after 'raises'");

        if !self.check(TokenKind::RightParen) {
            loop {
                match self.parse_qualified_name("Expected exception name") {
                    Some(name) => exceptions.push(name),
                    None => break,
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen, "Expected ')' after raises list");

        exceptions
    }

    /// Parse `[::] Ident (:: Ident)*` into a `::`-joined string.
    fn parse_qualified_name(&mut self, missing: &str) -> Option<String> {
        let mut name = String::new();
        if self.eat(TokenKind::DoubleColon) {
            name.push_str("::");
        }

        if !self.check(TokenKind::Identifier) {
            self.error(missing);
            return None;
        }
        name.push_str(&self.current.text);
        self.advance();

        while self.eat(TokenKind::DoubleColon) {
            name.push_str("::");
            if !self.check(TokenKind::Identifier) {
                self.error("Expected identifier after '::'");
                break;
            }
            name.push_str(&self.current.text);
            self.advance();
        }

        Some(name)
    }

    // ==================== CONSTANT EXPRESSIONS ====================
    //
    // Classic precedence ladder, folded to a value on the fly. Integer
    // arithmetic is signed 64-bit with wrap-around; float arithmetic
    // applies only when both operands are floats; division or modulus
    // by zero leaves the accumulator unchanged.

    fn parse_const_expr(&mut self) -> ConstValue {
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> ConstValue {
        let mut left = self.parse_xor_expr();

        while self.eat(TokenKind::Pipe) {
            let right = self.parse_xor_expr();
            if let (ConstValue::Int(a), ConstValue::Int(b)) = (&left, &right) {
                left = ConstValue::Int(a | b);
            }
        }

        left
    }

    fn parse_xor_expr(&mut self) -> ConstValue {
        let mut left = self.parse_and_expr();

        while self.eat(TokenKind::Caret) {
            let right = self.parse_and_expr();
            if let (ConstValue::Int(a), ConstValue::Int(b)) = (&left, &right) {
                left = ConstValue::Int(a ^ b);
            }
        }

        left
    }

    fn parse_and_expr(&mut self) -> ConstValue {
        let mut left = self.parse_shift_expr();

        while self.eat(TokenKind::Ampersand) {
            let right = self.parse_shift_expr();
            if let (ConstValue::Int(a), ConstValue::Int(b)) = (&left, &right) {
                left = ConstValue::Int(a & b);
            }
        }

        left
    }

    fn parse_shift_expr(&mut self) -> ConstValue {
        let mut left = self.parse_add_expr();

        loop {
            if self.eat(TokenKind::LeftShift) {
                let right = self.parse_add_expr();
                if let (ConstValue::Int(a), ConstValue::Int(b)) = (&left, &right) {
                    left = ConstValue::Int(a.wrapping_shl(*b as u32));
                }
            } else if self.eat(TokenKind::RightShift) {
                let right = self.parse_add_expr();
                if let (ConstValue::Int(a), ConstValue::Int(b)) = (&left, &right) {
                    left = ConstValue::Int(a.wrapping_shr(*b as u32));
                }
            } else {
                break;
            }
        }

        left
    }

    fn parse_add_expr(&mut self) -> ConstValue {
        let mut left = self.parse_mul_expr();

        loop {
            if self.eat(TokenKind::Plus) {
                let right = self.parse_mul_expr();
                match (&left, &right) {
                    (ConstValue::Int(a), ConstValue::Int(b)) => {
                        left = ConstValue::Int(a.wrapping_add(*b));
                    }
                    (ConstValue::Float(a), ConstValue::Float(b)) => {
                        left = ConstValue::Float(a + b);
                    }
                    _ => {}
                }
            } else if self.eat(TokenKind::Minus) {
                let right = self.parse_mul_expr();
                match (&left, &right) {
                    (ConstValue::Int(a), ConstValue::Int(b)) => {
                        left = ConstValue::Int(a.wrapping_sub(*b));
                    }
                    (ConstValue::Float(a), ConstValue::Float(b)) => {
                        left = ConstValue::Float(a - b);
                    }
                    _ => {}
                }
            } else {
                break;
            }
        }

        left
    }

    fn parse_mul_expr(&mut self) -> ConstValue {
        let mut left = self.parse_unary_expr();

        loop {
            if self.eat(TokenKind::Star) {
                let right = self.parse_unary_expr();
                match (&left, &right) {
                    (ConstValue::Int(a), ConstValue::Int(b)) => {
                        left = ConstValue::Int(a.wrapping_mul(*b));
                    }
                    (ConstValue::Float(a), ConstValue::Float(b)) => {
                        left = ConstValue::Float(a * b);
                    }
                    _ => {}
                }
            } else if self.eat(TokenKind::Slash) {
                let right = self.parse_unary_expr();
                match (&left, &right) {
                    (ConstValue::Int(a), ConstValue::Int(b)) => {
                        if *b != 0 {
                            left = ConstValue::Int(a.wrapping_div(*b));
                        }
                    }
                    (ConstValue::Float(a), ConstValue::Float(b)) => {
                        left = ConstValue::Float(a / b);
                    }
                    _ => {}
                }
            } else if self.eat(TokenKind::Percent) {
                let right = self.parse_unary_expr();
                if let (ConstValue::Int(a), ConstValue::Int(b)) = (&left, &right) {
                    if *b != 0 {
                        left = ConstValue::Int(a.wrapping_rem(*b));
                    }
                }
            } else {
                break;
            }
        }

        left
    }

    fn parse_unary_expr(&mut self) -> ConstValue {
        if self.eat(TokenKind::Minus) {
            return match self.parse_unary_expr() {
                ConstValue::Int(v) => ConstValue::Int(v.wrapping_neg()),
                ConstValue::Float(v) => ConstValue::Float(-v),
                other => other,
            };
        }
        if self.eat(TokenKind::Plus) {
            return self.parse_unary_expr();
        }
        if self.eat(TokenKind::Tilde) {
            return match self.parse_unary_expr() {
                ConstValue::Int(v) => ConstValue::Int(!v),
                other => other,
            };
        }

        self.parse_primary_expr()
    }

    fn parse_primary_expr(&mut self) -> ConstValue {
        if self.eat(TokenKind::LeftParen) {
            let value = self.parse_const_expr();
            self.expect(TokenKind::RightParen, "Expected ')'");
            return value;
        }

        if self.check(TokenKind::IntegerLiteral) {
            let value = match self.current.value {
                TokenValue::Int(v) => ConstValue::Int(v),
                TokenValue::UInt(v) => ConstValue::UInt(v),
                _ => ConstValue::Int(0),
            };
            self.advance();
            return value;
        }
        if self.check(TokenKind::FloatLiteral) {
            let value = match self.current.value {
                TokenValue::Float(v) => v,
                _ => 0.0,
            };
            self.advance();
            return ConstValue::Float(value);
        }
        if self.check(TokenKind::StringLiteral) || self.check(TokenKind::WideStringLiteral) {
            let value = match &self.current.value {
                TokenValue::Str(s) => s.clone(),
                _ => String::new(),
            };
            self.advance();
            return ConstValue::Str(value);
        }
        if self.check(TokenKind::CharLiteral) || self.check(TokenKind::WideCharLiteral) {
            let value = match self.current.value {
                TokenValue::Char(c) => c,
                _ => '\0',
            };
            self.advance();
            return ConstValue::Str(value.to_string());
        }
        if self.eat(TokenKind::KwTrue) {
            return ConstValue::Bool(true);
        }
        if self.eat(TokenKind::KwFalse) {
            return ConstValue::Bool(false);
        }

        // Reference to a previously declared constant or enumerator
        if self.check(TokenKind::Identifier) || self.check(TokenKind::DoubleColon) {
            let absolute = self.eat(TokenKind::DoubleColon);
            let mut parts = Vec::new();
            loop {
                if !self.check(TokenKind::Identifier) {
                    break;
                }
                parts.push(self.current.text.clone());
                self.advance();
                if !self.eat(TokenKind::DoubleColon) {
                    break;
                }
            }

            let resolved = self
                .symbols
                .lookup_scoped(&parts, absolute)
                .map(|sym| (sym.kind, sym.value.clone()));
            match resolved {
                Some((SymbolKind::Constant, Some(value))) => return value,
                // Enumerator ordinals are not tracked; they fold to zero
                Some((SymbolKind::EnumValue, _)) => return ConstValue::Int(0),
                _ => {}
            }

            let last = parts.last().cloned().unwrap_or_default();
            self.warning(format!("Unknown constant: {last}"));
            return ConstValue::Int(0);
        }

        self.error("Expected expression");
        ConstValue::Int(0)
    }
}

fn is_base_type_keyword(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::KwVoid
            | TokenKind::KwBoolean
            | TokenKind::KwChar
            | TokenKind::KwWchar
            | TokenKind::KwOctet
            | TokenKind::KwShort
            | TokenKind::KwLong
            | TokenKind::KwFloat
            | TokenKind::KwDouble
            | TokenKind::KwUnsigned
            | TokenKind::KwAny
            | TokenKind::KwObject
    )
}
