//! C++11 code generator
//!
//! Walks the resolved tree by exhaustive matching and renders two text
//! buffers: the header (declarations) and an optional implementation
//! file carrying the namespace scaffolding. Emission is deterministic:
//! the same tree always renders byte-identical buffers. File writing
//! failures are collected, not fatal; later definitions still emit into
//! the in-memory buffers.

use crate::ast::*;
use crate::resolve::SymbolTable;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration options for code generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory for generated files; `None` skips file I/O entirely
    pub output_dir: Option<PathBuf>,
    pub header_extension: String,
    pub source_extension: String,
    /// Uppercased into the include guard
    pub namespace_prefix: String,
    pub generate_implementation: bool,
    pub use_smart_pointers: bool,
    pub add_include_guards: bool,
    pub add_doxygen: bool,
    /// Text substituted once per indent level
    pub indent: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            header_extension: ".hpp".to_string(),
            source_extension: ".cpp".to_string(),
            namespace_prefix: String::new(),
            generate_implementation: true,
            use_smart_pointers: true,
            add_include_guards: true,
            add_doxygen: true,
            indent: "    ".to_string(),
        }
    }
}

/// C++11 code generator
pub struct CppGenerator {
    config: GeneratorConfig,
    header: String,
    source: String,
    errors: Vec<String>,
    indent_level: usize,
    namespace_stack: Vec<String>,
    guard: Option<String>,
}

impl CppGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            header: String::new(),
            source: String::new(),
            errors: Vec::new(),
            indent_level: 0,
            namespace_stack: Vec::new(),
            guard: None,
        }
    }

    /// Generate code for a translation unit.
    ///
    /// The symbol table is the one populated while parsing this unit;
    /// scoped type names the table cannot resolve are still emitted
    /// verbatim, on the assumption that an earlier include provides
    /// them.
    ///
    /// Returns true iff no emission errors occurred.
    pub fn generate(&mut self, unit: &TranslationUnit, symbols: &SymbolTable) -> bool {
        self.header.clear();
        self.source.clear();
        self.errors.clear();
        self.indent_level = 0;
        self.namespace_stack.clear();

        let stem = Path::new(&unit.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("generated")
            .to_string();
        debug!(file = %unit.filename, stem = %stem, "generating C++");

        if self.config.add_include_guards {
            let guard = self.make_include_guard(&stem);
            self.header_line(&format!("#ifndef {guard}"));
            self.header_line(&format!("#define {guard}"));
            self.header_blank();
            self.guard = Some(guard);
        }

        self.emit_includes();
        self.header_blank();

        for def in &unit.definitions {
            self.emit_definition(def, symbols);
        }

        if let Some(guard) = self.guard.take() {
            self.header_blank();
            self.header_line(&format!("#endif // {guard}"));
        }

        if let Some(out_dir) = self.config.output_dir.clone() {
            self.write_files(&out_dir, &stem);
        }

        self.errors.is_empty()
    }

    /// The generated header text.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The generated implementation text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    // ==================== OUTPUT HELPERS ====================

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn outdent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    fn indent_text(&self) -> String {
        self.config.indent.repeat(self.indent_level)
    }

    fn header_line(&mut self, line: &str) {
        if !line.is_empty() {
            let indent = self.indent_text();
            self.header.push_str(&indent);
            self.header.push_str(line);
        }
        self.header.push('\n');
    }

    fn header_blank(&mut self) {
        self.header.push('\n');
    }

    fn source_line(&mut self, line: &str) {
        if !line.is_empty() {
            let indent = self.indent_text();
            self.source.push_str(&indent);
            self.source.push_str(line);
        }
        self.source.push('\n');
    }

    fn source_blank(&mut self) {
        self.source.push('\n');
    }

    fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    // ==================== FILE OUTPUT ====================

    fn write_files(&mut self, out_dir: &Path, stem: &str) {
        if let Err(err) = fs::create_dir_all(out_dir) {
            self.add_error(format!(
                "Failed to create output directory {}: {err}",
                out_dir.display()
            ));
        }

        let header_path = out_dir.join(format!("{stem}{}", self.config.header_extension));
        if let Err(err) = fs::write(&header_path, &self.header) {
            self.add_error(format!(
                "Failed to write header file {}: {err}",
                header_path.display()
            ));
        }

        if self.config.generate_implementation && !self.source.is_empty() {
            let source_path = out_dir.join(format!("{stem}{}", self.config.source_extension));
            if let Err(err) = fs::write(&source_path, &self.source) {
                self.add_error(format!(
                    "Failed to write source file {}: {err}",
                    source_path.display()
                ));
            }
        }
    }

    // ==================== TYPE MAPPING ====================

    fn map_basic_type(&self, basic: BasicType) -> &'static str {
        match basic {
            BasicType::Void => "void",
            BasicType::Boolean => "bool",
            BasicType::Char => "char",
            BasicType::WChar => "wchar_t",
            BasicType::Octet => "uint8_t",
            BasicType::Short => "int16_t",
            BasicType::UShort => "uint16_t",
            BasicType::Long => "int32_t",
            BasicType::ULong => "uint32_t",
            BasicType::LongLong => "int64_t",
            BasicType::ULongLong => "uint64_t",
            BasicType::Float => "float",
            BasicType::Double => "double",
            BasicType::LongDouble => "long double",
            BasicType::Any => "std::any",
            BasicType::Object => "Object",
        }
    }

    fn map_type(&self, ty: &Type, symbols: &SymbolTable) -> String {
        match &ty.kind {
            TypeKind::Basic(basic) => self.map_basic_type(*basic).to_string(),
            TypeKind::Sequence { element, .. } => {
                // The bound is advisory; bounded and unbounded sequences
                // map to the same container.
                let elem = self.map_type(element, symbols);
                format!("std::vector<{elem}>")
            }
            TypeKind::Str { wide, .. } => {
                if *wide {
                    "std::wstring".to_string()
                } else {
                    "std::string".to_string()
                }
            }
            TypeKind::ScopedName { parts, absolute } => {
                let name = scoped_name_to_string(parts, *absolute);
                if symbols.lookup_scoped(parts, *absolute).is_none() {
                    debug!(name = %name, "scoped type not in symbol table, emitting verbatim");
                }
                let mapped: Vec<String> =
                    parts.iter().map(|p| sanitize_identifier(p)).collect();
                let joined = mapped.join("::");
                if *absolute {
                    format!("::{joined}")
                } else {
                    joined
                }
            }
            TypeKind::Array { element, dims } => {
                let mut mapped = self.map_type(element, symbols);
                for dim in dims.iter().rev() {
                    mapped = format!("std::array<{mapped}, {dim}>");
                }
                mapped
            }
        }
    }

    fn map_type_for_parameter(
        &self,
        ty: &Type,
        direction: ParamDirection,
        symbols: &SymbolTable,
    ) -> String {
        let mapped = self.map_type(ty, symbols);

        if direction == ParamDirection::In {
            if let TypeKind::Basic(basic) = &ty.kind {
                if is_by_value(*basic) {
                    return mapped;
                }
            }
            return format!("const {mapped}&");
        }

        format!("{mapped}&")
    }

    // ==================== DEFINITIONS ====================

    fn emit_definition(&mut self, def: &Definition, symbols: &SymbolTable) {
        match def {
            Definition::Module(module) => self.emit_module(module, symbols),
            Definition::Interface(iface) => self.emit_interface(iface, symbols),
            Definition::Struct(s) => self.emit_struct(s, symbols),
            Definition::Enum(e) => self.emit_enum(e),
            Definition::Typedef(td) => self.emit_typedef(td, symbols),
            Definition::Const(c) => self.emit_const(c, symbols),
            Definition::Exception(exc) => self.emit_exception(exc, symbols),
            Definition::Union(u) => self.emit_union(u, symbols),
            // Operations and attributes only occur inside interfaces
            // and are rendered there.
            Definition::Operation(_) | Definition::Attribute(_) => {}
        }
    }

    fn emit_module(&mut self, module: &Module, symbols: &SymbolTable) {
        let name = sanitize_identifier(&module.name);

        self.header_blank();
        self.header_line(&format!("namespace {name} {{"));
        self.header_blank();
        self.namespace_stack.push(name.clone());

        if self.config.generate_implementation {
            self.source_blank();
            self.source_line(&format!("namespace {name} {{"));
            self.source_blank();
        }

        for def in &module.definitions {
            self.emit_definition(def, symbols);
        }

        let closing = self.namespace_stack.pop().unwrap_or(name);
        self.header_blank();
        self.header_line(&format!("}} // namespace {closing}"));

        if self.config.generate_implementation {
            self.source_blank();
            self.source_line(&format!("}} // namespace {closing}"));
        }
    }

    fn emit_struct(&mut self, s: &Struct, symbols: &SymbolTable) {
        let name = sanitize_identifier(&s.name);

        if self.config.add_doxygen {
            self.header_line("/**");
            self.header_line(&format!(" * @brief IDL struct {}", s.name));
            self.header_line(" */");
        }

        self.header_line(&format!("struct {name} {{"));
        self.indent();

        for member in &s.members {
            let ty = self.map_type(&member.ty, symbols);
            let member_name = sanitize_identifier(&member.name);
            self.header_line(&format!("{ty} {member_name};"));
        }

        // Member-wise equality
        self.header_blank();
        self.header_line(&format!("bool operator==(const {name}& other) const {{"));
        self.indent();
        if s.members.is_empty() {
            self.header_line("(void)other;");
            self.header_line("return true;");
        } else {
            let comparison = s
                .members
                .iter()
                .map(|m| {
                    let n = sanitize_identifier(&m.name);
                    format!("{n} == other.{n}")
                })
                .collect::<Vec<_>>()
                .join(" && ");
            self.header_line(&format!("return {comparison};"));
        }
        self.outdent();
        self.header_line("}");

        self.header_blank();
        self.header_line(&format!("bool operator!=(const {name}& other) const {{"));
        self.indent();
        self.header_line("return !(*this == other);");
        self.outdent();
        self.header_line("}");

        self.outdent();
        self.header_line("};");
        self.header_blank();
    }

    fn emit_interface(&mut self, iface: &Interface, symbols: &SymbolTable) {
        let name = sanitize_identifier(&iface.name);

        if iface.is_forward {
            self.header_line(&format!("class {name};"));
            self.header_blank();
            return;
        }

        if self.config.add_doxygen {
            self.header_line("/**");
            self.header_line(&format!(" * @brief IDL interface {}", iface.name));
            if iface.is_abstract {
                self.header_line(" * @note This is an abstract interface");
            }
            if iface.is_local {
                self.header_line(" * @note This is a local interface");
            }
            self.header_line(" */");
        }

        let mut decl = format!("class {name}");
        if !iface.bases.is_empty() {
            let bases = iface
                .bases
                .iter()
                .map(|b| format!("public virtual {}", sanitize_scoped(b)))
                .collect::<Vec<_>>()
                .join(", ");
            decl.push_str(&format!(" : {bases}"));
        }

        self.header_line(&format!("{decl} {{"));
        self.header_line("public:");
        self.indent();

        self.header_line(&format!("virtual ~{name}() = default;"));
        self.header_blank();

        for content in &iface.contents {
            match content {
                Definition::Operation(op) => self.emit_operation(op, symbols),
                Definition::Attribute(attr) => self.emit_attribute(attr, symbols),
                other => self.emit_definition(other, symbols),
            }
        }

        self.outdent();
        self.header_line("};");
        self.header_blank();

        if self.config.use_smart_pointers {
            self.header_line(&format!("using {name}Ptr = std::shared_ptr<{name}>;"));
            self.header_blank();
        }
    }

    fn emit_operation(&mut self, op: &Operation, symbols: &SymbolTable) {
        if self.config.add_doxygen && !op.parameters.is_empty() {
            self.header_line("/**");
            self.header_line(&format!(" * @brief {} operation", op.name));
            for param in &op.parameters {
                let dir = match param.direction {
                    ParamDirection::In => "[in]",
                    ParamDirection::Out => "[out]",
                    ParamDirection::InOut => "[in,out]",
                };
                self.header_line(&format!(" * @param {} {dir}", param.name));
            }
            if !op.raises.is_empty() {
                self.header_line(&format!(" * @throws {}", op.raises.join(", ")));
            }
            self.header_line(" */");
        }

        let return_type = self.map_type(&op.return_type, symbols);
        let mut signature = format!("virtual {return_type} {}(", sanitize_identifier(&op.name));

        for (i, param) in op.parameters.iter().enumerate() {
            if i > 0 {
                signature.push_str(", ");
            }
            let ty = self.map_type_for_parameter(&param.ty, param.direction, symbols);
            signature.push_str(&ty);
            signature.push(' ');
            signature.push_str(&sanitize_identifier(&param.name));
        }
        signature.push_str(") = 0;");

        self.header_line(&signature);
        self.header_blank();
    }

    fn emit_attribute(&mut self, attr: &Attribute, symbols: &SymbolTable) {
        let ty = self.map_type(&attr.ty, symbols);
        let name = sanitize_identifier(&attr.name);

        if self.config.add_doxygen {
            self.header_line("/**");
            self.header_line(&format!(" * @brief Get {} attribute", attr.name));
            self.header_line(" */");
        }
        self.header_line(&format!("virtual {ty} {name}() const = 0;"));

        if !attr.is_readonly {
            if self.config.add_doxygen {
                self.header_line("/**");
                self.header_line(&format!(" * @brief Set {} attribute", attr.name));
                self.header_line(" */");
            }
            self.header_line(&format!("virtual void {name}(const {ty}& value) = 0;"));
        }
        self.header_blank();
    }

    fn emit_enum(&mut self, e: &Enum) {
        if self.config.add_doxygen {
            self.header_line("/**");
            self.header_line(&format!(" * @brief IDL enum {}", e.name));
            self.header_line(" */");
        }

        let name = sanitize_identifier(&e.name);
        self.header_line(&format!("enum class {name} {{"));
        self.indent();

        let last = e.enumerators.len().saturating_sub(1);
        for (i, value) in e.enumerators.iter().enumerate() {
            let mut line = sanitize_identifier(value);
            if i < last {
                line.push(',');
            }
            self.header_line(&line);
        }

        self.outdent();
        self.header_line("};");
        self.header_blank();
    }

    fn emit_typedef(&mut self, td: &Typedef, symbols: &SymbolTable) {
        let base = self.map_type(&td.original, symbols);

        for decl in &td.declarators {
            let mut mapped = base.clone();
            // Extents fold right to left: name[2][3] is array<array<T,3>,2>
            for dim in decl.dims.iter().rev() {
                mapped = format!("std::array<{mapped}, {dim}>");
            }
            let name = sanitize_identifier(&decl.name);
            self.header_line(&format!("using {name} = {mapped};"));
        }
        self.header_blank();
    }

    fn emit_const(&mut self, c: &Const, symbols: &SymbolTable) {
        let ty = self.map_type(&c.ty, symbols);
        let name = sanitize_identifier(&c.name);
        let value = const_value_to_string(&c.value);

        self.header_line(&format!("constexpr {ty} {name} = {value};"));
        self.header_blank();
    }

    fn emit_exception(&mut self, exc: &Exception, symbols: &SymbolTable) {
        let name = sanitize_identifier(&exc.name);

        if self.config.add_doxygen {
            self.header_line("/**");
            self.header_line(&format!(" * @brief IDL exception {}", exc.name));
            self.header_line(" */");
        }

        self.header_line(&format!("class {name} : public std::exception {{"));
        self.header_line("public:");
        self.indent();

        for member in &exc.members {
            let ty = self.map_type(&member.ty, symbols);
            let member_name = sanitize_identifier(&member.name);
            self.header_line(&format!("{ty} {member_name};"));
        }

        if !exc.members.is_empty() {
            self.header_blank();

            // Field-wise constructor
            let mut params = Vec::new();
            let mut inits = Vec::new();
            for member in &exc.members {
                let ty = self.map_type(&member.ty, symbols);
                let member_name = sanitize_identifier(&member.name);
                params.push(format!("const {ty}& {member_name}_"));
                inits.push(format!("{member_name}({member_name}_)"));
            }
            self.header_line(&format!("{name}({})", params.join(", ")));
            self.header_line(&format!("    : {} {{}}", inits.join(", ")));
            self.header_blank();
        }

        self.header_line(&format!("{name}() = default;"));
        self.header_blank();

        // The what() text is the IDL name, not the sanitized identifier
        self.header_line("const char* what() const noexcept override {");
        self.indent();
        self.header_line(&format!("return \"{}\";", exc.name));
        self.outdent();
        self.header_line("}");

        self.outdent();
        self.header_line("};");
        self.header_blank();
    }

    fn emit_union(&mut self, u: &Union, symbols: &SymbolTable) {
        let name = sanitize_identifier(&u.name);
        let disc = self.map_type(&u.discriminator, symbols);

        if self.config.add_doxygen {
            self.header_line("/**");
            self.header_line(&format!(" * @brief IDL union {}", u.name));
            self.header_line(" */");
        }

        self.header_line(&format!("class {name} {{"));
        self.header_line("public:");
        self.indent();

        self.header_line(&format!("{disc} _d() const {{ return discriminator_; }}"));
        self.header_line(&format!("void _d({disc} d) {{ discriminator_ = d; }}"));
        self.header_blank();

        for case in &u.cases {
            let ty = self.map_type(&case.ty, symbols);
            let member = sanitize_identifier(&case.name);

            self.header_line(&format!("{ty} {member}() const {{ return {member}_; }}"));
            self.header_line(&format!(
                "void {member}(const {ty}& value) {{ {member}_ = value; }}"
            ));
            self.header_blank();
        }

        self.outdent();
        self.header_line("private:");
        self.indent();

        self.header_line(&format!("{disc} discriminator_;"));
        for case in &u.cases {
            let ty = self.map_type(&case.ty, symbols);
            let member = sanitize_identifier(&case.name);
            self.header_line(&format!("{ty} {member}_;"));
        }

        self.outdent();
        self.header_line("};");
        self.header_blank();
    }

    // ==================== PREAMBLE ====================

    fn emit_includes(&mut self) {
        self.header_line("#include <any>");
        self.header_line("#include <array>");
        self.header_line("#include <cstdint>");
        self.header_line("#include <memory>");
        self.header_line("#include <stdexcept>");
        self.header_line("#include <string>");
        self.header_line("#include <vector>");
    }

    fn make_include_guard(&self, stem: &str) -> String {
        let mut guard = String::from("IBORB_GENERATED_");

        if !self.config.namespace_prefix.is_empty() {
            guard.push_str(&self.config.namespace_prefix.to_uppercase());
            guard.push('_');
        }

        for c in stem.chars() {
            if c.is_ascii_alphanumeric() {
                guard.push(c.to_ascii_uppercase());
            } else {
                guard.push('_');
            }
        }

        guard.push_str("_HPP");
        guard
    }
}

/// Basic types that `in` parameters pass by value
fn is_by_value(basic: BasicType) -> bool {
    !matches!(basic, BasicType::Void | BasicType::Any | BasicType::Object)
}

/// Suffix identifiers that collide with C++ keywords.
///
/// Applies only where a name is emitted as an identifier; names inside
/// string literals (such as `what()` bodies) are left alone.
pub fn sanitize_identifier(name: &str) -> String {
    const RESERVED: &[&str] = &[
        "class",
        "struct",
        "union",
        "enum",
        "template",
        "typename",
        "virtual",
        "public",
        "private",
        "protected",
        "friend",
        "namespace",
        "using",
        "try",
        "catch",
        "throw",
        "new",
        "delete",
        "this",
        "operator",
        "sizeof",
        "alignof",
        "decltype",
        "nullptr",
        "constexpr",
        "static_cast",
        "dynamic_cast",
        "const_cast",
        "reinterpret_cast",
    ];

    if RESERVED.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Sanitize each segment of a `::`-joined name.
fn sanitize_scoped(name: &str) -> String {
    let absolute = name.starts_with("::");
    let trimmed = if absolute { &name[2..] } else { name };
    let joined = trimmed
        .split("::")
        .map(sanitize_identifier)
        .collect::<Vec<_>>()
        .join("::");
    if absolute {
        format!("::{joined}")
    } else {
        joined
    }
}

/// Render a constant value as a C++ expression.
fn const_value_to_string(value: &ConstValue) -> String {
    match value {
        ConstValue::Int(v) => v.to_string(),
        ConstValue::UInt(v) => format!("{v}ULL"),
        ConstValue::Float(v) => {
            if v.is_finite() && v.fract() == 0.0 {
                format!("{v:.1}")
            } else {
                format!("{v}")
            }
        }
        ConstValue::Str(s) => format!("\"{}\"", escape_cpp_string(s)),
        ConstValue::Bool(b) => {
            if *b {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
    }
}

fn escape_cpp_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn generate(source: &str) -> (String, String) {
        let mut parser = Parser::new(source, "test.idl");
        let unit = parser.parse();
        assert!(
            !parser.has_errors(),
            "unexpected parse errors: {:?}",
            parser.diagnostics()
        );
        let mut generator = CppGenerator::new(GeneratorConfig::default());
        assert!(generator.generate(&unit, parser.symbol_table()));
        (generator.header().to_string(), generator.source().to_string())
    }

    /// Collapse whitespace runs so assertions survive formatting.
    fn flat(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn struct_fields_and_equality() {
        let (header, _) = generate("module M { struct S { long x; string s; }; };");
        assert!(header.contains("namespace M {"));
        let flat = flat(&header);
        assert!(flat.contains("struct S { int32_t x; std::string s;"));
        assert!(flat.contains(
            "bool operator==(const S& other) const { return x == other.x && s == other.s; }"
        ));
        assert!(flat.contains("bool operator!=(const S& other) const { return !(*this == other); }"));
        assert!(flat.contains("} // namespace M"));
    }

    #[test]
    fn empty_struct_is_trivially_equal() {
        let (header, _) = generate("struct E {};");
        let flat = flat(&header);
        assert!(flat.contains("bool operator==(const E& other) const { (void)other; return true; }"));
    }

    #[test]
    fn enum_class_emission() {
        let (header, _) = generate("enum Color { RED, GREEN, BLUE };");
        assert!(flat(&header).contains("enum class Color { RED, GREEN, BLUE };"));
    }

    #[test]
    fn typedef_array_right_folds() {
        let (header, _) = generate("typedef octet UUID[16];");
        assert!(header.contains("using UUID = std::array<uint8_t, 16>;"));

        let (header, _) = generate("typedef long Grid[2][3];");
        assert!(header.contains("using Grid = std::array<std::array<int32_t, 3>, 2>;"));
    }

    #[test]
    fn interface_with_inheritance_and_readonly_attribute() {
        let (header, _) = generate(
            "interface A;\n\
             interface B : A { readonly attribute long count; void tick(); };",
        );
        assert!(header.contains("class A;"));
        assert!(header.contains("class B : public virtual A {"));
        assert!(header.contains("virtual ~B() = default;"));
        assert!(header.contains("virtual int32_t count() const = 0;"));
        assert!(header.contains("virtual void tick() = 0;"));
        // readonly: no setter
        assert!(!header.contains("virtual void count("));
        assert!(header.contains("using BPtr = std::shared_ptr<B>;"));
    }

    #[test]
    fn parameter_directions_shape_types() {
        let (header, _) = generate(
            "struct Payload { long x; };\n\
             interface I { void f(in long a, in Payload p, out long b, inout string c); };",
        );
        assert!(header.contains(
            "virtual void f(int32_t a, const Payload& p, int32_t& b, std::string& c) = 0;"
        ));
    }

    #[test]
    fn const_folding_and_rendering() {
        let (header, _) = generate("const long N = 1 << 4 | 3;");
        assert!(header.contains("constexpr int32_t N = 19;"));

        let (header, _) = generate("const double PI = 3.25;");
        assert!(header.contains("constexpr double PI = 3.25;"));

        let (header, _) = generate("const boolean FLAG = TRUE;");
        assert!(header.contains("constexpr bool FLAG = true;"));

        let (header, _) = generate("const unsigned long long MASK = 0xFFFFFFFFFFFFFFFF;");
        assert!(header.contains("constexpr uint64_t MASK = 18446744073709551615ULL;"));

        let (header, _) = generate("const string GREETING = \"hi\";");
        assert!(header.contains("constexpr std::string GREETING = \"hi\";"));
    }

    #[test]
    fn exception_shape() {
        let (header, _) = generate("exception BadArg { string reason; };");
        assert!(header.contains("class BadArg : public std::exception {"));
        assert!(header.contains("std::string reason;"));
        let flat = flat(&header);
        assert!(flat.contains("BadArg(const std::string& reason_) : reason(reason_) {}"));
        assert!(flat.contains("BadArg() = default;"));
        assert!(flat.contains(
            "const char* what() const noexcept override { return \"BadArg\"; }"
        ));
    }

    #[test]
    fn union_accessors_and_storage() {
        let (header, _) = generate(
            "union Data switch (long) { case 1: long n; default: string s; };",
        );
        let flat = flat(&header);
        assert!(flat.contains("int32_t _d() const { return discriminator_; }"));
        assert!(flat.contains("void _d(int32_t d) { discriminator_ = d; }"));
        assert!(flat.contains("int32_t n() const { return n_; }"));
        assert!(flat.contains("void n(const int32_t& value) { n_ = value; }"));
        assert!(flat.contains("private: int32_t discriminator_; int32_t n_; std::string s_;"));
    }

    #[test]
    fn bounded_types_emit_like_unbounded() {
        let (bounded, _) =
            generate("struct S { sequence<long, 10> xs; string<32> tag; };");
        let (unbounded, _) = generate("struct S { sequence<long> xs; string tag; };");
        assert_eq!(bounded, unbounded);
    }

    #[test]
    fn reserved_identifiers_get_suffixed() {
        let (header, _) = generate("struct Data { long class; string namespace; };");
        assert!(header.contains("int32_t class_;"));
        assert!(header.contains("std::string namespace_;"));
    }

    #[test]
    fn include_guard_naming() {
        let mut parser = Parser::new("struct S { long x; };", "my-file.idl");
        let unit = parser.parse();
        let mut generator = CppGenerator::new(GeneratorConfig {
            namespace_prefix: "acme".to_string(),
            ..GeneratorConfig::default()
        });
        generator.generate(&unit, parser.symbol_table());
        let header = generator.header();
        assert!(header.contains("#ifndef IBORB_GENERATED_ACME_MY_FILE_HPP"));
        assert!(header.contains("#define IBORB_GENERATED_ACME_MY_FILE_HPP"));
        assert!(header.contains("#endif // IBORB_GENERATED_ACME_MY_FILE_HPP"));
    }

    #[test]
    fn include_guards_can_be_disabled() {
        let mut parser = Parser::new("struct S { long x; };", "t.idl");
        let unit = parser.parse();
        let mut generator = CppGenerator::new(GeneratorConfig {
            add_include_guards: false,
            add_doxygen: false,
            ..GeneratorConfig::default()
        });
        generator.generate(&unit, parser.symbol_table());
        assert!(!generator.header().contains("#ifndef"));
        assert!(!generator.header().contains("@brief"));
    }

    #[test]
    fn implementation_carries_namespace_scaffolding() {
        let (_, source) = generate("module M { module N { struct S { long x; }; }; };");
        let flat = flat(&source);
        assert!(flat.contains("namespace M {"));
        assert!(flat.contains("namespace N {"));
        assert!(flat.contains("} // namespace N"));
        assert!(flat.contains("} // namespace M"));
    }

    #[test]
    fn emission_is_deterministic() {
        let source = "module M { struct S { long x; }; interface I { void f(in S s); }; };";
        let first = generate(source);
        let second = generate(source);
        assert_eq!(first, second);
    }

    #[test]
    fn absolute_scoped_names_keep_leading_colons() {
        let (header, _) = generate(
            "module M { struct S { long x; }; };\nstruct T { ::M::S inner; };",
        );
        assert!(header.contains("::M::S inner;"));
    }

    #[test]
    fn sanitize_helpers() {
        assert_eq!(sanitize_identifier("class"), "class_");
        assert_eq!(sanitize_identifier("widget"), "widget");
        assert_eq!(sanitize_scoped("::A::class"), "::A::class_");
        assert_eq!(sanitize_scoped("A::B"), "A::B");
    }

    #[test]
    fn const_value_rendering() {
        assert_eq!(const_value_to_string(&ConstValue::Int(-3)), "-3");
        assert_eq!(const_value_to_string(&ConstValue::UInt(7)), "7ULL");
        assert_eq!(const_value_to_string(&ConstValue::Float(2.0)), "2.0");
        assert_eq!(const_value_to_string(&ConstValue::Float(2.5)), "2.5");
        assert_eq!(
            const_value_to_string(&ConstValue::Str("a\"b".into())),
            "\"a\\\"b\""
        );
        assert_eq!(const_value_to_string(&ConstValue::Bool(false)), "false");
    }
}
