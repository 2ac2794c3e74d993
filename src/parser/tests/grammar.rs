//! Grammar coverage: definitions, members, types, scope side effects

use crate::ast::*;
use crate::parser::Parser;
use crate::resolve::SymbolKind;

fn parse_ok(source: &str) -> (TranslationUnit, Parser) {
    let mut parser = Parser::new(source, "test.idl");
    let unit = parser.parse();
    assert!(
        !parser.has_errors(),
        "unexpected errors: {:?}",
        parser.diagnostics()
    );
    (unit, parser)
}

#[test]
fn empty_input_yields_empty_unit() {
    let (unit, _) = parse_ok("  // only trivia\n/* here */\n");
    assert!(unit.definitions.is_empty());
}

#[test]
fn module_registers_scope_and_symbols() {
    let (unit, parser) = parse_ok("module M { struct S { long x; string s; }; };");

    assert_eq!(unit.definitions.len(), 1);
    let Definition::Module(module) = &unit.definitions[0] else {
        panic!("expected module");
    };
    assert_eq!(module.name, "M");
    assert_eq!(module.fq_name, "M");
    assert_eq!(module.definitions.len(), 1);

    let table = parser.symbol_table();
    assert_eq!(table.lookup_qualified("M").unwrap().kind, SymbolKind::Module);
    let s = table.lookup_qualified("M::S").unwrap();
    assert_eq!(s.kind, SymbolKind::Struct);
    assert_eq!(s.fq_name, "M::S");
}

#[test]
fn struct_members_keep_declaration_order() {
    let (unit, _) = parse_ok("struct P { long x; double y; string label; };");
    let Definition::Struct(s) = &unit.definitions[0] else {
        panic!("expected struct");
    };
    let names: Vec<_> = s.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["x", "y", "label"]);
}

#[test]
fn multi_declarator_member_expands_per_name() {
    let (unit, _) = parse_ok("struct V { long x, y, z; };");
    let Definition::Struct(s) = &unit.definitions[0] else {
        panic!("expected struct");
    };
    let names: Vec<_> = s.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["x", "y", "z"]);
    for member in &s.members {
        assert_eq!(member.ty.kind, TypeKind::Basic(BasicType::Long));
    }
}

#[test]
fn member_array_declarator_wraps_only_its_own_type() {
    let (unit, _) = parse_ok("struct A { long plain, grid[2][3]; };");
    let Definition::Struct(s) = &unit.definitions[0] else {
        panic!("expected struct");
    };
    assert_eq!(s.members[0].ty.kind, TypeKind::Basic(BasicType::Long));
    match &s.members[1].ty.kind {
        TypeKind::Array { element, dims } => {
            assert_eq!(dims, &[2, 3]);
            assert_eq!(element.kind, TypeKind::Basic(BasicType::Long));
        }
        other => panic!("expected array type, got {other:?}"),
    }
}

#[test]
fn module_reopening_reuses_scope() {
    let (_, parser) = parse_ok(
        "module A { struct First { long x; }; };\n\
         module A { struct Second { long y; }; };",
    );
    let table = parser.symbol_table();
    assert_eq!(table.lookup_qualified("A::First").unwrap().fq_name, "A::First");
    assert_eq!(
        table.lookup_qualified("A::Second").unwrap().fq_name,
        "A::Second"
    );
}

#[test]
fn interface_forward_and_inheritance() {
    let (unit, parser) = parse_ok(
        "interface A;\n\
         interface B : A { readonly attribute long count; void tick(); };",
    );

    let Definition::Interface(a) = &unit.definitions[0] else {
        panic!("expected interface");
    };
    assert!(a.is_forward);

    let Definition::Interface(b) = &unit.definitions[1] else {
        panic!("expected interface");
    };
    assert!(!b.is_forward);
    assert_eq!(b.bases, ["A"]);
    assert_eq!(b.contents.len(), 2);

    let Definition::Attribute(count) = &b.contents[0] else {
        panic!("expected attribute");
    };
    assert!(count.is_readonly);

    let Definition::Operation(tick) = &b.contents[1] else {
        panic!("expected operation");
    };
    assert!(tick.return_type.is_void());
    assert!(tick.parameters.is_empty());

    let table = parser.symbol_table();
    assert_eq!(
        table.lookup_qualified("A").unwrap().kind,
        SymbolKind::Interface
    );
    assert_eq!(
        table.lookup_qualified("B::tick").unwrap().kind,
        SymbolKind::Operation
    );
}

#[test]
fn abstract_and_local_interfaces() {
    let (unit, _) = parse_ok("abstract interface X {};\nlocal interface Y {};");
    let Definition::Interface(x) = &unit.definitions[0] else {
        panic!("expected interface");
    };
    assert!(x.is_abstract && !x.is_local);
    let Definition::Interface(y) = &unit.definitions[1] else {
        panic!("expected interface");
    };
    assert!(y.is_local && !y.is_abstract);
}

#[test]
fn operation_parameters_and_raises() {
    let (unit, _) = parse_ok(
        "exception Bad { string why; };\n\
         interface I {\n\
           long f(in long a, out string b, inout double c, short d) raises (Bad);\n\
         };",
    );
    let Definition::Interface(iface) = &unit.definitions[1] else {
        panic!("expected interface");
    };
    let Definition::Operation(op) = &iface.contents[0] else {
        panic!("expected operation");
    };
    let dirs: Vec<_> = op.parameters.iter().map(|p| p.direction).collect();
    assert_eq!(
        dirs,
        [
            ParamDirection::In,
            ParamDirection::Out,
            ParamDirection::InOut,
            // Omitted direction defaults to in
            ParamDirection::In,
        ]
    );
    assert_eq!(op.raises, ["Bad"]);
}

#[test]
fn oneway_misuse_warns_but_parses() {
    let mut parser = Parser::new(
        "interface I { oneway long ping(out long x); };",
        "test.idl",
    );
    let unit = parser.parse();
    assert!(!parser.has_errors());
    assert_eq!(parser.warnings().count(), 2);

    let Definition::Interface(iface) = &unit.definitions[0] else {
        panic!("expected interface");
    };
    let Definition::Operation(op) = &iface.contents[0] else {
        panic!("expected operation");
    };
    assert!(op.is_oneway);
}

#[test]
fn enum_registers_enumerators_in_surrounding_scope() {
    let (unit, parser) = parse_ok("enum Color { RED, GREEN, BLUE };");
    let Definition::Enum(color) = &unit.definitions[0] else {
        panic!("expected enum");
    };
    assert_eq!(color.enumerators, ["RED", "GREEN", "BLUE"]);

    let table = parser.symbol_table();
    for value in ["RED", "GREEN", "BLUE"] {
        assert_eq!(
            table.lookup_qualified(value).unwrap().kind,
            SymbolKind::EnumValue
        );
    }
}

#[test]
fn typedef_with_array_declarator() {
    let (unit, parser) = parse_ok("typedef octet UUID[16];");
    let Definition::Typedef(td) = &unit.definitions[0] else {
        panic!("expected typedef");
    };
    assert_eq!(td.name, "UUID");
    assert_eq!(td.declarators.len(), 1);
    assert_eq!(td.declarators[0].dims, [16]);
    assert_eq!(td.original.kind, TypeKind::Basic(BasicType::Octet));
    assert_eq!(
        parser.symbol_table().lookup_qualified("UUID").unwrap().kind,
        SymbolKind::Typedef
    );
}

#[test]
fn typedef_multiple_declarators_bind_all_names() {
    let (_, parser) = parse_ok("typedef long Id, Ids[8];");
    let table = parser.symbol_table();
    assert!(table.lookup_qualified("Id").is_some());
    assert!(table.lookup_qualified("Ids").is_some());
}

#[test]
fn union_cases_and_labels() {
    let (unit, _) = parse_ok(
        "union Data switch (long) {\n\
           case 1: long n;\n\
           case 2: case 3: string s;\n\
           default: double d;\n\
         };",
    );
    let Definition::Union(u) = &unit.definitions[0] else {
        panic!("expected union");
    };
    assert_eq!(u.discriminator.kind, TypeKind::Basic(BasicType::Long));
    assert_eq!(u.cases.len(), 3);
    assert_eq!(u.cases[0].labels, [CaseLabel::Value(ConstValue::Int(1))]);
    assert_eq!(u.cases[1].labels.len(), 2);
    assert_eq!(u.cases[2].labels, [CaseLabel::Default]);
}

#[test]
fn long_flavors_parse_correctly() {
    let (unit, _) = parse_ok(
        "struct L { long long a; unsigned long long b; long double c; unsigned short d; };",
    );
    let Definition::Struct(s) = &unit.definitions[0] else {
        panic!("expected struct");
    };
    let kinds: Vec<_> = s.members.iter().map(|m| m.ty.kind.clone()).collect();
    assert_eq!(
        kinds,
        [
            TypeKind::Basic(BasicType::LongLong),
            TypeKind::Basic(BasicType::ULongLong),
            TypeKind::Basic(BasicType::LongDouble),
            TypeKind::Basic(BasicType::UShort),
        ]
    );
}

#[test]
fn sequence_and_bounded_string_types() {
    let (unit, _) = parse_ok(
        "struct S { sequence<long> xs; sequence<string, 10> names; string<32> tag; wstring w; };",
    );
    let Definition::Struct(s) = &unit.definitions[0] else {
        panic!("expected struct");
    };
    match &s.members[0].ty.kind {
        TypeKind::Sequence { element, bound } => {
            assert_eq!(element.kind, TypeKind::Basic(BasicType::Long));
            assert_eq!(*bound, None);
        }
        other => panic!("expected sequence, got {other:?}"),
    }
    match &s.members[1].ty.kind {
        TypeKind::Sequence { bound, .. } => assert_eq!(*bound, Some(10)),
        other => panic!("expected sequence, got {other:?}"),
    }
    match &s.members[2].ty.kind {
        TypeKind::Str { bound, wide } => {
            assert_eq!(*bound, Some(32));
            assert!(!wide);
        }
        other => panic!("expected string, got {other:?}"),
    }
    match &s.members[3].ty.kind {
        TypeKind::Str { bound, wide } => {
            assert_eq!(*bound, None);
            assert!(wide);
        }
        other => panic!("expected wstring, got {other:?}"),
    }
}

#[test]
fn scoped_name_types_keep_parts_and_absoluteness() {
    let (unit, _) = parse_ok(
        "module M { struct S { long x; }; };\n\
         struct T { ::M::S abs; M::S rel; };",
    );
    let Definition::Struct(t) = &unit.definitions[1] else {
        panic!("expected struct");
    };
    match &t.members[0].ty.kind {
        TypeKind::ScopedName { parts, absolute } => {
            assert_eq!(parts, &["M", "S"]);
            assert!(absolute);
        }
        other => panic!("expected scoped name, got {other:?}"),
    }
    match &t.members[1].ty.kind {
        TypeKind::ScopedName { absolute, .. } => assert!(!absolute),
        other => panic!("expected scoped name, got {other:?}"),
    }
}

#[test]
fn exception_may_be_empty() {
    let (unit, _) = parse_ok("exception Done {};");
    let Definition::Exception(e) = &unit.definitions[0] else {
        panic!("expected exception");
    };
    assert!(e.members.is_empty());
}

#[test]
fn nested_definitions_inside_interface() {
    let (unit, parser) = parse_ok(
        "interface I {\n\
           enum Mode { FAST, SLOW };\n\
           struct Conf { long depth; };\n\
           void run(in Mode m);\n\
         };",
    );
    let Definition::Interface(iface) = &unit.definitions[0] else {
        panic!("expected interface");
    };
    assert_eq!(iface.contents.len(), 3);
    let table = parser.symbol_table();
    assert_eq!(table.lookup_qualified("I::Mode").unwrap().kind, SymbolKind::Enum);
    assert_eq!(
        table.lookup_qualified("I::Conf").unwrap().kind,
        SymbolKind::Struct
    );
}

#[test]
fn every_registered_symbol_round_trips_by_qualified_name() {
    let (_, parser) = parse_ok(
        "module M {\n\
           const long K = 3;\n\
           enum E { A, B };\n\
           struct S { long x; };\n\
           interface I { void f(); };\n\
         };",
    );
    let table = parser.symbol_table();
    for fq in ["M", "M::K", "M::E", "M::A", "M::B", "M::S", "M::I", "M::I::f"] {
        let sym = table
            .lookup_qualified(fq)
            .unwrap_or_else(|| panic!("missing {fq}"));
        assert_eq!(sym.fq_name, fq);
    }
}

#[test]
fn unsigned_alone_is_an_error() {
    let mut parser = Parser::new("interface I { void f(in unsigned x); };", "test.idl");
    parser.parse();
    assert!(parser.has_errors());
    assert!(parser
        .diagnostics()
        .iter()
        .any(|d| d.message.contains("after 'unsigned'")));
}

#[test]
fn duplicate_definition_is_a_semantic_error() {
    let mut parser = Parser::new("struct S { long x; };\nenum S { A };", "test.idl");
    parser.parse();
    assert!(parser.has_errors());
    assert!(parser
        .diagnostics()
        .iter()
        .any(|d| d.message.contains("Duplicate definition of 'S'")));
}

#[test]
fn pragma_between_definitions_is_tolerated() {
    let (unit, _) = parse_ok(
        "#pragma prefix \"acme.org\"\n\
         struct S { long x; };\n\
         #pragma version S 1.1\n\
         struct T { long y; };",
    );
    assert_eq!(unit.definitions.len(), 2);
}

#[test]
fn line_directive_redirects_definition_locations() {
    let (unit, _) = parse_ok("#line 9 \"real.idl\"\nstruct S { long x; };");
    let def = &unit.definitions[0];
    assert_eq!(def.location().file, "real.idl");
    assert_eq!(def.location().line, 10);
}
