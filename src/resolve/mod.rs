//! Symbol table with nested, re-enterable scopes
//!
//! The parser drives a cursor over a scope tree in lock-step with the
//! grammar: entering a module/interface/struct/union/exception body
//! pushes a scope, the closing brace pops it. Scopes are stored in an
//! arena (`Vec<Scope>` addressed by [`ScopeId`]) so child scopes can
//! hold parent links without ownership cycles. Entering a scope whose
//! name already exists as a child of the current scope re-enters it,
//! which is how reopened modules accumulate symbols.

use crate::ast::ConstValue;
use rustc_hash::FxHashMap;
use std::fmt;

/// Index of a scope in the symbol table's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
    /// The global root scope.
    pub const ROOT: ScopeId = ScopeId(0);
}

/// What kind of definition a symbol names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Module,
    Interface,
    Struct,
    Union,
    Enum,
    Typedef,
    Exception,
    Constant,
    Operation,
    Attribute,
    Parameter,
    EnumValue,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Interface => "interface",
            SymbolKind::Struct => "struct",
            SymbolKind::Union => "union",
            SymbolKind::Enum => "enum",
            SymbolKind::Typedef => "typedef",
            SymbolKind::Exception => "exception",
            SymbolKind::Constant => "constant",
            SymbolKind::Operation => "operation",
            SymbolKind::Attribute => "attribute",
            SymbolKind::Parameter => "parameter",
            SymbolKind::EnumValue => "enum value",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named entry in a scope
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub fq_name: String,
    pub kind: SymbolKind,
    /// Fully qualified name of the owning scope
    pub scope: String,
    /// Folded value for `Constant` symbols, substituted into later
    /// constant expressions
    pub value: Option<ConstValue>,
}

/// One scope in the tree
#[derive(Debug)]
pub struct Scope {
    /// Simple name; empty for the global root
    pub name: String,
    pub fq_name: String,
    pub parent: Option<ScopeId>,
    symbols: FxHashMap<String, Symbol>,
    /// Children in insertion order, so re-entry finds reopened modules
    children: Vec<ScopeId>,
}

impl Scope {
    fn new(name: String, fq_name: String, parent: Option<ScopeId>) -> Self {
        Self {
            name,
            fq_name,
            parent,
            symbols: FxHashMap::default(),
            children: Vec::new(),
        }
    }

    /// Look up a symbol in this scope only.
    pub fn local(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }
}

/// Stateful cursor over the scope tree
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(String::new(), String::new(), None)],
            current: ScopeId::ROOT,
        }
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Move the cursor into the named child scope, creating it if this
    /// is the first time the name is opened here.
    pub fn enter_scope(&mut self, name: &str) {
        if let Some(existing) = self.child_by_name(self.current, name) {
            self.current = existing;
            return;
        }
        let parent_fq = &self.scopes[self.current.0].fq_name;
        let fq_name = if parent_fq.is_empty() {
            name.to_string()
        } else {
            format!("{parent_fq}::{name}")
        };
        let id = ScopeId(self.scopes.len());
        self.scopes
            .push(Scope::new(name.to_string(), fq_name, Some(self.current)));
        self.scopes[self.current.0].children.push(id);
        self.current = id;
    }

    /// Move the cursor back to the parent scope. A no-op at the root.
    pub fn leave_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.0].parent {
            self.current = parent;
        }
    }

    /// Insert a symbol into the current scope.
    ///
    /// Returns false (leaving the prior symbol intact) when the name is
    /// already taken in this scope.
    pub fn add_symbol(&mut self, name: &str, kind: SymbolKind, value: Option<ConstValue>) -> bool {
        let fq_name = self.qualify(name);
        let scope = self.scopes[self.current.0].fq_name.clone();
        let entry = self.scopes[self.current.0].symbols.entry(name.to_string());
        match entry {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(Symbol {
                    name: name.to_string(),
                    fq_name,
                    kind,
                    scope,
                    value,
                });
                true
            }
        }
    }

    /// Look up a simple name, walking from the current scope to the root.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut cursor = Some(self.current);
        while let Some(id) = cursor {
            let scope = &self.scopes[id.0];
            if let Some(sym) = scope.local(name) {
                return Some(sym);
            }
            cursor = scope.parent;
        }
        None
    }

    /// Look up a symbol in the current scope only.
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes[self.current.0].local(name)
    }

    /// Resolve a scoped name.
    ///
    /// Absolute names descend from the root. Relative names first anchor
    /// on the nearest enclosing scope that has a child named `parts[0]`
    /// (or, for a single part, fall back to plain upward lookup), then
    /// descend through the middle parts as child scopes and resolve the
    /// final part as a symbol in the landing scope.
    pub fn lookup_scoped(&self, parts: &[String], absolute: bool) -> Option<&Symbol> {
        let (first, rest) = parts.split_first()?;

        if absolute {
            return self.descend(ScopeId::ROOT, parts);
        }

        if rest.is_empty() {
            return self.lookup(first);
        }

        let mut cursor = Some(self.current);
        while let Some(id) = cursor {
            if let Some(anchor) = self.child_by_name(id, first) {
                return self.descend_from(anchor, rest);
            }
            cursor = self.scopes[id.0].parent;
        }
        None
    }

    /// Resolve a qualified name string such as `::M::S` or `M::S`.
    pub fn lookup_qualified(&self, qualified: &str) -> Option<&Symbol> {
        let (parts, absolute) = split_qualified(qualified);
        self.lookup_scoped(&parts, absolute)
    }

    /// Fully qualified name of the current scope.
    pub fn current_scope_name(&self) -> &str {
        &self.scopes[self.current.0].fq_name
    }

    pub fn exists_in_current_scope(&self, name: &str) -> bool {
        self.lookup_local(name).is_some()
    }

    /// Build the fully qualified name `name` would get in the current scope.
    pub fn qualify(&self, name: &str) -> String {
        let scope_fq = &self.scopes[self.current.0].fq_name;
        if scope_fq.is_empty() {
            name.to_string()
        } else {
            format!("{scope_fq}::{name}")
        }
    }

    fn child_by_name(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        self.scopes[scope.0]
            .children
            .iter()
            .copied()
            .find(|id| self.scopes[id.0].name == name)
    }

    /// Descend from `start` through `parts[..len-1]` as child scopes and
    /// resolve the final part locally.
    fn descend(&self, start: ScopeId, parts: &[String]) -> Option<&Symbol> {
        let (last, middle) = parts.split_last()?;
        let mut scope = start;
        for part in middle {
            scope = self.child_by_name(scope, part)?;
        }
        self.scopes[scope.0].local(last)
    }

    /// Like `descend`, but `anchor` already covers the first part.
    fn descend_from(&self, anchor: ScopeId, rest: &[String]) -> Option<&Symbol> {
        self.descend(anchor, rest)
    }
}

/// Split a qualified name on `::`, honoring a leading `::` as absolute.
pub fn split_qualified(name: &str) -> (Vec<String>, bool) {
    let absolute = name.starts_with("::");
    let trimmed = if absolute { &name[2..] } else { name };
    let parts = trimmed
        .split("::")
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    (parts, absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_names_join_with_double_colon() {
        let mut table = SymbolTable::new();
        table.enter_scope("M");
        assert_eq!(table.current_scope_name(), "M");
        table.enter_scope("N");
        assert_eq!(table.current_scope_name(), "M::N");
        assert_eq!(table.qualify("x"), "M::N::x");
        table.leave_scope();
        assert_eq!(table.qualify("x"), "M::x");
    }

    #[test]
    fn add_symbol_rejects_duplicates() {
        let mut table = SymbolTable::new();
        assert!(table.add_symbol("S", SymbolKind::Struct, None));
        assert!(!table.add_symbol("S", SymbolKind::Struct, None));
        // The first symbol survives
        assert_eq!(table.lookup("S").unwrap().kind, SymbolKind::Struct);
    }

    #[test]
    fn lookup_walks_to_parent_scopes() {
        let mut table = SymbolTable::new();
        table.add_symbol("TOP", SymbolKind::Constant, Some(ConstValue::Int(1)));
        table.enter_scope("M");
        table.enter_scope("I");
        assert!(table.lookup("TOP").is_some());
        assert!(table.lookup_local("TOP").is_none());
    }

    #[test]
    fn module_reentry_reuses_scope() {
        let mut table = SymbolTable::new();
        table.add_symbol("M", SymbolKind::Module, None);
        table.enter_scope("M");
        table.add_symbol("A", SymbolKind::Struct, None);
        table.leave_scope();

        table.enter_scope("M");
        table.add_symbol("B", SymbolKind::Struct, None);
        // Both symbols are visible from the reopened scope
        assert!(table.lookup("A").is_some());
        assert!(table.lookup("B").is_some());
        assert_eq!(table.lookup("A").unwrap().fq_name, "M::A");
        assert_eq!(table.lookup("B").unwrap().fq_name, "M::B");
        table.leave_scope();
    }

    #[test]
    fn scoped_lookup_absolute_and_relative() {
        let mut table = SymbolTable::new();
        table.add_symbol("M", SymbolKind::Module, None);
        table.enter_scope("M");
        table.add_symbol("S", SymbolKind::Struct, None);
        table.leave_scope();

        let parts = vec!["M".to_string(), "S".to_string()];
        let sym = table.lookup_scoped(&parts, false).unwrap();
        assert_eq!(sym.fq_name, "M::S");
        let sym = table.lookup_scoped(&parts, true).unwrap();
        assert_eq!(sym.fq_name, "M::S");
        assert!(table
            .lookup_scoped(&["M".into(), "T".into()], false)
            .is_none());
    }

    #[test]
    fn lookup_qualified_round_trips_symbol_names() {
        let mut table = SymbolTable::new();
        table.add_symbol("M", SymbolKind::Module, None);
        table.enter_scope("M");
        table.add_symbol("N", SymbolKind::Module, None);
        table.enter_scope("N");
        table.add_symbol("K", SymbolKind::Constant, Some(ConstValue::Int(7)));
        table.leave_scope();
        table.leave_scope();

        let sym = table.lookup_qualified("M::N::K").unwrap();
        assert_eq!(sym.fq_name, "M::N::K");
        assert_eq!(sym.value, Some(ConstValue::Int(7)));
        assert!(table.lookup_qualified("::M::N::K").is_some());
        assert!(table.lookup_qualified("::N::K").is_none());
    }

    #[test]
    fn relative_lookup_anchors_on_enclosing_scope() {
        let mut table = SymbolTable::new();
        table.enter_scope("Outer");
        table.enter_scope("Inner");
        table.add_symbol("X", SymbolKind::Constant, None);
        table.leave_scope();
        // From Outer, `Inner::X` resolves via the Inner child scope
        let sym = table
            .lookup_scoped(&["Inner".into(), "X".into()], false)
            .unwrap();
        assert_eq!(sym.fq_name, "Outer::Inner::X");
    }

    #[test]
    fn root_scope_has_empty_name() {
        let table = SymbolTable::new();
        let root = table.scope(ScopeId::ROOT);
        assert_eq!(root.name, "");
        assert_eq!(root.fq_name, "");
        assert!(root.parent.is_none());
    }

    #[test]
    fn leave_scope_at_root_is_noop() {
        let mut table = SymbolTable::new();
        table.leave_scope();
        assert_eq!(table.current_scope_name(), "");
        table.add_symbol("x", SymbolKind::Constant, None);
        assert!(table.lookup("x").is_some());
    }

    #[test]
    fn split_qualified_handles_leading_colons() {
        assert_eq!(split_qualified("A::B"), (vec!["A".into(), "B".into()], false));
        assert_eq!(split_qualified("::A"), (vec!["A".into()], true));
        assert_eq!(split_qualified("A"), (vec!["A".into()], false));
    }
}
