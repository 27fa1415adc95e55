//! Two-scope symbol table: class scope (`static`/`field`, persists for the
//! whole class) and subroutine scope (`argument`/`local`, reset at the
//! start of each subroutine). Lookups check subroutine scope first, then
//! fall back to class scope, per §4.3.2.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Static,
    Field,
    Argument,
    Local,
}

impl Kind {
    /// The VM segment a variable of this kind lives in. Field variables are
    /// addressed through `this` at runtime, not a `field` segment — callers
    /// needing the segment name for push/pop must special-case `Field`
    /// themselves, matching §4.3.2's let/term handling.
    pub fn segment(self) -> &'static str {
        match self {
            Kind::Static => "static",
            Kind::Field => "this",
            Kind::Argument => "argument",
            Kind::Local => "local",
        }
    }
}

#[derive(Debug, Clone)]
struct Symbol {
    var_type: String,
    kind: Kind,
    index: u16,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Symbol>,
    subroutine_scope: HashMap<String, Symbol>,
    static_count: u16,
    field_count: u16,
    arg_count: u16,
    local_count: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.arg_count = 0;
        self.local_count = 0;
    }

    pub fn define(&mut self, name: &str, var_type: &str, kind: Kind) {
        let symbol = match kind {
            Kind::Static => {
                let index = self.static_count;
                self.static_count += 1;
                Symbol { var_type: var_type.to_string(), kind, index }
            }
            Kind::Field => {
                let index = self.field_count;
                self.field_count += 1;
                Symbol { var_type: var_type.to_string(), kind, index }
            }
            Kind::Argument => {
                let index = self.arg_count;
                self.arg_count += 1;
                Symbol { var_type: var_type.to_string(), kind, index }
            }
            Kind::Local => {
                let index = self.local_count;
                self.local_count += 1;
                Symbol { var_type: var_type.to_string(), kind, index }
            }
        };

        match kind {
            Kind::Static | Kind::Field => {
                self.class_scope.insert(name.to_string(), symbol);
            }
            Kind::Argument | Kind::Local => {
                self.subroutine_scope.insert(name.to_string(), symbol);
            }
        }
    }

    pub fn var_count(&self, kind: Kind) -> u16 {
        match kind {
            Kind::Static => self.static_count,
            Kind::Field => self.field_count,
            Kind::Argument => self.arg_count,
            Kind::Local => self.local_count,
        }
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope.get(name).or_else(|| self.class_scope.get(name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.lookup(name).map(|s| s.kind)
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|s| s.var_type.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.lookup(name).map(|s| s.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_scope_persists_across_subroutines() {
        let mut table = SymbolTable::new();
        table.define("count", "int", Kind::Field);
        table.start_subroutine();
        assert_eq!(table.kind_of("count"), Some(Kind::Field));
        assert_eq!(table.index_of("count"), Some(0));
    }

    #[test]
    fn test_subroutine_scope_resets() {
        let mut table = SymbolTable::new();
        table.define("a", "int", Kind::Argument);
        table.start_subroutine();
        assert!(!table.exists("a"));
        assert_eq!(table.var_count(Kind::Argument), 0);
    }

    #[test]
    fn test_subroutine_scope_shadows_class_scope() {
        let mut table = SymbolTable::new();
        table.define("x", "int", Kind::Field);
        table.define("x", "boolean", Kind::Local);
        assert_eq!(table.kind_of("x"), Some(Kind::Local));
        assert_eq!(table.type_of("x"), Some("boolean"));
    }

    #[test]
    fn test_independent_counters_per_kind() {
        let mut table = SymbolTable::new();
        table.define("s1", "int", Kind::Static);
        table.define("f1", "int", Kind::Field);
        table.define("f2", "int", Kind::Field);
        table.define("a1", "int", Kind::Argument);
        assert_eq!(table.var_count(Kind::Static), 1);
        assert_eq!(table.var_count(Kind::Field), 2);
        assert_eq!(table.var_count(Kind::Argument), 1);
        assert_eq!(table.index_of("f2"), Some(1));
    }
}
