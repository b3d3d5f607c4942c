//! String interning for identifiers, keywords and type tags.
//!
//! Every name the lexer, parser and checker deal with — variable names,
//! function names, and even the built-in type tags `Int`/`Float`/`String`/
//! `Bool`/`Void` — passes through here first. Two `Sym`s compare equal iff
//! their source strings are equal, and that comparison never touches the
//! heap.

use std::collections::HashMap;
use std::fmt;

/// An interned name handle. Cheap to copy and compare; renders back to its
/// source string only for diagnostics, via `Interner::resolve`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sym(u32);

impl fmt::Debug for Sym {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Sym({})", self.0)
    }
}

impl Sym {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Deduplicating string interner. Strings are stored once; subsequent
/// `intern` calls with the same text return the previously issued `Sym`.
pub struct Interner {
    map: HashMap<String, Sym>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Interner { map: HashMap::new(), strings: Vec::new() }
    }

    pub fn intern(&mut self, s: &str) -> Sym {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }

        let sym = Sym(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.map.insert(s.to_string(), sym);
        sym
    }

    /// Look up the source string behind a `Sym`.
    ///
    /// # Panics
    /// Panics if `sym` was not produced by this interner.
    pub fn resolve(&self, sym: Sym) -> &str {
        &self.strings[sym.index()]
    }

    /// Look up a string that may already have been interned, without
    /// interning it. Used to recover `Builtins` from a shared `&Interner`
    /// once `Builtins::install` has already run against it.
    pub fn get(&self, s: &str) -> Option<Sym> {
        self.map.get(s).copied()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

/// Predefined symbols installed into every `Interner` at checker start-up
/// (the reserved names and built-in type tags every program starts with).
#[derive(Clone, Copy, Debug)]
pub struct Builtins {
    pub int: Sym,
    pub float: Sym,
    pub string: Sym,
    pub bool_: Sym,
    pub void: Sym,
    pub main: Sym,
    pub printf: Sym,
}

impl Builtins {
    pub fn install(interner: &mut Interner) -> Builtins {
        Builtins {
            int: interner.intern("Int"),
            float: interner.intern("Float"),
            string: interner.intern("String"),
            bool_: interner.intern("Bool"),
            void: interner.intern("Void"),
            main: interner.intern("main"),
            printf: interner.intern("printf"),
        }
    }

    /// Is `sym` one of the five built-in type tags?
    pub fn is_type_tag(&self, sym: Sym) -> bool {
        sym == self.int || sym == self.float || sym == self.string || sym == self.bool_ || sym == self.void
    }

    /// Re-derive the builtins from an interner that `install` was already
    /// run against, so a pass that only borrows the interner (the checker)
    /// can still get at the same `Sym`s the parser saw.
    ///
    /// # Panics
    /// Panics if `install` was never called on `interner`.
    pub fn lookup(interner: &Interner) -> Builtins {
        Builtins {
            int: interner.get("Int").expect("Builtins::install must run before Builtins::lookup"),
            float: interner.get("Float").expect("Builtins::install must run before Builtins::lookup"),
            string: interner.get("String").expect("Builtins::install must run before Builtins::lookup"),
            bool_: interner.get("Bool").expect("Builtins::install must run before Builtins::lookup"),
            void: interner.get("Void").expect("Builtins::install must run before Builtins::lookup"),
            main: interner.get("main").expect("Builtins::install must run before Builtins::lookup"),
            printf: interner.get("printf").expect("Builtins::install must run before Builtins::lookup"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_interns_to_same_symbol() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn different_strings_intern_to_different_symbols() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_round_trips() {
        let mut interner = Interner::new();
        let sym = interner.intern("hello");
        assert_eq!(interner.resolve(sym), "hello");
    }

    #[test]
    fn builtins_are_distinct() {
        let mut interner = Interner::new();
        let builtins = Builtins::install(&mut interner);
        assert!(builtins.is_type_tag(builtins.int));
        assert!(builtins.is_type_tag(builtins.void));
        assert!(!builtins.is_type_tag(builtins.main));
        assert!(!builtins.is_type_tag(builtins.printf));
    }
}
