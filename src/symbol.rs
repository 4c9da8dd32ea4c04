//! The global symbol table: a flat, insertion-ordered report artifact that
//! is independent of the scope stack (which governs visibility during
//! analysis, not what gets reported).

use serde::{Deserialize, Serialize};

use crate::semantic::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolCategory {
    Variable,
    Procedure,
    Function,
    Parameter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub category: SymbolCategory,
    pub declared_type: Option<Type>,
    pub parameters: Option<Vec<Type>>,
    pub return_type: Option<Type>,
    pub current_value: Option<String>,
}

impl SymbolEntry {
    /// The lexer's pre-population placeholder: an identifier has been seen
    /// but not yet declared, so its type is not known.
    pub fn undefined() -> Self {
        Self {
            category: SymbolCategory::Variable,
            declared_type: None,
            parameters: None,
            return_type: None,
            current_value: None,
        }
    }
}

/// A mapping from identifier name to symbol entry, insertion order
/// preserved for rendering. Populated once per identifier by the lexer as
/// a placeholder, then overwritten by the semantic analyzer once a real
/// declaration is seen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    order: Vec<String>,
    entries: std::collections::HashMap<String, SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a placeholder entry for `name` if it hasn't been seen before.
    /// Used by the lexer during its pre-population pass.
    pub fn insert_placeholder(&mut self, name: &str) {
        if !self.entries.contains_key(name) {
            self.order.push(name.to_string());
            self.entries.insert(name.to_string(), SymbolEntry::undefined());
        }
    }

    /// Overwrite (or insert) a fully-resolved entry, e.g. once the semantic
    /// analyzer has processed a declaration. Preserves the original
    /// insertion position if the name was already present.
    pub fn set(&mut self, name: &str, entry: SymbolEntry) {
        if !self.entries.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.entries.insert(name.to_string(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SymbolEntry> {
        self.entries.get_mut(name)
    }

    /// Update `current_value` for an already-declared variable.
    pub fn set_current_value(&mut self, name: &str, value: String) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.current_value = Some(value);
        }
    }

    /// Entries in insertion order, for report rendering.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SymbolEntry)> {
        self.order.iter().map(move |name| (name, &self.entries[name]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_then_real_entry_preserves_order() {
        let mut table = SymbolTable::new();
        table.insert_placeholder("x");
        table.insert_placeholder("y");
        table.set(
            "x",
            SymbolEntry {
                category: SymbolCategory::Variable,
                declared_type: Some(Type::Integer),
                parameters: None,
                return_type: None,
                current_value: Some("7".into()),
            },
        );

        let names: Vec<&str> = table.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(table.get("x").unwrap().declared_type, Some(Type::Integer));
    }

    #[test]
    fn repeated_placeholder_does_not_duplicate() {
        let mut table = SymbolTable::new();
        table.insert_placeholder("x");
        table.insert_placeholder("x");
        assert_eq!(table.iter().count(), 1);
    }
}
