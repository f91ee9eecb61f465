//! Shared mutable state for command execution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::var::Var;

/// Arithmetic value written by commands
pub type Value = i64;

/// Shared variable store mutated by instance execution
///
/// Backed by a sorted map so that equality checks, serialization, and
/// report rendering are canonical regardless of write order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store(BTreeMap<Var, Value>);

impl Store {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Create a store with every alphabet variable bound to its
    /// 1-based position
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocument` if the alphabet contains a character
    /// that is not a lowercase letter.
    pub fn seeded(alphabet: &str) -> CoreResult<Self> {
        let mut store = Self::new();
        for (i, c) in alphabet.chars().enumerate() {
            let var = Var::new(c).ok_or_else(|| CoreError::InvalidDocument {
                message: format!("alphabet contains invalid variable name {:?}", c),
            })?;
            store.set(var, i as Value + 1);
        }
        Ok(store)
    }

    /// Look up a variable
    #[must_use]
    pub fn get(&self, var: Var) -> Option<Value> {
        self.0.get(&var).copied()
    }

    /// Look up a variable, failing loudly when it is absent
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable` if the variable is not in the store.
    pub fn read(&self, var: Var) -> CoreResult<Value> {
        self.get(var).ok_or(CoreError::UndefinedVariable { var })
    }

    /// Bind a variable
    pub fn set(&mut self, var: Var, value: Value) {
        self.0.insert(var, value);
    }

    /// Check whether a variable is bound
    #[must_use]
    pub fn contains(&self, var: Var) -> bool {
        self.0.contains_key(&var)
    }

    /// Number of bound variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over bindings in variable order
    pub fn iter(&self) -> impl Iterator<Item = (Var, Value)> + '_ {
        self.0.iter().map(|(&var, &value)| (var, value))
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (var, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", var, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(c: char) -> Var {
        Var::new(c).unwrap()
    }

    #[test]
    fn test_store_set_get() {
        let mut store = Store::new();
        assert!(store.is_empty());

        store.set(var('x'), 5);
        assert_eq!(store.get(var('x')), Some(5));
        assert!(store.contains(var('x')));
        assert_eq!(store.len(), 1);

        store.set(var('x'), -2);
        assert_eq!(store.get(var('x')), Some(-2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_read_missing() {
        let store = Store::new();
        let err = store.read(var('z')).unwrap_err();
        assert_eq!(err, CoreError::UndefinedVariable { var: var('z') });
    }

    #[test]
    fn test_store_seeded() {
        let store = Store::seeded("xyz").unwrap();
        assert_eq!(store.get(var('x')), Some(1));
        assert_eq!(store.get(var('y')), Some(2));
        assert_eq!(store.get(var('z')), Some(3));
    }

    #[test]
    fn test_store_seeded_rejects_bad_alphabet() {
        assert!(Store::seeded("xY").is_err());
    }

    #[test]
    fn test_store_display_sorted() {
        let mut store = Store::new();
        store.set(var('y'), 2);
        store.set(var('x'), 1);
        assert_eq!(format!("{}", store), "{x: 1, y: 2}");
    }

    #[test]
    fn test_store_equality_ignores_write_order() {
        let mut a = Store::new();
        a.set(var('a'), 1);
        a.set(var('b'), 2);

        let mut b = Store::new();
        b.set(var('b'), 2);
        b.set(var('a'), 1);

        assert_eq!(a, b);
    }
}
