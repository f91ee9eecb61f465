//! Atomic assignment commands.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use tangle_core::{CoreError, CoreResult, Store, Value, Var};

use crate::expr::Expr;

/// An atomic assignment of one variable from an arithmetic expression
///
/// Parsed once from a statement of the form `assignee=expression`. The
/// touched-variable set (assignee plus every variable the expression
/// reads) is computed at construction and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    assignee: Var,
    expr: Expr,
    touched: BTreeSet<Var>,
}

impl Command {
    /// Parse a command statement
    ///
    /// # Errors
    ///
    /// Returns `MalformedCommand` if the statement cannot be split into
    /// assignee and expression, or contains a character outside the
    /// permitted alphabet, digits, and operators.
    pub fn parse(statement: &str) -> CoreResult<Self> {
        let malformed = |reason: String| CoreError::MalformedCommand {
            statement: statement.to_string(),
            reason,
        };

        let (lhs, rhs) = statement
            .split_once('=')
            .ok_or_else(|| malformed("missing '='".to_string()))?;

        let mut lhs_chars = lhs.chars();
        let assignee = match (lhs_chars.next(), lhs_chars.next()) {
            (Some(c), None) => Var::new(c)
                .ok_or_else(|| malformed("assignee is not a lowercase letter".to_string()))?,
            _ => return Err(malformed("assignee must be a single variable".to_string())),
        };

        if rhs.is_empty() {
            return Err(malformed("empty expression".to_string()));
        }
        let expr = Expr::parse(rhs).map_err(|err| match err {
            CoreError::MalformedCommand { reason, .. } => malformed(reason),
            other => other,
        })?;

        let mut touched = expr.vars();
        touched.insert(assignee);
        Ok(Self {
            assignee,
            expr,
            touched,
        })
    }

    /// The variable this command writes
    #[must_use]
    pub fn assignee(&self) -> Var {
        self.assignee
    }

    /// The parsed expression
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Every variable this command touches (assignee included)
    #[must_use]
    pub fn touched_vars(&self) -> &BTreeSet<Var> {
        &self.touched
    }

    /// The statement source text
    #[must_use]
    pub fn statement(&self) -> String {
        self.to_string()
    }

    /// Evaluate the expression, write the result to the assignee, and
    /// return the written value
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable` if the expression reads a variable
    /// absent from the store.
    pub fn evaluate(&self, store: &mut Store) -> CoreResult<Value> {
        let value = self.expr.evaluate(store)?;
        store.set(self.assignee, value);
        Ok(value)
    }

    /// True iff this command and `other` touch a common variable
    ///
    /// Symmetric, no side effects.
    #[must_use]
    pub fn interferes_with(&self, other: &Command) -> bool {
        !self.touched.is_disjoint(&other.touched)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.assignee, self.expr)
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let statement = String::deserialize(deserializer)?;
        Self::parse(&statement).map_err(de::Error::custom)
    }
}
