//! Arithmetic expression trees for command statements.
//!
//! Expressions are parsed once at command construction and evaluated by
//! walking the tree against the store. The permitted tokens are
//! lowercase variable names, integer literals, and `+ - *` with
//! standard precedence and left associativity.

use std::collections::BTreeSet;
use std::fmt;

use tangle_core::{CoreError, CoreResult, Store, Value, Var};

/// Binary operator in a command expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
}

impl Op {
    /// Operator for a source character, if any
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            _ => None,
        }
    }

    /// Source character of this operator
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
        }
    }

    /// Binding strength; `*` binds tighter than `+` and `-`
    const fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul => 2,
        }
    }

    fn apply(self, lhs: Value, rhs: Value) -> Value {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
        }
    }
}

/// A side-effect-free arithmetic expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Integer literal
    Num(Value),
    /// Variable read
    Var(Var),
    /// Binary operation
    Binary {
        /// Operator
        op: Op,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Parse an expression source string
    ///
    /// # Errors
    ///
    /// Returns `MalformedCommand` (with the expression source as the
    /// statement) on any token outside the permitted set or any
    /// structural error.
    pub fn parse(src: &str) -> CoreResult<Self> {
        let malformed = |reason: String| CoreError::MalformedCommand {
            statement: src.to_string(),
            reason,
        };
        let tokens = tokenize(src).map_err(&malformed)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr(0).map_err(&malformed)?;
        if parser.pos < parser.tokens.len() {
            return Err(malformed("expected an operator".to_string()));
        }
        Ok(expr)
    }

    /// Evaluate against the store
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable` if a read variable is absent.
    pub fn evaluate(&self, store: &Store) -> CoreResult<Value> {
        match self {
            Self::Num(n) => Ok(*n),
            Self::Var(var) => store.read(*var),
            Self::Binary { op, lhs, rhs } => {
                Ok(op.apply(lhs.evaluate(store)?, rhs.evaluate(store)?))
            }
        }
    }

    /// Every variable this expression reads
    #[must_use]
    pub fn vars(&self) -> BTreeSet<Var> {
        let mut out = BTreeSet::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut BTreeSet<Var>) {
        match self {
            Self::Num(_) => {}
            Self::Var(var) => {
                out.insert(*var);
            }
            Self::Binary { lhs, rhs, .. } => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{}", n),
            Self::Var(var) => write!(f, "{}", var),
            Self::Binary { op, lhs, rhs } => write!(f, "{}{}{}", lhs, op.symbol(), rhs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Num(Value),
    Var(Var),
    Op(Op),
}

fn tokenize(src: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();
    while let Some(&c) = chars.peek() {
        if let Some(var) = Var::new(c) {
            chars.next();
            tokens.push(Token::Var(var));
        } else if c.is_ascii_digit() {
            let mut n: Value = 0;
            while let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)) {
                n = n * 10 + Value::from(digit);
                chars.next();
            }
            tokens.push(Token::Num(n));
        } else if let Some(op) = Op::from_char(c) {
            chars.next();
            tokens.push(Token::Op(op));
        } else {
            return Err(format!("unexpected character {:?}", c));
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn operand(&mut self) -> Result<Expr, String> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        match token {
            Some(Token::Num(n)) => Ok(Expr::Num(n)),
            Some(Token::Var(var)) => Ok(Expr::Var(var)),
            _ => Err("expected a variable or number".to_string()),
        }
    }

    // Precedence climbing; ties bind left.
    fn expr(&mut self, min_prec: u8) -> Result<Expr, String> {
        let mut lhs = self.operand()?;
        while let Some(Token::Op(op)) = self.tokens.get(self.pos).copied() {
            if op.precedence() < min_prec {
                break;
            }
            self.pos += 1;
            let rhs = self.expr(op.precedence() + 1)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }
}
