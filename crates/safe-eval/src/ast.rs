//! The validated expression tree.
//!
//! Every variant here is an operation the evaluator knows how to perform
//! safely. The validator is the only producer of this tree in the crate, so an
//! `Expression` obtained from [`crate::validate`] has already passed a policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
}

/// The kinds of literal a policy may permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    Str,
    Int,
    Float,
}

impl LiteralKind {
    pub const ALL: [LiteralKind; 3] = [LiteralKind::Str, LiteralKind::Int, LiteralKind::Float];

    pub fn name(self) -> &'static str {
        match self {
            LiteralKind::Str => "str",
            LiteralKind::Int => "int",
            LiteralKind::Float => "float",
        }
    }
}

impl FromStr for LiteralKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LiteralKind::ALL.into_iter().find(|k| k.name() == s).ok_or(())
    }
}

impl Literal {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Literal::Str(_) => LiteralKind::Str,
            Literal::Int(_) => LiteralKind::Int,
            Literal::Float(_) => LiteralKind::Float,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 5] = [
        ArithmeticOp::Add,
        ArithmeticOp::Sub,
        ArithmeticOp::Mul,
        ArithmeticOp::Div,
        ArithmeticOp::Mod,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Mod => "%",
        }
    }
}

impl FromStr for ArithmeticOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArithmeticOp::ALL.into_iter().find(|op| op.symbol() == s).ok_or(())
    }
}

/// Unary operators that survive validation. Only negation is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
}

/// String methods the evaluator implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Upper,
    Lower,
    Strip,
    LStrip,
    RStrip,
    Replace,
    Capitalize,
    Title,
    SwapCase,
    Split,
    Join,
    ZFill,
    LJust,
    RJust,
    Center,
    Index,
    Find,
    Count,
}

impl Method {
    pub const ALL: [Method; 18] = [
        Method::Upper,
        Method::Lower,
        Method::Strip,
        Method::LStrip,
        Method::RStrip,
        Method::Replace,
        Method::Capitalize,
        Method::Title,
        Method::SwapCase,
        Method::Split,
        Method::Join,
        Method::ZFill,
        Method::LJust,
        Method::RJust,
        Method::Center,
        Method::Index,
        Method::Find,
        Method::Count,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Method::Upper => "upper",
            Method::Lower => "lower",
            Method::Strip => "strip",
            Method::LStrip => "lstrip",
            Method::RStrip => "rstrip",
            Method::Replace => "replace",
            Method::Capitalize => "capitalize",
            Method::Title => "title",
            Method::SwapCase => "swapcase",
            Method::Split => "split",
            Method::Join => "join",
            Method::ZFill => "zfill",
            Method::LJust => "ljust",
            Method::RJust => "rjust",
            Method::Center => "center",
            Method::Index => "index",
            Method::Find => "find",
            Method::Count => "count",
        }
    }
}

impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL.into_iter().find(|m| m.name() == s).ok_or(())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Built-in functions callable by bare name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Builtin {
    Str,
    Int,
    Float,
    Len,
}

impl Builtin {
    pub const ALL: [Builtin; 4] = [Builtin::Str, Builtin::Int, Builtin::Float, Builtin::Len];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Str => "str",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Len => "len",
        }
    }
}

impl FromStr for Builtin {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Builtin::ALL.into_iter().find(|b| b.name() == s).ok_or(())
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a `Call` invokes.
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Method {
        receiver: Box<Expression>,
        method: Method,
    },
    Builtin(Builtin),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Variable(String),
    /// A method looked up but not called. Evaluating this is a type error.
    Attribute {
        value: Box<Expression>,
        method: Method,
    },
    Call {
        callee: Callee,
        args: Vec<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: ArithmeticOp,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Subscript {
        value: Box<Expression>,
        index: Box<Expression>,
    },
    /// Only meaningful as the index of a `Subscript`.
    Slice {
        lower: Option<Box<Expression>>,
        upper: Option<Box<Expression>>,
        step: Option<Box<Expression>>,
    },
}

impl Expression {
    /// Names of every context variable the expression reads, in first-use order.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Variable(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expression::Attribute { value, .. } => value.collect_variables(names),
            Expression::Call { callee, args } => {
                if let Callee::Method { receiver, .. } = callee {
                    receiver.collect_variables(names);
                }
                for arg in args {
                    arg.collect_variables(names);
                }
            }
            Expression::BinaryOp { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Expression::UnaryOp { operand, .. } => operand.collect_variables(names),
            Expression::Subscript { value, index } => {
                value.collect_variables(names);
                index.collect_variables(names);
            }
            Expression::Slice { lower, upper, step } => {
                for bound in [lower, upper, step].into_iter().flatten() {
                    bound.collect_variables(names);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_round_trip() {
        for method in Method::ALL {
            assert_eq!(method.name().parse::<Method>(), Ok(method));
        }
        assert!("__class__".parse::<Method>().is_err());
        assert!("startswith".parse::<Method>().is_err());
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!("%".parse::<ArithmeticOp>(), Ok(ArithmeticOp::Mod));
        assert!("**".parse::<ArithmeticOp>().is_err());
        assert!("//".parse::<ArithmeticOp>().is_err());
    }

    #[test]
    fn test_variables_are_collected_once_in_order() {
        let expr = Expression::BinaryOp {
            left: Box::new(Expression::Variable("level_name".into())),
            op: ArithmeticOp::Add,
            right: Box::new(Expression::Call {
                callee: Callee::Method {
                    receiver: Box::new(Expression::Variable("scope_box_name".into())),
                    method: Method::Replace,
                },
                args: vec![
                    Expression::Variable("level_name".into()),
                    Expression::Literal(Literal::Str(String::new())),
                ],
            }),
        };
        assert_eq!(expr.variables(), vec!["level_name", "scope_box_name"]);
    }
}
