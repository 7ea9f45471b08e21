//! A restricted, Python-flavoured expression language for naming templates.
//!
//! Templates such as `level_name.upper() + " - " + scope_box_name[-1]` are
//! parsed into a broad syntax tree, checked node by node against a [`Policy`]
//! allow-list, and only then lowered into an [`Expression`] that the engine can
//! evaluate against a [`Context`] of string variables.

pub mod ast;
pub mod engine;
pub mod error;
mod format;
mod methods;
mod operators;
pub mod parser;
pub mod policy;
pub mod syntax;
mod template;
mod validator;
pub mod value;

// --- Public API ---
pub use ast::{ArithmeticOp, Builtin, Callee, Expression, Literal, LiteralKind, Method, UnaryOperator};
pub use engine::{EvaluationContext, evaluate};
pub use error::{ErrorKind, EvalError, PolicyError, SafeEvalError, ValidationError};
pub use policy::{AttributeChaining, Limits, NAMING_VARIABLES, Policy, PolicySpec};
pub use template::{Template, safe_eval};
pub use validator::validate;
pub use value::{Context, Value};
