use std::fmt;
use thiserror::Error;

/// Raised while turning a source string into a validated expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid syntax at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    #[error("Use of name '{0}' is not allowed")]
    UnknownVariable(String),

    #[error("Method '{0}' is not allowed")]
    MethodNotAllowed(String),

    #[error("Call not allowed: {0}")]
    CallNotAllowed(String),

    #[error("Operator '{0}' is not allowed")]
    OperatorNotAllowed(String),

    #[error("Only string, integer, or float constants are allowed, found {0}")]
    InvalidLiteral(String),
}

/// Raised while evaluating a validated expression against a context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Name '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Value error: {0}")]
    ValueError(String),

    #[error("Division by zero: {0}")]
    ZeroDivision(String),

    #[error("Index error: {0}")]
    IndexOutOfRange(String),

    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
}

/// Raised when a policy is assembled from names that the evaluator does not know.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Unknown method '{0}'")]
    UnknownMethod(String),

    #[error("Unknown built-in '{0}'")]
    UnknownBuiltin(String),

    #[error("Unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("Unknown literal kind '{0}'")]
    UnknownLiteralKind(String),

    #[error("Invalid variable name '{0}'")]
    InvalidName(String),
}

/// Either half of the `source -> validate -> evaluate` pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SafeEvalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// A flat tag for every failure the evaluator can report, for callers that
/// want to branch on the failed rule rather than parse the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    UnsupportedConstruct,
    UnknownVariable,
    MethodNotAllowed,
    CallNotAllowed,
    OperatorNotAllowed,
    InvalidLiteral,
    UndefinedVariable,
    EvaluationTypeError,
    ValueError,
    ZeroDivision,
    IndexOutOfRange,
    LimitExceeded,
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::Syntax { .. } => ErrorKind::Syntax,
            ValidationError::UnsupportedConstruct(_) => ErrorKind::UnsupportedConstruct,
            ValidationError::UnknownVariable(_) => ErrorKind::UnknownVariable,
            ValidationError::MethodNotAllowed(_) => ErrorKind::MethodNotAllowed,
            ValidationError::CallNotAllowed(_) => ErrorKind::CallNotAllowed,
            ValidationError::OperatorNotAllowed(_) => ErrorKind::OperatorNotAllowed,
            ValidationError::InvalidLiteral(_) => ErrorKind::InvalidLiteral,
        }
    }
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::UndefinedVariable(_) => ErrorKind::UndefinedVariable,
            EvalError::TypeError(_) => ErrorKind::EvaluationTypeError,
            EvalError::ValueError(_) => ErrorKind::ValueError,
            EvalError::ZeroDivision(_) => ErrorKind::ZeroDivision,
            EvalError::IndexOutOfRange(_) => ErrorKind::IndexOutOfRange,
            EvalError::LimitExceeded(_) => ErrorKind::LimitExceeded,
        }
    }
}

impl SafeEvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SafeEvalError::Validation(e) => e.kind(),
            SafeEvalError::Eval(e) => e.kind(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "Syntax",
            ErrorKind::UnsupportedConstruct => "UnsupportedConstruct",
            ErrorKind::UnknownVariable => "UnknownVariable",
            ErrorKind::MethodNotAllowed => "MethodNotAllowed",
            ErrorKind::CallNotAllowed => "CallNotAllowed",
            ErrorKind::OperatorNotAllowed => "OperatorNotAllowed",
            ErrorKind::InvalidLiteral => "InvalidLiteral",
            ErrorKind::UndefinedVariable => "UndefinedVariable",
            ErrorKind::EvaluationTypeError => "EvaluationTypeError",
            ErrorKind::ValueError => "ValueError",
            ErrorKind::ZeroDivision => "ZeroDivision",
            ErrorKind::IndexOutOfRange => "IndexOutOfRange",
            ErrorKind::LimitExceeded => "LimitExceeded",
        };
        f.write_str(name)
    }
}
