//! The raw syntax tree produced by the parser.
//!
//! This tree covers far more of the Python expression grammar than templates
//! are allowed to use. Comparisons, lambdas, comprehensions, f-strings and
//! even statement forms are parsed so that the validator can reject them by
//! name. Nothing in this module is ever evaluated.

use std::fmt;

/// A constant as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Str(String),
    Int(i64),
    Float(f64),
    /// An imaginary literal such as `2j`; only the magnitude is kept.
    Complex(f64),
    Bytes(Vec<u8>),
    Bool(bool),
    None,
    Ellipsis,
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Str(s) => write!(f, "{:?}", s),
            Constant::Int(i) => write!(f, "{}", i),
            Constant::Float(x) => write!(f, "{}", x),
            Constant::Complex(x) => write!(f, "{}j", x),
            Constant::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Constant::Bool(true) => f.write_str("True"),
            Constant::Bool(false) => f.write_str("False"),
            Constant::None => f.write_str("None"),
            Constant::Ellipsis => f.write_str("..."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    MatMul,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::MatMul => "@",
            BinOp::LShift => "<<",
            BinOp::RShift => ">>",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Invert,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Invert => "~",
            UnaryOp::Not => "not",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComprehensionKind {
    List,
    Set,
    Dict,
    Generator,
}

/// One `for target in iter if cond...` clause of a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub target: Node,
    pub iter: Node,
    pub conditions: Vec<Node>,
}

/// A call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Positional(Node),
    Keyword { name: String, value: Node },
    /// `*args`
    Starred(Node),
    /// `**kwargs`
    DoubleStarred(Node),
}

/// A statement form found where an expression was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Import,
    ImportFrom,
    Assign,
    AugAssign,
    AnnAssign,
    /// A statement introduced by a reserved keyword such as `def` or `while`.
    Keyword(&'static str),
    /// More than one statement separated by `;` or a newline.
    Suite,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(Constant),
    Name(String),
    Attribute {
        value: Box<Node>,
        attr: String,
    },
    Call {
        func: Box<Node>,
        args: Vec<Argument>,
    },
    BinOp {
        left: Box<Node>,
        op: BinOp,
        right: Box<Node>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Node>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<Node>,
    },
    Compare {
        left: Box<Node>,
        ops: Vec<CmpOp>,
        comparators: Vec<Node>,
    },
    IfExp {
        test: Box<Node>,
        body: Box<Node>,
        orelse: Box<Node>,
    },
    Lambda {
        params: Vec<String>,
        body: Box<Node>,
    },
    NamedExpr {
        target: String,
        value: Box<Node>,
    },
    Subscript {
        value: Box<Node>,
        index: Box<Node>,
    },
    Slice {
        lower: Option<Box<Node>>,
        upper: Option<Box<Node>>,
        step: Option<Box<Node>>,
    },
    Tuple(Vec<Node>),
    List(Vec<Node>),
    Set(Vec<Node>),
    Dict(Vec<(Node, Node)>),
    Comprehension {
        kind: ComprehensionKind,
        element: Box<Node>,
        /// The value half of a dict comprehension.
        value: Option<Box<Node>>,
        generators: Vec<Generator>,
    },
    Starred(Box<Node>),
    /// An f-string; its body is kept verbatim and never interpreted.
    FString(String),
    Await(Box<Node>),
    Yield(Option<Box<Node>>),
    Statement(StatementKind),
}

impl Node {
    /// A human-readable name for the kind of construct this node represents.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Constant(_) => "constant",
            Node::Name(_) => "name",
            Node::Attribute { .. } => "attribute access",
            Node::Call { .. } => "call",
            Node::BinOp { .. } => "binary operation",
            Node::UnaryOp { .. } => "unary operation",
            Node::BoolOp { .. } => "boolean operation",
            Node::Compare { .. } => "comparison",
            Node::IfExp { .. } => "conditional expression",
            Node::Lambda { .. } => "lambda",
            Node::NamedExpr { .. } => "assignment expression",
            Node::Subscript { .. } => "subscript",
            Node::Slice { .. } => "slice",
            Node::Tuple(_) => "tuple",
            Node::List(_) => "list",
            Node::Set(_) => "set",
            Node::Dict(_) => "dict",
            Node::Comprehension { kind, .. } => match kind {
                ComprehensionKind::List => "list comprehension",
                ComprehensionKind::Set => "set comprehension",
                ComprehensionKind::Dict => "dict comprehension",
                ComprehensionKind::Generator => "generator expression",
            },
            Node::Starred(_) => "starred expression",
            Node::FString(_) => "f-string",
            Node::Await(_) => "await",
            Node::Yield(_) => "yield",
            Node::Statement(kind) => kind.name(),
        }
    }
}

impl StatementKind {
    pub fn name(self) -> &'static str {
        match self {
            StatementKind::Import => "import statement",
            StatementKind::ImportFrom => "from-import statement",
            StatementKind::Assign => "assignment",
            StatementKind::AugAssign => "augmented assignment",
            StatementKind::AnnAssign => "annotated assignment",
            StatementKind::Keyword(kw) => match kw {
                "def" => "function definition",
                "class" => "class definition",
                "if" => "if statement",
                "for" => "for loop",
                "while" => "while loop",
                "with" => "with statement",
                "try" => "try statement",
                "del" => "del statement",
                "pass" => "pass statement",
                "return" => "return statement",
                "raise" => "raise statement",
                "global" => "global statement",
                "nonlocal" => "nonlocal statement",
                "assert" => "assert statement",
                "break" => "break statement",
                "continue" => "continue statement",
                "async" => "async statement",
                _ => "statement",
            },
            StatementKind::Suite => "multiple statements",
        }
    }
}
