//! Walks a raw syntax tree and either lowers it into an [`Expression`] or
//! reports the first construct the policy does not allow.

use crate::ast::{ArithmeticOp, Builtin, Callee, Expression, Literal, Method, UnaryOperator};
use crate::error::ValidationError;
use crate::parser;
use crate::policy::{AttributeChaining, Policy};
use crate::syntax::{Argument, BinOp, Constant, Node, UnaryOp};

/// Parses `source` and checks every node against `policy`.
pub fn validate(source: &str, policy: &Policy) -> Result<Expression, ValidationError> {
    let node = parser::parse(source)?;
    let result = Validator { policy }.visit(&node);
    match &result {
        Ok(_) => log::trace!("Validated template '{}'", source),
        Err(e) => log::debug!("Rejected template '{}': {}", source, e),
    }
    result
}

struct Validator<'p> {
    policy: &'p Policy,
}

impl Validator<'_> {
    fn visit(&self, node: &Node) -> Result<Expression, ValidationError> {
        match node {
            Node::Constant(constant) => self.visit_constant(constant),
            Node::Name(id) => self.visit_name(id),
            Node::Attribute { value, attr } => {
                let (value, method) = self.visit_attribute(value, attr)?;
                Ok(Expression::Attribute { value, method })
            }
            Node::Call { func, args } => self.visit_call(func, args),
            Node::BinOp { left, op, right } => {
                let op = self.check_operator(*op)?;
                Ok(Expression::BinaryOp {
                    left: Box::new(self.visit(left)?),
                    op,
                    right: Box::new(self.visit(right)?),
                })
            }
            Node::UnaryOp { op, operand } => match op {
                UnaryOp::Neg => Ok(Expression::UnaryOp {
                    op: UnaryOperator::Minus,
                    operand: Box::new(self.visit(operand)?),
                }),
                UnaryOp::Pos | UnaryOp::Invert | UnaryOp::Not => {
                    Err(ValidationError::OperatorNotAllowed(op.symbol().to_string()))
                }
            },
            Node::BoolOp { op, .. } => {
                Err(ValidationError::OperatorNotAllowed(op.symbol().to_string()))
            }
            Node::Compare { ops, .. } => Err(ValidationError::OperatorNotAllowed(
                ops.first().map_or("comparison", |op| op.symbol()).to_string(),
            )),
            Node::Subscript { value, index } => Ok(Expression::Subscript {
                value: Box::new(self.visit(value)?),
                index: Box::new(self.visit_index(index)?),
            }),
            Node::Slice { lower, upper, step } => self.visit_slice(lower, upper, step),
            Node::IfExp { .. }
            | Node::Lambda { .. }
            | Node::NamedExpr { .. }
            | Node::Tuple(_)
            | Node::List(_)
            | Node::Set(_)
            | Node::Dict(_)
            | Node::Comprehension { .. }
            | Node::Starred(_)
            | Node::FString(_)
            | Node::Await(_)
            | Node::Yield(_)
            | Node::Statement(_) => Err(ValidationError::UnsupportedConstruct(
                node.kind_name().to_string(),
            )),
        }
    }

    fn visit_constant(&self, constant: &Constant) -> Result<Expression, ValidationError> {
        let literal = match constant {
            Constant::Str(s) => Literal::Str(s.clone()),
            Constant::Int(i) => Literal::Int(*i),
            Constant::Float(x) => Literal::Float(*x),
            Constant::Complex(_)
            | Constant::Bytes(_)
            | Constant::Bool(_)
            | Constant::None
            | Constant::Ellipsis => {
                return Err(ValidationError::InvalidLiteral(constant.to_string()));
            }
        };
        if !self.policy.allows_literal(literal.kind()) {
            return Err(ValidationError::InvalidLiteral(constant.to_string()));
        }
        Ok(Expression::Literal(literal))
    }

    fn visit_name(&self, id: &str) -> Result<Expression, ValidationError> {
        if self.policy.allows_name(id) {
            Ok(Expression::Variable(id.to_string()))
        } else {
            Err(ValidationError::UnknownVariable(id.to_string()))
        }
    }

    /// The base is validated before the attribute name is checked, so the
    /// innermost offending construct is the one reported.
    fn visit_attribute(
        &self,
        value: &Node,
        attr: &str,
    ) -> Result<(Box<Expression>, Method), ValidationError> {
        if self.policy.attribute_chaining() == AttributeChaining::VariableOnly
            && !matches!(value, Node::Name(_))
        {
            return Err(ValidationError::UnsupportedConstruct(format!(
                "attribute access on a {}",
                value.kind_name()
            )));
        }
        let base = self.visit(value)?;
        let method = attr
            .parse::<Method>()
            .ok()
            .filter(|m| self.policy.allows_method(*m))
            .ok_or_else(|| ValidationError::MethodNotAllowed(attr.to_string()))?;
        Ok((Box::new(base), method))
    }

    fn visit_call(&self, func: &Node, args: &[Argument]) -> Result<Expression, ValidationError> {
        let callee = match func {
            Node::Attribute { value, attr } => {
                let (receiver, method) = self.visit_attribute(value, attr)?;
                Callee::Method { receiver, method }
            }
            Node::Name(id) => {
                let builtin = id
                    .parse::<Builtin>()
                    .ok()
                    .filter(|b| self.policy.allows_builtin(*b))
                    .ok_or_else(|| {
                        ValidationError::CallNotAllowed(format!("function '{}'", id))
                    })?;
                Callee::Builtin(builtin)
            }
            other => {
                return Err(ValidationError::CallNotAllowed(format!(
                    "calling the result of a {}",
                    other.kind_name()
                )));
            }
        };

        let args = args
            .iter()
            .map(|arg| match arg {
                Argument::Positional(node) => self.visit(node),
                Argument::Keyword { name, .. } => Err(ValidationError::CallNotAllowed(
                    format!("keyword argument '{}'", name),
                )),
                Argument::Starred(_) | Argument::DoubleStarred(_) => Err(
                    ValidationError::CallNotAllowed("argument unpacking".to_string()),
                ),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Expression::Call { callee, args })
    }

    fn check_operator(&self, op: BinOp) -> Result<ArithmeticOp, ValidationError> {
        let allowed = match op {
            BinOp::Add => Some(ArithmeticOp::Add),
            BinOp::Sub => Some(ArithmeticOp::Sub),
            BinOp::Mul => Some(ArithmeticOp::Mul),
            BinOp::Div => Some(ArithmeticOp::Div),
            BinOp::Mod => Some(ArithmeticOp::Mod),
            BinOp::FloorDiv
            | BinOp::Pow
            | BinOp::MatMul
            | BinOp::LShift
            | BinOp::RShift
            | BinOp::BitOr
            | BinOp::BitXor
            | BinOp::BitAnd => None,
        };
        allowed
            .filter(|op| self.policy.allows_operator(*op))
            .ok_or_else(|| ValidationError::OperatorNotAllowed(op.symbol().to_string()))
    }

    fn visit_index(&self, index: &Node) -> Result<Expression, ValidationError> {
        match index {
            Node::Slice { lower, upper, step } => self.visit_slice(lower, upper, step),
            Node::Tuple(_) => Err(ValidationError::UnsupportedConstruct(
                "tuple index".to_string(),
            )),
            other => self.visit(other),
        }
    }

    fn visit_slice(
        &self,
        lower: &Option<Box<Node>>,
        upper: &Option<Box<Node>>,
        step: &Option<Box<Node>>,
    ) -> Result<Expression, ValidationError> {
        let bound = |node: &Option<Box<Node>>| -> Result<Option<Box<Expression>>, ValidationError> {
            node.as_deref()
                .map(|n| self.visit(n).map(Box::new))
                .transpose()
        };
        Ok(Expression::Slice {
            lower: bound(lower)?,
            upper: bound(upper)?,
            step: bound(step)?,
        })
    }
}
