//! The evaluation engine for executing a validated expression against a `Context`.

use crate::ast::{Callee, Expression, Literal, UnaryOperator};
use crate::error::EvalError;
use crate::methods;
use crate::operators;
use crate::policy::Limits;
use crate::value::{Context, Value};

/// Everything an evaluation reads. Nothing in it changes while evaluating.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'d> {
    pub variables: &'d Context,
    pub limits: Limits,
}

impl<'d> EvaluationContext<'d> {
    pub fn new(variables: &'d Context, limits: Limits) -> Self {
        Self { variables, limits }
    }
}

/// Evaluates a validated expression and returns a concrete `Value`.
pub fn evaluate(expr: &Expression, e_ctx: &EvaluationContext<'_>) -> Result<Value, EvalError> {
    match expr {
        Expression::Literal(literal) => Ok(match literal {
            Literal::Str(s) => Value::Str(s.clone()),
            Literal::Int(i) => Value::Int(*i),
            Literal::Float(x) => Value::Float(*x),
        }),
        Expression::Variable(name) => e_ctx
            .variables
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),
        Expression::Attribute { value, method } => {
            let receiver = evaluate(value, e_ctx)?;
            Err(EvalError::TypeError(format!(
                "method '{}' of '{}' object must be called",
                method,
                receiver.type_name()
            )))
        }
        Expression::Call { callee, args } => match callee {
            Callee::Method { receiver, method } => {
                let receiver = evaluate(receiver, e_ctx)?;
                let args = evaluate_args(args, e_ctx)?;
                log::trace!("Calling {}.{}() with {} argument(s)", receiver.type_name(), method, args.len());
                methods::call_method(*method, &receiver, &args, &e_ctx.limits)
            }
            Callee::Builtin(builtin) => {
                let args = evaluate_args(args, e_ctx)?;
                log::trace!("Calling {}() with {} argument(s)", builtin, args.len());
                methods::call_builtin(*builtin, &args, &e_ctx.limits)
            }
        },
        Expression::BinaryOp { left, op, right } => {
            let left_val = evaluate(left, e_ctx)?;
            let right_val = evaluate(right, e_ctx)?;
            operators::apply_binary(*op, left_val, right_val, &e_ctx.limits)
        }
        Expression::UnaryOp { op, operand } => {
            let val = evaluate(operand, e_ctx)?;
            match op {
                UnaryOperator::Minus => operators::negate(val),
            }
        }
        Expression::Subscript { value, index } => {
            let target = evaluate(value, e_ctx)?;
            match index.as_ref() {
                Expression::Slice { lower, upper, step } => {
                    let bound = |b: &Option<Box<Expression>>| {
                        b.as_deref().map(|e| evaluate(e, e_ctx)).transpose()
                    };
                    let (lower, upper, step) = (bound(lower)?, bound(upper)?, bound(step)?);
                    operators::slice(&target, lower.as_ref(), upper.as_ref(), step.as_ref())
                }
                other => {
                    let position = evaluate(other, e_ctx)?;
                    operators::index(&target, &position)
                }
            }
        }
        Expression::Slice { .. } => Err(EvalError::TypeError(
            "a slice can only be used as a subscript".to_string(),
        )),
    }
}

fn evaluate_args(args: &[Expression], e_ctx: &EvaluationContext<'_>) -> Result<Vec<Value>, EvalError> {
    let mut evaluated_args = Vec::with_capacity(args.len());
    for arg in args {
        evaluated_args.push(evaluate(arg, e_ctx)?);
    }
    Ok(evaluated_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Policy;
    use crate::validator::validate;

    fn run(source: &str, ctx: &Context) -> Result<Value, EvalError> {
        let policy = Policy::extended();
        let expr = validate(source, &policy).unwrap();
        evaluate(&expr, &EvaluationContext::new(ctx, policy.limits()))
    }

    fn naming_context() -> Context {
        Context::new()
            .with("sheet_group_name", "Floor Plans")
            .with("level_name", "Level 01")
            .with("level_counter", "1")
            .with("scope_box_name", "Sector12")
            .with("scope_box_counter", "2")
            .with("sheet_counter", "2")
            .with("view_family_name", "Floor Plan")
            .with("view_type_name", "Working Plan")
    }

    #[test]
    fn test_evaluate_default_sheet_number() {
        let result = run(
            r#"sheet_group_name[0:2]+"-"+level_name[0:3]+scope_box_name[-1]"#,
            &naming_context(),
        )
        .unwrap();
        assert_eq!(result, Value::from("Fl-Lev2"));
    }

    #[test]
    fn test_evaluate_split_join_round_trip() {
        let ctx = naming_context();
        assert_eq!(
            run("'_'.join(level_name.split(' '))", &ctx).unwrap(),
            Value::from("Level_01")
        );
        assert_eq!(run("level_name.split()[1]", &ctx).unwrap(), Value::from("01"));
        assert_eq!(run("level_name.split()[-1][::-1]", &ctx).unwrap(), Value::from("10"));
    }

    #[test]
    fn test_evaluate_counters_as_numbers() {
        let ctx = naming_context();
        assert_eq!(run("int(sheet_counter) * 10 + 1", &ctx).unwrap(), Value::Int(21));
        assert_eq!(run("str(int(level_counter) + 100)", &ctx).unwrap(), Value::from("101"));
        assert_eq!(run("sheet_counter.zfill(3)", &ctx).unwrap(), Value::from("002"));
        assert_eq!(run("'S%03d' % int(sheet_counter)", &ctx).unwrap(), Value::from("S002"));
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            run("sheet_counter", &Context::new()),
            Err(EvalError::UndefinedVariable("sheet_counter".into()))
        );
    }

    #[test]
    fn test_receiver_is_evaluated_before_arguments() {
        let ctx = Context::new().with("level_name", "L");
        assert_eq!(
            run("scope_box_name.replace(level_name, 'x')", &ctx),
            Err(EvalError::UndefinedVariable("scope_box_name".into()))
        );
    }

    #[test]
    fn test_bare_method_is_a_type_error() {
        assert!(matches!(
            run("level_name.upper", &naming_context()),
            Err(EvalError::TypeError(_))
        ));
    }

    #[test]
    fn test_unary_minus() {
        let ctx = Context::new();
        assert_eq!(run("-(2 - 5)", &ctx).unwrap(), Value::Int(3));
        assert_eq!(run("-1.5", &ctx).unwrap(), Value::Float(-1.5));
        assert!(matches!(
            run("-level_name", &naming_context()),
            Err(EvalError::TypeError(_))
        ));
    }

    #[test]
    fn test_output_limit_applies() {
        let policy = Policy::extended().with_max_output_len(10);
        let expr = validate("level_name * 2", &policy).unwrap();
        let ctx = naming_context();
        let result = evaluate(&expr, &EvaluationContext::new(&ctx, policy.limits()));
        assert!(matches!(result, Err(EvalError::LimitExceeded(_))));
    }
}
