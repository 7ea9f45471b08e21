use crate::ast::Expression;
use crate::engine::{EvaluationContext, evaluate};
use crate::error::{EvalError, SafeEvalError, ValidationError};
use crate::policy::{Limits, Policy};
use crate::validator::validate;
use crate::value::{Context, Value};

/// A template source paired with its validated expression.
///
/// Validate once with [`Template::compile`], then evaluate against as many
/// contexts as needed. The policy's output limits travel with the template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    expression: Expression,
    limits: Limits,
}

impl Template {
    pub fn compile(source: &str, policy: &Policy) -> Result<Self, ValidationError> {
        let expression = validate(source, policy)?;
        Ok(Self {
            source: source.to_string(),
            expression,
            limits: policy.limits(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn evaluate(&self, context: &Context) -> Result<Value, EvalError> {
        evaluate(&self.expression, &EvaluationContext::new(context, self.limits))
    }

    /// Evaluates the template and returns the text of a scalar result.
    pub fn render(&self, context: &Context) -> Result<String, EvalError> {
        match self.evaluate(context)? {
            Value::List(_) => Err(EvalError::TypeError(format!(
                "template '{}' produced a list, not a single value",
                self.source
            ))),
            value => Ok(value.to_string()),
        }
    }
}

/// Validates `source` against `policy` and evaluates it in one step.
pub fn safe_eval(source: &str, context: &Context, policy: &Policy) -> Result<Value, SafeEvalError> {
    let template = Template::compile(source, policy)?;
    Ok(template.evaluate(context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_compile_once_evaluate_many() {
        let template = Template::compile("level_name.upper() + '-' + sheet_counter", &Policy::default()).unwrap();
        let first = Context::new().with("level_name", "l1").with("sheet_counter", "1");
        let second = Context::new().with("level_name", "l2").with("sheet_counter", "2");
        assert_eq!(template.render(&first).unwrap(), "L1-1");
        assert_eq!(template.render(&second).unwrap(), "L2-2");
        assert_eq!(template.source(), "level_name.upper() + '-' + sheet_counter");
    }

    #[test]
    fn test_render_rejects_lists() {
        let template = Template::compile("level_name.split()", &Policy::default()).unwrap();
        let ctx = Context::new().with("level_name", "Level 01");
        assert!(matches!(template.render(&ctx), Err(EvalError::TypeError(_))));
        assert_eq!(
            template.evaluate(&ctx).unwrap(),
            Value::List(vec![Value::from("Level"), Value::from("01")])
        );
    }

    #[test]
    fn test_render_numbers() {
        let template = Template::compile("int(sheet_counter) / 4", &Policy::default()).unwrap();
        let ctx = Context::new().with("sheet_counter", "2");
        assert_eq!(template.render(&ctx).unwrap(), "0.5");
    }

    #[test]
    fn test_safe_eval_kinds() {
        let ctx = Context::new().with("level_name", "Level 01");
        let policy = Policy::default();
        assert_eq!(
            safe_eval("level_name[0:3]", &ctx, &policy).unwrap(),
            Value::from("Lev")
        );
        assert_eq!(
            safe_eval("import os", &ctx, &policy).unwrap_err().kind(),
            ErrorKind::UnsupportedConstruct
        );
        assert_eq!(
            safe_eval("level_name[20]", &ctx, &policy).unwrap_err().kind(),
            ErrorKind::IndexOutOfRange
        );
    }

    #[test]
    fn test_template_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Template>();
        assert_send_sync::<Context>();
        assert_send_sync::<Policy>();
    }
}
