//! The allow-list a template is validated against.

use crate::ast::{ArithmeticOp, Builtin, LiteralKind, Method};
use crate::error::PolicyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default cap on the length of any string or list produced during evaluation.
pub const DEFAULT_MAX_OUTPUT_LEN: usize = 4096;

/// The variables a sheet naming template can reference.
pub const NAMING_VARIABLES: [&str; 8] = [
    "sheet_group_name",
    "level_name",
    "level_counter",
    "scope_box_name",
    "scope_box_counter",
    "sheet_counter",
    "view_family_name",
    "view_type_name",
];

/// How far attribute access may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeChaining {
    /// Any base that itself validates may carry a method, so
    /// `level_name.strip().upper()` and `"-".join(...)` are accepted.
    #[default]
    Nested,
    /// The base of an attribute must be a direct variable reference.
    VariableOnly,
}

/// Resource bounds applied while evaluating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Longest string (in bytes) or list (in items) an evaluation may produce.
    pub max_output_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_output_len: DEFAULT_MAX_OUTPUT_LEN,
        }
    }
}

impl Limits {
    pub(crate) fn check_len(&self, len: usize, what: &str) -> Result<(), crate::EvalError> {
        if len > self.max_output_len {
            return Err(crate::EvalError::LimitExceeded(format!(
                "{} of length {} exceeds the limit of {}",
                what, len, self.max_output_len
            )));
        }
        Ok(())
    }
}

/// A read-only allow-list configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    names: BTreeSet<String>,
    methods: BTreeSet<Method>,
    builtins: BTreeSet<Builtin>,
    operators: BTreeSet<ArithmeticOp>,
    literals: BTreeSet<LiteralKind>,
    attribute_chaining: AttributeChaining,
    limits: Limits,
}

impl Default for Policy {
    fn default() -> Self {
        Self::extended()
    }
}

impl Policy {
    /// All naming variables, every supported method, `str` and `int`, all
    /// arithmetic operators, all literal kinds and nested attribute access.
    pub fn extended() -> Self {
        Self {
            names: NAMING_VARIABLES.iter().map(|n| n.to_string()).collect(),
            methods: Method::ALL.into_iter().collect(),
            builtins: [Builtin::Str, Builtin::Int].into_iter().collect(),
            operators: ArithmeticOp::ALL.into_iter().collect(),
            literals: LiteralKind::ALL.into_iter().collect(),
            attribute_chaining: AttributeChaining::Nested,
            limits: Limits::default(),
        }
    }

    /// The stricter evaluator: no view variables, a short list of case and
    /// padding methods, no float literals and attribute access only directly
    /// on a variable.
    pub fn legacy() -> Self {
        Self {
            names: [
                "sheet_group_name",
                "level_name",
                "level_counter",
                "scope_box_name",
                "scope_box_counter",
                "sheet_counter",
            ]
            .iter()
            .map(|n| n.to_string())
            .collect(),
            methods: [
                Method::Upper,
                Method::Lower,
                Method::Strip,
                Method::Replace,
                Method::Capitalize,
                Method::Title,
                Method::ZFill,
            ]
            .into_iter()
            .collect(),
            builtins: [Builtin::Str].into_iter().collect(),
            operators: ArithmeticOp::ALL.into_iter().collect(),
            literals: [LiteralKind::Str, LiteralKind::Int].into_iter().collect(),
            attribute_chaining: AttributeChaining::VariableOnly,
            limits: Limits::default(),
        }
    }

    /// Looks up a shipped preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "extended" => Some(Self::extended()),
            "legacy" => Some(Self::legacy()),
            _ => None,
        }
    }

    /// Builds a policy from its serialized description.
    pub fn from_spec(spec: &PolicySpec) -> Result<Self, PolicyError> {
        let names: BTreeSet<String> = spec
            .names
            .iter()
            .map(|n| {
                if is_identifier(n) {
                    Ok(n.clone())
                } else {
                    Err(PolicyError::InvalidName(n.clone()))
                }
            })
            .collect::<Result<_, _>>()?;
        let methods: BTreeSet<Method> = spec
            .methods
            .iter()
            .map(|m| m.parse().map_err(|_| PolicyError::UnknownMethod(m.clone())))
            .collect::<Result<_, _>>()?;
        let builtins: BTreeSet<Builtin> = spec
            .builtins
            .iter()
            .map(|b| b.parse().map_err(|_| PolicyError::UnknownBuiltin(b.clone())))
            .collect::<Result<_, _>>()?;
        let operators: BTreeSet<ArithmeticOp> = spec
            .operators
            .iter()
            .map(|o| o.parse().map_err(|_| PolicyError::UnknownOperator(o.clone())))
            .collect::<Result<_, _>>()?;
        let literals: BTreeSet<LiteralKind> = spec
            .literals
            .iter()
            .map(|l| l.parse().map_err(|_| PolicyError::UnknownLiteralKind(l.clone())))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            names,
            methods,
            builtins,
            operators,
            literals,
            attribute_chaining: spec.attribute_chaining,
            limits: Limits {
                max_output_len: spec.max_output_len,
            },
        })
    }

    /// The serializable description of this policy.
    pub fn to_spec(&self) -> PolicySpec {
        PolicySpec {
            names: self.names.iter().cloned().collect(),
            methods: self.methods.iter().map(|m| m.name().to_string()).collect(),
            builtins: self.builtins.iter().map(|b| b.name().to_string()).collect(),
            operators: self.operators.iter().map(|o| o.symbol().to_string()).collect(),
            literals: self.literals.iter().map(|l| l.name().to_string()).collect(),
            attribute_chaining: self.attribute_chaining,
            max_output_len: self.limits.max_output_len,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.insert(method);
        self
    }

    pub fn with_builtin(mut self, builtin: Builtin) -> Self {
        self.builtins.insert(builtin);
        self
    }

    pub fn with_attribute_chaining(mut self, chaining: AttributeChaining) -> Self {
        self.attribute_chaining = chaining;
        self
    }

    pub fn with_max_output_len(mut self, max_output_len: usize) -> Self {
        self.limits.max_output_len = max_output_len;
        self
    }

    pub fn allows_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn allows_method(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }

    pub fn allows_builtin(&self, builtin: Builtin) -> bool {
        self.builtins.contains(&builtin)
    }

    pub fn allows_operator(&self, op: ArithmeticOp) -> bool {
        self.operators.contains(&op)
    }

    pub fn allows_literal(&self, kind: LiteralKind) -> bool {
        self.literals.contains(&kind)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn attribute_chaining(&self) -> AttributeChaining {
        self.attribute_chaining
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn default_max_output_len() -> usize {
    DEFAULT_MAX_OUTPUT_LEN
}

/// The serialized form of a [`Policy`]. Entries are kept as strings so that
/// a typo in a configuration file is reported by name when the policy is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySpec {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub builtins: Vec<String>,
    #[serde(default)]
    pub operators: Vec<String>,
    #[serde(default)]
    pub literals: Vec<String>,
    #[serde(default)]
    pub attribute_chaining: AttributeChaining,
    #[serde(default = "default_max_output_len")]
    pub max_output_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_is_default() {
        let policy = Policy::default();
        assert_eq!(policy, Policy::extended());
        for name in NAMING_VARIABLES {
            assert!(policy.allows_name(name));
        }
        assert!(policy.allows_method(Method::Split));
        assert!(policy.allows_builtin(Builtin::Int));
        assert!(!policy.allows_builtin(Builtin::Len));
        assert_eq!(policy.attribute_chaining(), AttributeChaining::Nested);
        assert_eq!(policy.limits().max_output_len, DEFAULT_MAX_OUTPUT_LEN);
    }

    #[test]
    fn test_legacy_is_narrower() {
        let legacy = Policy::legacy();
        assert!(!legacy.allows_name("view_type_name"));
        assert!(!legacy.allows_method(Method::Split));
        assert!(!legacy.allows_literal(LiteralKind::Float));
        assert_eq!(legacy.attribute_chaining(), AttributeChaining::VariableOnly);
    }

    #[test]
    fn test_presets_by_name() {
        assert_eq!(Policy::preset("legacy"), Some(Policy::legacy()));
        assert!(Policy::preset("permissive").is_none());
    }

    #[test]
    fn test_spec_round_trip() {
        let policy = Policy::legacy().with_name("project_number").with_max_output_len(64);
        let json = serde_json::to_string(&policy.to_spec()).unwrap();
        let spec: PolicySpec = serde_json::from_str(&json).unwrap();
        assert_eq!(Policy::from_spec(&spec).unwrap(), policy);
    }

    #[test]
    fn test_spec_defaults() {
        let spec: PolicySpec = serde_json::from_str(r#"{ "names": ["level_name"] }"#).unwrap();
        let policy = Policy::from_spec(&spec).unwrap();
        assert!(policy.allows_name("level_name"));
        assert!(!policy.allows_operator(ArithmeticOp::Add));
        assert_eq!(policy.attribute_chaining(), AttributeChaining::Nested);
        assert_eq!(policy.limits().max_output_len, DEFAULT_MAX_OUTPUT_LEN);
    }

    #[test]
    fn test_spec_rejects_unknown_entries() {
        let spec = |json: &str| serde_json::from_str::<PolicySpec>(json).unwrap();

        assert_eq!(
            Policy::from_spec(&spec(r#"{ "methods": ["upper", "format"] }"#)),
            Err(PolicyError::UnknownMethod("format".into()))
        );
        assert_eq!(
            Policy::from_spec(&spec(r#"{ "builtins": ["eval"] }"#)),
            Err(PolicyError::UnknownBuiltin("eval".into()))
        );
        assert_eq!(
            Policy::from_spec(&spec(r#"{ "operators": ["**"] }"#)),
            Err(PolicyError::UnknownOperator("**".into()))
        );
        assert_eq!(
            Policy::from_spec(&spec(r#"{ "literals": ["bool"] }"#)),
            Err(PolicyError::UnknownLiteralKind("bool".into()))
        );
        assert_eq!(
            Policy::from_spec(&spec(r#"{ "names": ["level name"] }"#)),
            Err(PolicyError::InvalidName("level name".into()))
        );
    }

    #[test]
    fn test_attribute_chaining_serialization() {
        let spec = serde_json::from_str::<PolicySpec>(r#"{ "attribute_chaining": "variable_only" }"#)
            .unwrap();
        assert_eq!(spec.attribute_chaining, AttributeChaining::VariableOnly);
    }
}
