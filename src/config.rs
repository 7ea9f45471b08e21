//! The JSON sheet set document: a policy plus named sector and sheet groups.

use crate::error::SheetSetError;
use crate::model::{SectorGroup, SheetGroup};
use crate::store::SheetSetStore;
use serde::{Deserialize, Serialize};
use sheetset_safe_eval::{Policy, PolicySpec};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// A preset name (`"extended"`, `"legacy"`) or a full policy description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicyConfig {
    Preset(String),
    Custom(PolicySpec),
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::Preset("extended".to_string())
    }
}

impl PolicyConfig {
    pub fn build(&self) -> Result<Policy, SheetSetError> {
        match self {
            PolicyConfig::Preset(name) => {
                Policy::preset(name).ok_or_else(|| SheetSetError::UnknownPreset(name.clone()))
            }
            PolicyConfig::Custom(spec) => Ok(Policy::from_spec(spec)?),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSetConfig {
    pub policy: PolicyConfig,
    pub sector_groups: BTreeMap<String, SectorGroup>,
    pub sheet_groups: BTreeMap<String, SheetGroup>,
}

impl SheetSetConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SheetSetError> {
        let path = path.as_ref();
        log::debug!("Loading sheet set configuration from {}", path.display());
        fs::read_to_string(path)?.parse()
    }

    pub fn to_json(&self) -> Result<String, SheetSetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn policy(&self) -> Result<Policy, SheetSetError> {
        self.policy.build()
    }

    pub fn add_sector_group(&mut self, group: SectorGroup) {
        self.sector_groups.insert(group.name.clone(), group);
    }

    pub fn add_sheet_group(&mut self, group: SheetGroup) {
        self.sheet_groups.insert(group.name.clone(), group);
    }

    /// Group names come from the map keys, not from the entries.
    fn assign_names(&mut self) {
        for (name, group) in &mut self.sector_groups {
            group.name.clone_from(name);
        }
        for (name, group) in &mut self.sheet_groups {
            group.name.clone_from(name);
        }
    }
}

impl FromStr for SheetSetConfig {
    type Err = SheetSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config: SheetSetConfig = serde_json::from_str(s)?;
        config.assign_names();
        log::debug!(
            "Loaded {} sector group(s) and {} sheet group(s)",
            config.sector_groups.len(),
            config.sheet_groups.len()
        );
        Ok(config)
    }
}

impl SheetSetStore for SheetSetConfig {
    fn sector_group(&self, name: &str) -> Option<&SectorGroup> {
        self.sector_groups.get(name)
    }

    fn sheet_group(&self, name: &str) -> Option<&SheetGroup> {
        self.sheet_groups.get(name)
    }

    fn sheet_group_names(&self) -> Vec<&str> {
        self.sheet_groups.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetset_safe_eval::AttributeChaining;

    #[test]
    fn test_policy_defaults_to_extended() {
        let config: SheetSetConfig = "{}".parse().unwrap();
        assert_eq!(config.policy().unwrap(), Policy::extended());
        assert!(config.sheet_group_names().is_empty());
    }

    #[test]
    fn test_policy_preset_and_custom() {
        let legacy: SheetSetConfig = r#"{ "policy": "legacy" }"#.parse().unwrap();
        assert_eq!(legacy.policy().unwrap(), Policy::legacy());

        let custom: SheetSetConfig = r#"{ "policy": { "names": ["level_name"], "methods": ["upper"] } }"#
            .parse()
            .unwrap();
        let policy = custom.policy().unwrap();
        assert!(policy.allows_name("level_name"));
        assert!(!policy.allows_name("scope_box_name"));
        assert_eq!(policy.attribute_chaining(), AttributeChaining::Nested);

        let unknown: SheetSetConfig = r#"{ "policy": "permissive" }"#.parse().unwrap();
        assert!(matches!(unknown.policy(), Err(SheetSetError::UnknownPreset(_))));

        let typo: SheetSetConfig = r#"{ "policy": { "methods": ["uper"] } }"#.parse().unwrap();
        assert!(matches!(typo.policy(), Err(SheetSetError::Policy(_))));
    }

    #[test]
    fn test_names_come_from_keys() {
        let config: SheetSetConfig = r#"{
            "sector_groups": { "Tower": { "levels": ["Level 01"], "scope_boxes": ["Sector A"] } },
            "sheet_groups": { "Floor Plans": { "sector_group_name": "Tower" } }
        }"#
        .parse()
        .unwrap();
        assert_eq!(config.sector_group("Tower").unwrap().name, "Tower");
        assert_eq!(config.sheet_group("Floor Plans").unwrap().name, "Floor Plans");
        assert_eq!(config.sheet_group_names(), vec!["Floor Plans"]);
    }

    #[test]
    fn test_unknown_groups() {
        let config: SheetSetConfig = r#"{
            "sheet_groups": { "Floor Plans": { "sector_group_name": "Missing" } }
        }"#
        .parse()
        .unwrap();
        let policy = config.policy().unwrap();
        assert!(matches!(
            config.plan_sheet_group("Sections", &policy),
            Err(SheetSetError::UnknownGroup { kind: "sheet group", .. })
        ));
        assert!(matches!(
            config.plan_sheet_group("Floor Plans", &policy),
            Err(SheetSetError::UnknownGroup { kind: "sector group", .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            "{ not json".parse::<SheetSetConfig>(),
            Err(SheetSetError::Json(_))
        ));
    }
}
