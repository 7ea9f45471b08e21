//! The persisted description of sector groups and sheet groups.

use crate::naming::TemplateField;
use serde::{Deserialize, Serialize};

pub const DEFAULT_VIEW_NAME_TEMPLATE: &str =
    r#"view_type_name.upper()+" - "+level_name.upper()+" - "+scope_box_name.upper()"#;
pub const DEFAULT_SHEET_NUMBER_TEMPLATE: &str =
    r#"sheet_group_name[0:2]+"-"+level_name[0:3]+scope_box_name[-1]"#;
pub const DEFAULT_SHEET_NAME_TEMPLATE: &str = DEFAULT_VIEW_NAME_TEMPLATE;

/// A set of levels crossed with a set of sector scope boxes. Every pair gets
/// one view and one sheet when a sheet group built on it is planned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorGroup {
    /// Filled from the map key when loaded from a configuration document.
    pub name: String,
    pub levels: Vec<String>,
    pub scope_boxes: Vec<String>,
    pub overall_scope_box: Option<String>,
    pub sector_view_scale: Option<u32>,
    pub overall_view_scale: Option<u32>,
    pub title_block: Option<String>,
}

impl SectorGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.levels.push(level.into());
        self
    }

    pub fn with_scope_box(mut self, scope_box: impl Into<String>) -> Self {
        self.scope_boxes.push(scope_box.into());
        self
    }

    /// Number of sheets a sheet group on this sector group produces.
    pub fn sheet_count(&self) -> usize {
        self.levels.len() * self.scope_boxes.len()
    }
}

/// The three naming templates of a sheet group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingTemplates {
    pub view_name: String,
    pub sheet_number: String,
    pub sheet_name: String,
}

impl Default for NamingTemplates {
    fn default() -> Self {
        Self {
            view_name: DEFAULT_VIEW_NAME_TEMPLATE.to_string(),
            sheet_number: DEFAULT_SHEET_NUMBER_TEMPLATE.to_string(),
            sheet_name: DEFAULT_SHEET_NAME_TEMPLATE.to_string(),
        }
    }
}

impl NamingTemplates {
    pub fn get(&self, field: TemplateField) -> &str {
        match field {
            TemplateField::ViewName => &self.view_name,
            TemplateField::SheetNumber => &self.sheet_number,
            TemplateField::SheetName => &self.sheet_name,
        }
    }

    pub fn set(&mut self, field: TemplateField, template: impl Into<String>) {
        let slot = match field {
            TemplateField::ViewName => &mut self.view_name,
            TemplateField::SheetNumber => &mut self.sheet_number,
            TemplateField::SheetName => &mut self.sheet_name,
        };
        *slot = template.into();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetGroup {
    /// Filled from the map key when loaded from a configuration document.
    pub name: String,
    pub sector_group_name: String,
    pub view_family_name: String,
    pub view_type_name: String,
    pub templates: NamingTemplates,
}

impl SheetGroup {
    pub fn new(name: impl Into<String>, sector_group_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sector_group_name: sector_group_name.into(),
            ..Default::default()
        }
    }

    pub fn with_view_type(
        mut self,
        view_family_name: impl Into<String>,
        view_type_name: impl Into<String>,
    ) -> Self {
        self.view_family_name = view_family_name.into();
        self.view_type_name = view_type_name.into();
        self
    }

    pub fn with_template(mut self, field: TemplateField, template: impl Into<String>) -> Self {
        self.templates.set(field, template);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_templates_fall_back_to_defaults() {
        let group: SheetGroup = serde_json::from_str(
            r#"{ "sector_group_name": "Tower", "templates": { "sheet_number": "sheet_counter" } }"#,
        )
        .unwrap();
        assert_eq!(group.templates.sheet_number, "sheet_counter");
        assert_eq!(group.templates.view_name, DEFAULT_VIEW_NAME_TEMPLATE);
        assert_eq!(group.templates.sheet_name, DEFAULT_SHEET_NAME_TEMPLATE);
    }

    #[test]
    fn test_sheet_count() {
        let group = SectorGroup::new("Tower")
            .with_level("Level 01")
            .with_level("Level 02")
            .with_scope_box("Sector A")
            .with_scope_box("Sector B")
            .with_scope_box("Sector C");
        assert_eq!(group.sheet_count(), 6);
        assert_eq!(SectorGroup::new("Empty").sheet_count(), 0);
    }

    #[test]
    fn test_template_accessors() {
        let group = SheetGroup::new("Plans", "Tower").with_template(TemplateField::SheetName, "level_name");
        assert_eq!(group.templates.get(TemplateField::SheetName), "level_name");
        assert_eq!(
            group.templates.get(TemplateField::ViewName),
            DEFAULT_VIEW_NAME_TEMPLATE
        );
    }
}
