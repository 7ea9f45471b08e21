//! Plans the views and sheets of a sheet group by evaluating its naming
//! templates for every level and sector scope box.

use crate::error::NamingError;
use crate::model::{NamingTemplates, SectorGroup, SheetGroup};
use serde::{Deserialize, Serialize};
use sheetset_safe_eval::{Context, Policy, SafeEvalError, Template};
use std::collections::HashMap;
use std::fmt;

pub const PLACEHOLDER_LEVEL_NAME: &str = "LEVEL NAME";
pub const PLACEHOLDER_SCOPE_BOX_NAME: &str = "SCOPE BOX NAME";

/// Which of the three naming templates of a sheet group is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateField {
    ViewName,
    SheetNumber,
    SheetName,
}

impl TemplateField {
    pub const ALL: [TemplateField; 3] = [
        TemplateField::ViewName,
        TemplateField::SheetNumber,
        TemplateField::SheetName,
    ];
}

impl fmt::Display for TemplateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TemplateField::ViewName => "view name",
            TemplateField::SheetNumber => "sheet number",
            TemplateField::SheetName => "sheet name",
        })
    }
}

/// One-based positions of a sheet within its sheet group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SheetCounters {
    pub level: usize,
    pub scope_box: usize,
    pub sheet: usize,
}

impl SheetCounters {
    /// Counters for level `level_index` and scope box `scope_box_index`
    /// (both zero-based) in a group with `scope_box_count` scope boxes.
    pub fn at(level_index: usize, scope_box_index: usize, scope_box_count: usize) -> Self {
        Self {
            level: level_index + 1,
            scope_box: scope_box_index + 1,
            sheet: scope_box_count * level_index + scope_box_index + 1,
        }
    }
}

/// The variables one sheet's templates are evaluated with.
#[derive(Debug, Clone, Copy)]
pub struct NamingContext<'a> {
    pub sheet_group: &'a SheetGroup,
    pub level_name: &'a str,
    pub scope_box_name: &'a str,
    pub counters: SheetCounters,
}

impl NamingContext<'_> {
    /// Counters are passed as strings so string methods such as `zfill` apply.
    pub fn to_context(&self) -> Context {
        Context::new()
            .with("sheet_group_name", self.sheet_group.name.as_str())
            .with("level_name", self.level_name)
            .with("level_counter", self.counters.level.to_string())
            .with("scope_box_name", self.scope_box_name)
            .with("scope_box_counter", self.counters.scope_box.to_string())
            .with("sheet_counter", self.counters.sheet.to_string())
            .with("view_family_name", self.sheet_group.view_family_name.as_str())
            .with("view_type_name", self.sheet_group.view_type_name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedSheet {
    pub level_name: String,
    pub scope_box_name: String,
    pub counters: SheetCounters,
    pub view_name: String,
    pub sheet_number: String,
    pub sheet_name: String,
}

/// The three templates of a sheet group, validated once up front.
#[derive(Debug, Clone)]
pub struct CompiledTemplates {
    view_name: Template,
    sheet_number: Template,
    sheet_name: Template,
}

impl CompiledTemplates {
    pub fn compile(templates: &NamingTemplates, policy: &Policy) -> Result<Self, NamingError> {
        let compile = |field: TemplateField| {
            Template::compile(templates.get(field), policy)
                .map_err(|source| NamingError::InvalidTemplate { field, source })
        };
        Ok(Self {
            view_name: compile(TemplateField::ViewName)?,
            sheet_number: compile(TemplateField::SheetNumber)?,
            sheet_name: compile(TemplateField::SheetName)?,
        })
    }

    pub fn get(&self, field: TemplateField) -> &Template {
        match field {
            TemplateField::ViewName => &self.view_name,
            TemplateField::SheetNumber => &self.sheet_number,
            TemplateField::SheetName => &self.sheet_name,
        }
    }

    fn render(&self, field: TemplateField, naming: &NamingContext<'_>, context: &Context) -> Result<String, NamingError> {
        let sheet_counter = naming.counters.sheet;
        let name = self
            .get(field)
            .render(context)
            .map_err(|source| NamingError::Evaluation {
                field,
                sheet_counter,
                source,
            })?;
        if name.trim().is_empty() {
            return Err(NamingError::BlankName {
                field,
                sheet_counter,
            });
        }
        Ok(name)
    }
}

/// Computes the name of every view and sheet a sheet group produces.
///
/// Levels form the outer loop and scope boxes the inner one, so sheets of
/// the same level are numbered consecutively. View names and sheet numbers
/// must be unique within the plan.
pub fn plan(
    sheet_group: &SheetGroup,
    sector_group: &SectorGroup,
    policy: &Policy,
) -> Result<Vec<PlannedSheet>, NamingError> {
    let templates = CompiledTemplates::compile(&sheet_group.templates, policy)?;
    let total = sector_group.sheet_count();
    log::debug!(
        "Planning sheet group '{}' on sector group '{}' ({} sheets)",
        sheet_group.name,
        sector_group.name,
        total
    );

    let mut sheets = Vec::with_capacity(total);
    let mut view_names: HashMap<String, usize> = HashMap::new();
    let mut sheet_numbers: HashMap<String, usize> = HashMap::new();

    for (i, level_name) in sector_group.levels.iter().enumerate() {
        for (j, scope_box_name) in sector_group.scope_boxes.iter().enumerate() {
            let naming = NamingContext {
                sheet_group,
                level_name,
                scope_box_name,
                counters: SheetCounters::at(i, j, sector_group.scope_boxes.len()),
            };
            let context = naming.to_context();
            let sheet = PlannedSheet {
                level_name: level_name.clone(),
                scope_box_name: scope_box_name.clone(),
                counters: naming.counters,
                view_name: templates.render(TemplateField::ViewName, &naming, &context)?,
                sheet_number: templates.render(TemplateField::SheetNumber, &naming, &context)?,
                sheet_name: templates.render(TemplateField::SheetName, &naming, &context)?,
            };

            claim_unique(&mut view_names, TemplateField::ViewName, &sheet.view_name, naming.counters.sheet)?;
            log::info!("Planned View: {} [{}/{}]", sheet.view_name, naming.counters.sheet, total);
            claim_unique(
                &mut sheet_numbers,
                TemplateField::SheetNumber,
                &sheet.sheet_number,
                naming.counters.sheet,
            )?;
            log::info!(
                "Planned Sheet: {} - {} [{}/{}]",
                sheet.sheet_number,
                sheet.sheet_name,
                naming.counters.sheet,
                total
            );
            sheets.push(sheet);
        }
    }
    Ok(sheets)
}

fn claim_unique(
    seen: &mut HashMap<String, usize>,
    field: TemplateField,
    name: &str,
    sheet_counter: usize,
) -> Result<(), NamingError> {
    if let Some(&first) = seen.get(name) {
        return Err(NamingError::Duplicate {
            field,
            name: name.to_string(),
            first,
            second: sheet_counter,
        });
    }
    seen.insert(name.to_string(), sheet_counter);
    Ok(())
}

/// The outcome of evaluating a template while it is being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub field: TemplateField,
    pub result: Result<String, SafeEvalError>,
}

impl Preview {
    /// The rendered text, or the error message in its place.
    pub fn display_text(&self) -> String {
        match &self.result {
            Ok(text) => text.clone(),
            Err(e) => e.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Evaluates `template` for the first sheet of a sheet group. Placeholder
/// names stand in when the sector group is missing or has no levels or
/// scope boxes.
pub fn preview(
    field: TemplateField,
    template: &str,
    sheet_group: &SheetGroup,
    sector_group: Option<&SectorGroup>,
    policy: &Policy,
) -> Preview {
    let level_name = sector_group
        .and_then(|g| g.levels.first())
        .map_or(PLACEHOLDER_LEVEL_NAME, String::as_str);
    let scope_box_name = sector_group
        .and_then(|g| g.scope_boxes.first())
        .map_or(PLACEHOLDER_SCOPE_BOX_NAME, String::as_str);
    let naming = NamingContext {
        sheet_group,
        level_name,
        scope_box_name,
        counters: SheetCounters::at(0, 0, 1),
    };

    let result = Template::compile(template, policy)
        .map_err(SafeEvalError::from)
        .and_then(|t| t.render(&naming.to_context()).map_err(SafeEvalError::from));
    if let Err(e) = &result {
        log::debug!("Preview of the {} template failed: {}", field, e);
    }
    Preview { field, result }
}
