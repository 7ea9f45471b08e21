//! The narrow interface the planner needs onto persisted sheet set data.

use crate::error::SheetSetError;
use crate::model::{SectorGroup, SheetGroup};
use crate::naming::{self, PlannedSheet, Preview, TemplateField};
use sheetset_safe_eval::Policy;

/// Read access to stored sector groups and sheet groups.
///
/// Implemented by [`crate::SheetSetConfig`] for JSON documents; a host
/// application can implement it over its own storage.
pub trait SheetSetStore {
    fn sector_group(&self, name: &str) -> Option<&SectorGroup>;

    fn sheet_group(&self, name: &str) -> Option<&SheetGroup>;

    /// Sheet group names in a stable order.
    fn sheet_group_names(&self) -> Vec<&str>;

    fn require_sheet_group(&self, name: &str) -> Result<&SheetGroup, SheetSetError> {
        self.sheet_group(name)
            .ok_or_else(|| SheetSetError::UnknownGroup {
                kind: "sheet group",
                name: name.to_string(),
            })
    }

    /// Plans the named sheet group against the sector group it refers to.
    fn plan_sheet_group(&self, name: &str, policy: &Policy) -> Result<Vec<PlannedSheet>, SheetSetError> {
        let sheet_group = self.require_sheet_group(name)?;
        let sector_group = self
            .sector_group(&sheet_group.sector_group_name)
            .ok_or_else(|| SheetSetError::UnknownGroup {
                kind: "sector group",
                name: sheet_group.sector_group_name.clone(),
            })?;
        Ok(naming::plan(sheet_group, sector_group, policy)?)
    }

    /// Previews one of the stored templates of the named sheet group.
    fn preview_sheet_group(
        &self,
        name: &str,
        field: TemplateField,
        policy: &Policy,
    ) -> Result<Preview, SheetSetError> {
        let sheet_group = self.require_sheet_group(name)?;
        let sector_group = self.sector_group(&sheet_group.sector_group_name);
        if sector_group.is_none() {
            log::warn!(
                "Sheet group '{}' refers to missing sector group '{}'",
                name,
                sheet_group.sector_group_name
            );
        }
        Ok(naming::preview(
            field,
            sheet_group.templates.get(field),
            sheet_group,
            sector_group,
            policy,
        ))
    }
}
