//! # sheetset
//!
//! Plans sheet sets: every level of a sector group crossed with every sector
//! scope box yields one view and one sheet, named by restricted templates
//! evaluated with `sheetset-safe-eval`.
//!
//! - **model**: sector groups, sheet groups and their naming templates
//! - **naming**: the planner and the live template preview
//! - **config**: the JSON sheet set document
//! - **store**: the storage trait the planner reads through

// Re-export the expression crate
pub use sheetset_safe_eval as safe_eval;

pub mod config;
pub mod error;
pub mod model;
pub mod naming;
pub mod store;

pub use config::{PolicyConfig, SheetSetConfig};
pub use error::{NamingError, SheetSetError};
pub use model::{NamingTemplates, SectorGroup, SheetGroup};
pub use naming::{NamingContext, PlannedSheet, Preview, SheetCounters, TemplateField, plan, preview};
pub use safe_eval::{Context, Policy, Template, Value};
pub use store::SheetSetStore;
