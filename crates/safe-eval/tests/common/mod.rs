use sheetset_safe_eval::Context;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A context carrying every naming variable, as the planner builds it for the
/// second sheet of a two-sector group.
pub fn naming_context() -> Context {
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
