use sheetset::SheetSetConfig;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Two levels by three sectors, one sheet group on default templates and one
/// with custom numbering.
pub const TOWER_CONFIG: &str = r#"{
    "policy": "extended",
    "sector_groups": {
        "Tower": {
            "levels": ["Level 01", "Level 02"],
            "scope_boxes": ["Sector A", "Sector B", "Sector C"],
            "overall_scope_box": "Overall",
            "sector_view_scale": 50,
            "overall_view_scale": 100,
            "title_block": "A1 Landscape"
        }
    },
    "sheet_groups": {
        "Floor Plans": {
            "sector_group_name": "Tower",
            "view_family_name": "Floor Plan",
            "view_type_name": "Working Plan"
        },
        "Ceiling Plans": {
            "sector_group_name": "Tower",
            "view_family_name": "Ceiling Plan",
            "view_type_name": "RCP",
            "templates": {
                "sheet_number": "'C-' + level_counter + scope_box_counter.zfill(2)",
                "sheet_name": "view_type_name + ' ' + level_name.split()[-1] + ' ' + scope_box_name.split()[-1]"
            }
        }
    }
}"#;

#[allow(dead_code)]
pub fn tower_config() -> Result<SheetSetConfig, Box<dyn std::error::Error>> {
    Ok(TOWER_CONFIG.parse()?)
}
