mod common;

use common::{TOWER_CONFIG, TestResult};
use sheetset::{Policy, SectorGroup, SheetGroup, SheetSetConfig, SheetSetError, SheetSetStore};
use std::io::Write;

#[test]
fn test_load_from_file() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(TOWER_CONFIG.as_bytes())?;

    let config = SheetSetConfig::load_from_file(file.path())?;
    assert_eq!(config.policy()?, Policy::extended());
    assert_eq!(config.sheet_group_names(), vec!["Ceiling Plans", "Floor Plans"]);

    let tower = config.sector_group("Tower").ok_or("missing sector group")?;
    assert_eq!(tower.levels, vec!["Level 01", "Level 02"]);
    assert_eq!(tower.overall_scope_box.as_deref(), Some("Overall"));
    assert_eq!(tower.sector_view_scale, Some(50));
    assert_eq!(tower.title_block.as_deref(), Some("A1 Landscape"));
    Ok(())
}

#[test]
fn test_missing_file_is_an_io_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let result = SheetSetConfig::load_from_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(SheetSetError::Io(_))));
    Ok(())
}

#[test]
fn test_written_config_reloads() -> TestResult {
    let mut config = SheetSetConfig::default();
    config.add_sector_group(
        SectorGroup::new("Annex")
            .with_level("Ground")
            .with_scope_box("North"),
    );
    config.add_sheet_group(SheetGroup::new("Plans", "Annex").with_view_type("Floor Plan", "Floor Plan"));

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sheetset.json");
    std::fs::write(&path, config.to_json()?)?;

    let reloaded = SheetSetConfig::load_from_file(&path)?;
    assert_eq!(reloaded, config);

    let sheets = reloaded.plan_sheet_group("Plans", &reloaded.policy()?)?;
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].sheet_number, "Pl-Groh");
    Ok(())
}

#[test]
fn test_custom_policy_document() -> TestResult {
    let config: SheetSetConfig = r#"{
        "policy": {
            "names": ["level_name", "scope_box_name", "sheet_counter",
                      "sheet_group_name", "view_type_name"],
            "methods": ["upper"],
            "attribute_chaining": "variable_only"
        },
        "sector_groups": { "T": { "levels": ["L1"], "scope_boxes": ["S1"] } },
        "sheet_groups": { "G": { "sector_group_name": "T",
            "templates": { "view_name": "level_name.upper()", "sheet_number": "sheet_counter",
                           "sheet_name": "scope_box_name" } } }
    }"#
    .parse()?;

    let policy = config.policy()?;
    let sheets = config.plan_sheet_group("G", &policy)?;
    assert_eq!(sheets[0].view_name, "L1");
    assert_eq!(sheets[0].sheet_number, "1");
    assert_eq!(sheets[0].sheet_name, "S1");
    Ok(())
}
