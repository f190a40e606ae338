//! One analyzer run: load, classify, build, write.

use anyhow::{Context, Result};
use chrono::Local;
use hoh_core::Config;
use hoh_ingestion::{FileStartupSource, Pipeline};
use hoh_report::{json_export, CsvExporter, Dashboard, ModelSummary, OutputLayout};
use std::fmt::Write as _;

/// Run the analyzer and return the closing report.
pub fn run(config: &Config) -> Result<String> {
    let layout = OutputLayout::new(&config.output.data_dir);
    layout
        .prepare(config.output.clean_on_start)
        .with_context(|| format!("Failed to prepare {}", layout.root().display()))?;

    let source = FileStartupSource::new(config.startup_path());
    tracing::info!(input = %source.json_path().display(), "reading startup document");

    let output = Pipeline::new(config)
        .run(&source)
        .context("Failed to build player model")?;
    let model = &output.model;

    if config.output.write_parsed {
        json_export::write_parsed_bundles(&output.buckets, model, &layout.parsed_dir())
            .context("Failed to write parsed bundles")?;
    }

    if config.output.write_analysis {
        json_export::write_analysis(model, &layout.analysis_path(), Local::now())
            .context("Failed to write analysis JSON")?;
    }
    if config.output.write_csv {
        CsvExporter::new(layout.csv_dir())
            .export_all(model)
            .context("Failed to write CSV exports")?;
    }
    if config.output.write_dashboard {
        Dashboard::new(config)
            .write(model, &layout.dashboard_path())
            .context("Failed to write dashboard")?;
    }

    let mut report = String::new();
    let _ = writeln!(report, "{}", "=".repeat(60));
    let _ = writeln!(report, "ANALYSIS COMPLETE");
    let _ = writeln!(report, "{}", "=".repeat(60));
    report.push_str(&ModelSummary::from_model(model).render_text());
    let _ = writeln!(
        report,
        "Dropped: {} unrecognized messages, {} equipment items, {} relics",
        output.classification.unknown_records,
        output.build.equipment_dropped,
        output.build.relics_dropped,
    );
    if let Some(binary) = &output.binary {
        let _ = writeln!(report, "Binary payload: {} bytes", binary.len());
    }
    let _ = writeln!(report);
    let _ = writeln!(report, "Data directory: {}", layout.root().display());
    if config.output.write_analysis {
        let _ = writeln!(report, "Analysis JSON: {}", layout.analysis_path().display());
    }
    if config.output.write_dashboard {
        let _ = writeln!(report, "Dashboard: {}", layout.dashboard_path().display());
    }
    if config.output.write_csv {
        let _ = writeln!(report, "CSV exports: {}", layout.csv_dir().display());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const STARTUP: &str = r#"{"rootContext": {"messages": [
        {"@type": "type.googleapis.com/p.PlayerDTO", "id": 42, "displayName": "Me",
         "unlockedCities": [{"id": 1, "definitionId": "city.Capital",
                             "placedBuildingAmounts": {"building.Building_BronzeAge_Home_Small_1": 3}}]},
        {"@type": "type.googleapis.com/p.HeroPush",
         "unlocked": [{"heroDefinitionId": "hero.Boudica", "level": 12}],
         "deck": [{"definitionId": "deck.Main", "heroDefinitionId": ["hero.Boudica"]}]},
        {"@type": "type.googleapis.com/p.RelicUnitDataDTO", "relicDefinitionId": "relic.Crown",
         "supportingUnit": {"definitionId": "hero.Boudica"}}
    ]}}"#;

    fn make_config(root: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.output.data_dir = root.to_path_buf();
        config
    }

    #[test]
    fn test_run_writes_outputs() {
        let tmp = tempfile::tempdir().unwrap();
        let config = make_config(tmp.path());
        fs::create_dir_all(tmp.path().join("raw")).unwrap();
        fs::write(tmp.path().join("raw/startup.json"), STARTUP).unwrap();

        let report = run(&config).unwrap();

        assert!(report.contains("Player: Me"));
        assert!(report.contains("Heroes: 1"));
        assert!(report.contains("Relics: 1"));
        assert!(tmp.path().join("analysis/player_analysis.json").is_file());
        assert!(tmp.path().join("analysis/dashboard.html").is_file());
        assert!(tmp.path().join("csv_exports/heroes.csv").is_file());
        assert!(tmp.path().join("parsed/parsed_raw_bundle.json").is_file());
        assert!(tmp.path().join("raw/startup.json").is_file());
        assert!(!report.contains("Binary payload"));
    }

    #[test]
    fn test_run_reports_binary_payload() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("raw")).unwrap();
        fs::write(tmp.path().join("raw/startup.json"), STARTUP).unwrap();
        fs::write(tmp.path().join("raw/startup.bin"), [0u8; 16]).unwrap();

        let report = run(&make_config(tmp.path())).unwrap();
        assert!(report.contains("Binary payload: 16 bytes"));
    }

    #[test]
    fn test_run_respects_toggles() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = make_config(tmp.path());
        config.output.write_csv = false;
        config.output.write_dashboard = false;
        fs::create_dir_all(tmp.path().join("raw")).unwrap();
        fs::write(tmp.path().join("raw/startup.json"), STARTUP).unwrap();

        run(&config).unwrap();

        assert!(!tmp.path().join("analysis/dashboard.html").exists());
        assert!(!tmp.path().join("csv_exports/heroes.csv").exists());
        assert!(tmp.path().join("analysis/player_analysis.json").is_file());
    }

    #[test]
    fn test_run_without_startup_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = run(&make_config(tmp.path())).unwrap_err();
        assert!(format!("{err:#}").contains("startup document not found"));
    }

    #[test]
    fn test_run_without_hero_push_fails() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("raw")).unwrap();
        fs::write(
            tmp.path().join("raw/startup.json"),
            r#"{"rootContext": {"messages": [{"@type": "p.PlayerDTO"}]}}"#,
        )
        .unwrap();

        let err = run(&make_config(tmp.path())).unwrap_err();
        assert!(format!("{err:#}").contains("HeroPush"));
        assert!(!tmp.path().join("analysis/player_analysis.json").exists());
    }
}
