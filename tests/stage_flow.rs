//! Generate, land, process and inspect against a temporary storage root.

use oea::{Oea, TableFormat, WriteMode, STAGE_TABLE_FORMAT};
use oea_core::{SchemaRegistry, Value};
use oea_testdata::commands::process::{run_land, run_process, ProcessOptions};
use oea_testdata::commands::{generate, stage};
use oea_testdata::Settings;
use std::fs;
use tempfile::TempDir;
use testdata_generator::Domain;
use testdata_populate::PopulateArgs;

const SCHEMAS: &str = r#"
StudentDemographics:
  - [SIS ID, string, hash]
  - [LowIncome, integer, no-op]
  - [City/Region, string, mask]
"#;

fn settings(temp: &TempDir) -> Settings {
    Settings {
        storage_root: temp.path().join("lake"),
        storage_account: "stoeatest".to_string(),
        salt: "pepper".to_string(),
        log_level: "info".to_string(),
    }
}

fn populate_args(temp: &TempDir) -> PopulateArgs {
    PopulateArgs {
        output_dir: temp.path().join("generated"),
        seed: 5,
        count: Some(12),
        schools: None,
        users_file: None,
        reference_date: None,
        clean: true,
    }
}

#[test]
fn test_generate_land_process_describe() {
    let temp = TempDir::new().unwrap();
    let settings = settings(&temp);
    let args = populate_args(&temp);

    let metrics = generate::run_generate(Domain::StudentDemographics, &args).unwrap();
    assert_eq!(metrics.records_written, 12);

    let destination = run_land(&settings, "sis", &args.output_dir).unwrap();
    assert!(destination.ends_with("stage1np@stoeatest.dfs.core.windows.net/sis"));
    assert!(settings
        .storage_root
        .join("stage1np/sis/StudentDemographics/demographics.csv")
        .exists());

    let schema_file = temp.path().join("schemas.yaml");
    fs::write(&schema_file, SCHEMAS).unwrap();
    let processed = run_process(
        &settings,
        &ProcessOptions {
            source_folder: "sis",
            schema_file: &schema_file,
            entities: &[],
            format: TableFormat::CSV,
            pseudonymize: true,
            write_mode: WriteMode::Overwrite,
            create_db: true,
        },
    )
    .unwrap();
    assert_eq!(processed, 1);

    let oea = Oea::local(&settings.storage_root, &settings.storage_account, "pepper");
    let registry = SchemaRegistry::from_yaml(SCHEMAS).unwrap();
    let schema = registry.get("StudentDemographics").unwrap();
    let pseudo = oea
        .load("sis", "StudentDemographics", None, STAGE_TABLE_FORMAT, schema)
        .unwrap();
    assert_eq!(pseudo.row_count(), 12);
    assert_eq!(
        pseudo.columns()[0..2],
        ["SIS_ID_pseudonym".to_string(), "FederalRaceCategory".to_string()]
    );
    assert_eq!(
        pseudo.get(0, "SIS_ID_pseudonym"),
        Some(&Value::String(oea::salted_digest("st1", "pepper")))
    );
    assert!(pseudo
        .column_values("City_Region")
        .unwrap()
        .iter()
        .all(|v| **v == Value::from("*")));

    let described = stage::run_describe(&settings, "stage2np").unwrap();
    assert!(described.contains("sis: [StudentDemographics_lookup]"));

    let parsed = stage::run_parse(&settings, "stage2p/sis").unwrap();
    assert!(parsed.contains("db_name: s2_sis"));
    assert_eq!(oea.list_tables("s2_sis").unwrap().len(), 2);

    let sample = stage::run_sample(
        &settings,
        "stage1np/sis/StudentDemographics/demographics.csv",
        true,
    )
    .unwrap();
    assert!(sample.starts_with("SIS ID,FederalRaceCategory"));
    assert_eq!(sample.lines().count(), 13);

    let yaml = stage::run_schema_starter(
        &settings,
        "Demo",
        "stage1np/sis/StudentDemographics/demographics.csv",
    )
    .unwrap();
    assert!(yaml.contains("Demo:"));

    assert!(stage::run_rm(&settings, "stage2p/sis").is_ok());
    assert_eq!(stage::run_ls(&settings, "stage2p").unwrap(), "");
    assert_eq!(
        stage::run_drop_db(&settings, "s2_sis").unwrap(),
        "Database dropped: s2_sis"
    );
}

const ROSTER_SCHEMAS: &str = r#"
Person:
  - [Id, string, hash]
  - [FirstName, string, mask]
  - [MiddleName, string, mask]
  - [LastName, string, mask]
  - [GenerationCode, string, no-op]
  - [Prefix, string, no-op]
  - [EnabledUser, boolean, no-op]
  - [ExternalId, string, hash-no-lookup]
  - [CreateDate, string, no-op]
  - [LastModifiedDate, string, no-op]
  - [IsActive, boolean, no-op]
  - [SourceSystemId, string, no-op]
"#;

#[test]
fn test_process_headerless_roster() {
    let temp = TempDir::new().unwrap();
    let settings = settings(&temp);
    let mut args = populate_args(&temp);
    args.schools = Some(1);
    generate::run_generate(Domain::MsInsights, &args).unwrap();
    run_land(&settings, "ms_insights", &args.output_dir).unwrap();

    let roster = "ms_insights/M365/roster/2021-07-12";
    let landed = collect_files(
        &settings
            .storage_root
            .join(format!("stage1np/{roster}/Person")),
    );
    assert_eq!(landed.len(), 1);
    let text = fs::read_to_string(
        settings
            .storage_root
            .join(format!("stage1np/{roster}/Person"))
            .join(&landed[0]),
    )
    .unwrap();
    assert!(text.starts_with("edp_"));

    let schema_file = temp.path().join("roster.yaml");
    fs::write(&schema_file, ROSTER_SCHEMAS).unwrap();
    let entities = vec!["Person".to_string()];
    let processed = run_process(
        &settings,
        &ProcessOptions {
            source_folder: roster,
            schema_file: &schema_file,
            entities: &entities,
            format: TableFormat::Csv { header: false },
            pseudonymize: true,
            write_mode: WriteMode::Overwrite,
            create_db: false,
        },
    )
    .unwrap();
    assert_eq!(processed, 1);

    let oea = Oea::local(&settings.storage_root, &settings.storage_account, "pepper");
    let registry = SchemaRegistry::from_yaml(ROSTER_SCHEMAS).unwrap();
    let schema = registry.get("Person").unwrap();
    let pseudo = oea
        .load(roster, "Person", None, STAGE_TABLE_FORMAT, schema)
        .unwrap();
    assert_eq!(pseudo.row_count(), text.lines().count());
    assert_eq!(pseudo.columns()[0], "Id_pseudonym");
    let first_id = text.split(',').next().unwrap();
    assert_eq!(
        pseudo.get(0, "Id_pseudonym"),
        Some(&Value::String(oea::salted_digest(first_id, "pepper")))
    );
    assert_eq!(pseudo.get(0, "FirstName"), Some(&Value::from("*")));
}

#[test]
fn test_generate_is_reproducible() {
    for domain in [
        Domain::Intune,
        Domain::StudentDemographics,
        Domain::EdFi,
        Domain::MsInsights,
    ] {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let mut args = populate_args(&first);
        args.count = Some(3);
        args.schools = Some(1);
        generate::run_generate(domain, &args).unwrap();
        args.output_dir = second.path().join("generated");
        generate::run_generate(domain, &args).unwrap();

        let files = collect_files(&first.path().join("generated"));
        assert!(!files.is_empty(), "{domain}");
        for relative in files {
            assert_eq!(
                fs::read(first.path().join("generated").join(&relative)).unwrap(),
                fs::read(second.path().join("generated").join(&relative)).unwrap(),
                "{domain}: {relative}"
            );
        }
    }
}

fn collect_files(root: &std::path::Path) -> Vec<String> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(
                    path.strip_prefix(root)
                        .unwrap()
                        .to_string_lossy()
                        .to_string(),
                );
            }
        }
    }
    files.sort();
    files
}
