//! Pseudonymization scenarios through the `pseudonymize` command handler.

use oea::salted_digest;
use oea_testdata::commands::pseudonymize::run_pseudonymize;
use std::fs;
use tempfile::TempDir;

const SCHEMAS: &str = r#"
Person:
  - [Id, string, h]
  - [Name, string, no-op]
Contact:
  - [Phone, string, m]
Enrollment:
  - [StudentId, string, hnl]
  - [Section Code, string, hash]
"#;

fn setup() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("schemas.yaml"), SCHEMAS).unwrap();
    temp
}

#[test]
fn test_hash_and_no_op_scenario() {
    let temp = setup();
    let input = temp.path().join("person.csv");
    fs::write(&input, "Id,Name\nA1,Sam\n").unwrap();

    let out_dir = temp.path().join("out");
    let output = run_pseudonymize(
        &input,
        &temp.path().join("schemas.yaml"),
        "Person",
        &out_dir,
        "x",
    )
    .unwrap();
    assert_eq!(output.rows, 1);

    let digest = salted_digest("A1", "x");
    assert_eq!(
        fs::read_to_string(&output.pseudonymized).unwrap(),
        format!("Id_pseudonym,Name\n{digest},Sam\n")
    );
    let lookup = output.lookup.expect("hash column produces a lookup");
    assert_eq!(
        fs::read_to_string(lookup).unwrap(),
        format!("Id_pseudonym,Id\n{digest},A1\n")
    );
}

#[test]
fn test_mask_scenario_has_no_lookup() {
    let temp = setup();
    let input = temp.path().join("contact.csv");
    fs::write(&input, "Phone\n555-1234\n").unwrap();

    let output = run_pseudonymize(
        &input,
        &temp.path().join("schemas.yaml"),
        "Contact",
        &temp.path().join("out"),
        "x",
    )
    .unwrap();
    assert_eq!(
        fs::read_to_string(&output.pseudonymized).unwrap(),
        "Phone\n*\n"
    );
    assert!(output.lookup.is_none());
    assert!(!temp.path().join("out/Contact_lookup.csv").exists());
}

#[test]
fn test_hash_no_lookup_and_sanitized_names() {
    let temp = setup();
    let input = temp.path().join("enrollment.csv");
    fs::write(&input, "StudentId,Section Code,Note\ns1,MATH-1,ok\n").unwrap();

    let output = run_pseudonymize(
        &input,
        &temp.path().join("schemas.yaml"),
        "Enrollment",
        &temp.path().join("out"),
        "salt",
    )
    .unwrap();

    let pseudo = fs::read_to_string(&output.pseudonymized).unwrap();
    let student_digest = salted_digest("s1", "salt");
    assert!(pseudo.starts_with("StudentId_pseudonym,Section_Code_pseudonym,Note\n"));
    assert!(pseudo.contains(&student_digest));

    let lookup = fs::read_to_string(output.lookup.unwrap()).unwrap();
    assert!(lookup.starts_with("Section_Code_pseudonym,Section_Code\n"));
    assert!(lookup.contains("MATH-1"));
    assert!(!lookup.contains(&student_digest));
}

#[test]
fn test_unknown_entity_and_missing_column() {
    let temp = setup();
    let input = temp.path().join("person.csv");
    fs::write(&input, "Name\nSam\n").unwrap();
    let schemas = temp.path().join("schemas.yaml");
    let out = temp.path().join("out");

    let err = run_pseudonymize(&input, &schemas, "Nobody", &out, "x").unwrap_err();
    assert!(format!("{err:#}").contains("Nobody"));

    let err = run_pseudonymize(&input, &schemas, "Person", &out, "x").unwrap_err();
    assert!(format!("{err:#}").contains("'Id'"));
}

#[test]
fn test_invalid_policy_rejected() {
    let temp = TempDir::new().unwrap();
    let schemas = temp.path().join("bad.yaml");
    fs::write(&schemas, "Person:\n  - [Id, string, scramble]\n").unwrap();
    let input = temp.path().join("person.csv");
    fs::write(&input, "Id\nA1\n").unwrap();

    let err = run_pseudonymize(&input, &schemas, "Person", &temp.path().join("o"), "x")
        .unwrap_err();
    assert!(format!("{err:#}").contains("scramble"));
}
