//! Export and configuration files on disk.

use logos_kappa::axioms::{Axioms, ConfigError};
use logos_kappa::context::Context;
use logos_kappa::eval::{CycleOptions, Interpreter};
use logos_kappa::export::{CycleExport, ExportError, export_cycle, write_json};
use logos_kappa::parser::parse_program;

#[test]
fn exported_cycle_round_trips_as_json() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut interp = Interpreter::new(Context::new("export", Axioms::default()).unwrap());
    let outcome = interp
        .run_source(
            r#"(Λ "a" "b") (Φ "status") (Σ "x")"#,
            &CycleOptions {
                operator_id: Some("op-7".into()),
                fair_care: true,
            },
        )
        .unwrap();

    let path = dir.path().join("cycle.json");
    export_cycle(&outcome.cycle, interp.context_mut(), &path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let cycle = &json["cycle"];
    assert_eq!(cycle["expressions_evaluated"], 3);
    assert_eq!(cycle["successful_evaluations"], 2);
    assert_eq!(cycle["operator_id"], "op-7");
    assert_eq!(cycle["fair_care_enabled"], true);
    assert_eq!(cycle["dialogue_count"], 1);
    assert_eq!(cycle["results"][0], "a→b(Λ)");
    assert!(cycle["results"][2].as_str().unwrap().starts_with("ERROR: "));

    let metadata = &json["metadata"];
    assert_eq!(metadata["standard"], "FAIR+CARE");
    assert_eq!(metadata["operator"], "op-7");
    assert_eq!(metadata["context_name"], "export");
}

#[test]
fn parsed_file_runs_and_exports_with_metadata() {
    let dir = tempfile::TempDir::new().unwrap();
    let program_path = dir.path().join("cosmos.lgk");
    std::fs::write(
        &program_path,
        ";; a small cosmos\n(Α \"sun\" :kind \"star\")\n(Λ \"sun\" \"earth\")\n",
    )
    .unwrap();

    let axioms = Axioms::default();
    let source = std::fs::read_to_string(&program_path).unwrap();
    let program = parse_program(&source, "cosmos.lgk", &axioms).unwrap();
    let mut interp = Interpreter::new(Context::new("cosmos", axioms).unwrap());
    let outcome = interp.eval_program(
        &program.expressions,
        &program.intentions,
        &CycleOptions::default(),
    );

    let export_path = dir.path().join("cosmos.json");
    export_cycle(&outcome.cycle, interp.context_mut(), &export_path).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export_path).unwrap()).unwrap();
    assert_eq!(json["metadata"]["standard"], "FAIR+CARE");
    assert_eq!(json["metadata"]["entity_count"], 8);
    assert_eq!(json["metadata"]["relation_count"], 1);
    assert_eq!(json["cycle"]["successful_evaluations"], 2);
}

#[test]
fn cycle_export_includes_provenance() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut interp = Interpreter::new(Context::new("prov", Axioms::default()).unwrap());
    let outcome = interp
        .run_source(r#"(Α "seed")"#, &CycleOptions::default())
        .unwrap();

    let export = CycleExport::new(&outcome.cycle, interp.context_mut());
    let path = dir.path().join("full.json");
    write_json(&export, &path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["metadata"]["protocol"], "Λ-Protocol 6.0");
    assert_eq!(json["metadata"]["entity_count"], 7);
}

#[test]
fn export_to_missing_directory_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut interp = Interpreter::new(Context::new("x", Axioms::default()).unwrap());
    let outcome = interp.run_source("", &CycleOptions::default()).unwrap();
    let err = export_cycle(
        &outcome.cycle,
        interp.context_mut(),
        &dir.path().join("missing/cycle.json"),
    )
    .unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
}

#[test]
fn axioms_load_from_toml_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("axioms.toml");
    std::fs::write(
        &path,
        r#"
[limits]
max_recursion_depth = 2

[absolutism]
patterns = ["\\bforever\\b"]

[blind_spots]
silence = "what is not said"
"#,
    )
    .unwrap();

    let axioms = Axioms::load(&path).unwrap();
    assert_eq!(axioms.max_recursion_depth(), 2);
    assert_eq!(axioms.max_entities(), 10_000);
    assert!(axioms.validate_no_absolutism("Forever and ever").is_err());
    assert!(axioms.validate_no_absolutism("the absolute truth").is_ok());

    let ctx = Context::new("configured", axioms).unwrap();
    assert!(ctx.blind_spots().contains_key("silence"));
    assert!(!ctx.blind_spots().contains_key("chaos"));
}

#[test]
fn missing_axioms_file_is_config_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = Axioms::load(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
