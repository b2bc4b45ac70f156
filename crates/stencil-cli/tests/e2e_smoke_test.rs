use std::{fs, path::PathBuf};

use tempfile::tempdir;

use stencil_cli::{Args, CliError, Command, run};

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Fixtures are at workspace root, relative to workspace not the crate
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("fixtures")
}

fn args(command: Command) -> Args {
    Args {
        command,
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_fixtures_round_trip() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let fixtures = collect_json_files(fixtures_path());
    assert!(!fixtures.is_empty(), "No fixtures found in fixtures/");

    let mut failed = Vec::new();

    for fixture in &fixtures {
        let stem = fixture.file_stem().unwrap().to_string_lossy().to_string();
        let original = fixture.to_string_lossy().to_string();
        let compressed = temp_dir.path().join(format!("{stem}.compressed.json"));
        let expanded = temp_dir.path().join(format!("{stem}.expanded.json"));
        let compressed = compressed.to_string_lossy().to_string();
        let expanded = expanded.to_string_lossy().to_string();

        let steps = [
            Command::Compress {
                input: original.clone(),
                output: Some(compressed.clone()),
                name: None,
            },
            Command::Validate {
                original: original.clone(),
                compressed: compressed.clone(),
                full: true,
            },
            Command::Expand {
                input: compressed.clone(),
                output: Some(expanded.clone()),
            },
            Command::Validate {
                original: expanded.clone(),
                compressed: compressed.clone(),
                full: true,
            },
        ];

        for step in steps {
            if let Err(e) = run(&args(step)) {
                failed.push((fixture.clone(), e));
                break;
            }
        }
    }

    if !failed.is_empty() {
        eprintln!("\nFixtures that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} fixture(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_compression_shrinks_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    for fixture in collect_json_files(fixtures_path()) {
        let output = temp_dir.path().join("out.json");
        run(&args(Command::Compress {
            input: fixture.to_string_lossy().to_string(),
            output: Some(output.to_string_lossy().to_string()),
            name: Some("Renamed".to_string()),
        }))
        .expect("Failed to compress fixture");

        let compressed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let original: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&fixture).unwrap()).unwrap();

        assert_eq!(compressed["name"], "Renamed");
        assert!(
            !compressed["components"].as_object().unwrap().is_empty(),
            "{} produced no components",
            fixture.display()
        );
        assert!(
            serde_json::to_string(&compressed).unwrap().len()
                < serde_json::to_string(&original).unwrap().len()
        );
    }
}

#[test]
fn e2e_smoke_test_error_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_fixtures = collect_json_files(fixtures_path().join("errors"));
    assert!(
        !error_fixtures.is_empty(),
        "No error fixtures found in fixtures/errors/"
    );

    for fixture in &error_fixtures {
        let output = temp_dir.path().join("error.json");
        let result = run(&args(Command::Compress {
            input: fixture.to_string_lossy().to_string(),
            output: Some(output.to_string_lossy().to_string()),
            name: None,
        }));

        assert!(
            matches!(result, Err(CliError::Json { .. })),
            "{} should fail to decode",
            fixture.display()
        );
        assert!(!output.exists());
    }
}

#[test]
fn e2e_smoke_test_validate_detects_tampering() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let original = fixtures_path().join("buttons.json");
    let compressed = temp_dir.path().join("buttons.compressed.json");

    run(&args(Command::Compress {
        input: original.to_string_lossy().to_string(),
        output: Some(compressed.to_string_lossy().to_string()),
        name: None,
    }))
    .expect("Failed to compress fixture");

    let mut design: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&compressed).unwrap()).unwrap();
    design["instances"].as_array_mut().unwrap().pop();
    fs::write(&compressed, serde_json::to_string(&design).unwrap()).unwrap();

    let result = run(&args(Command::Validate {
        original: original.to_string_lossy().to_string(),
        compressed: compressed.to_string_lossy().to_string(),
        full: false,
    }));

    assert!(matches!(result, Err(CliError::Validation { mismatches: 2 })));
}

/// JSON for an instance wrapping a chain of `depth` frames that ends in a label.
fn tower_json(id: &str, label: &str, depth: usize) -> String {
    let mut json = format!(
        r#"{{"id":"{id}","name":"Tower","type":"INSTANCE","componentId":"40:1","children":["#
    );
    for level in 0..depth {
        json.push_str(&format!(
            r#"{{"id":"I{id};{level}","name":"Level","type":"FRAME","children":["#
        ));
    }
    json.push_str(&format!(
        r#"{{"id":"I{id};leaf","name":"Label","type":"TEXT","text":"{label}"}}"#
    ));
    json.push_str(&"]}".repeat(depth + 1));
    json
}

/// JSON for a plain frame chain `depth` levels deep.
fn chain_json(depth: usize) -> String {
    let mut json = String::new();
    for level in 0..depth {
        json.push_str(&format!(
            r#"{{"id":"chain:{level}","name":"Frame","type":"FRAME","children":["#
        ));
    }
    json.push_str(r#"{"id":"chain:end","name":"End","type":"RECTANGLE"}"#);
    json.push_str(&"]}".repeat(depth));
    json
}

#[test]
fn e2e_smoke_test_deep_documents_round_trip() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let depth = 5_000;

    let document = format!(
        r#"{{"name":"Deep","nodes":[{},{},{},{}]}}"#,
        tower_json("7:1", "One", depth),
        tower_json("7:2", "Two", depth),
        tower_json("7:3", "Three", depth),
        chain_json(depth),
    );
    let original = temp_dir.path().join("deep.json");
    fs::write(&original, document).unwrap();

    let original = original.to_string_lossy().to_string();
    let compressed = temp_dir.path().join("deep.compressed.json");
    let compressed = compressed.to_string_lossy().to_string();
    let expanded = temp_dir.path().join("deep.expanded.json");
    let expanded = expanded.to_string_lossy().to_string();

    let steps = [
        Command::Compress {
            input: original.clone(),
            output: Some(compressed.clone()),
            name: None,
        },
        Command::Validate {
            original: original.clone(),
            compressed: compressed.clone(),
            full: true,
        },
        Command::Expand {
            input: compressed.clone(),
            output: Some(expanded.clone()),
        },
        Command::Validate {
            original: expanded,
            compressed: compressed.clone(),
            full: true,
        },
    ];
    for step in steps {
        if let Err(err) = run(&args(step)) {
            panic!("deep document failed: {err}");
        }
    }

    let written = fs::read_to_string(&compressed).unwrap();
    assert!(written.contains(r#""40:1":{"id":"40:1""#));
}

#[test]
fn e2e_smoke_test_trailing_content_is_rejected() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("trailing.json");
    fs::write(&input, r#"{"name":"Doc","nodes":[]} {"name":"Again"}"#).unwrap();

    let result = run(&args(Command::Compress {
        input: input.to_string_lossy().to_string(),
        output: None,
        name: None,
    }));

    assert!(matches!(result, Err(CliError::Json { .. })));
}

#[test]
fn e2e_smoke_test_missing_config_fails() {
    let result = run(&Args {
        command: Command::Expand {
            input: "unused.json".to_string(),
            output: None,
        },
        config: Some("does/not/exist.toml".to_string()),
        log_level: "off".to_string(),
    });

    assert!(matches!(result, Err(CliError::Config(_))));
}
