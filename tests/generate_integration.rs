//! End-to-end test: schema JSON in, GDScript tree on disk out.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use stdb_gdgen::schema::ir::codegen::codegen_reducer_index;
use stdb_gdgen::schema::output::OutputWriter;

const SCHEMA_JSON: &str = r##"{
  "typespace": { "types": [
    { "Product": { "elements": [
      { "name": { "some": "id" }, "algebraic_type": { "U64": [] } },
      { "name": { "some": "username" }, "algebraic_type": { "String": [] } },
      { "name": { "some": "health" }, "algebraic_type": { "F32": [] } }
    ] } },
    { "Sum": { "variants": [
      { "name": { "some": "Idle" }, "algebraic_type": { "Product": { "elements": [] } } },
      { "name": { "some": "Moving" }, "algebraic_type": { "Product": { "elements": [] } } }
    ] } }
  ] },
  "types": [
    { "name": { "scope": [], "name": "Player" }, "ty": 0 },
    { "name": { "scope": [], "name": "PlayerState" }, "ty": 1 }
  ],
  "tables": [
    { "name": "player", "product_type_ref": 0, "primary_key": [0] }
  ],
  "reducers": [
    { "name": "set_health", "params": { "elements": [
      { "name": { "some": "health" }, "algebraic_type": { "F32": [] } }
    ] }, "lifecycle": { "none": [] } }
  ]
}"##;

#[test]
fn generates_full_output_tree() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = stdb_gdgen::schema::generate(SCHEMA_JSON, "game").unwrap();

    let writer = OutputWriter::new(dir.path());
    assert_eq!(writer.write_artifacts(&artifacts), 0);
    writer.write_schema_snapshot("game", SCHEMA_JSON).unwrap();
    let index = codegen_reducer_index(&["game".to_string()], "out");
    assert_eq!(writer.write_artifacts(&[index]), 0);

    let player = fs::read_to_string(dir.path().join("tables/player.gd")).unwrap();
    assert!(player.starts_with("#Do not edit this file, it is generated automatically.\n"));
    assert!(player.contains("class_name Player extends Resource"));
    assert!(player.contains("set_meta(\"primary_key\", \"id\")"));

    let state =
        fs::read_to_string(dir.path().join("spacetime_types/player_state.gd")).unwrap();
    assert!(state.contains("enum {\n\tIdle,\n\tMoving\n}"));

    let reducers = fs::read_to_string(dir.path().join("reducers_game.gd")).unwrap();
    assert!(reducers.contains("static func set_health(health: float,"));

    let root_index = fs::read_to_string(dir.path().join("reducers.gd")).unwrap();
    assert!(root_index.contains("const Game = preload(\"res://out/reducers_game.gd\")"));

    let snapshot = fs::read_to_string(dir.path().join("game_schema.json")).unwrap();
    assert_eq!(snapshot, SCHEMA_JSON);
}

#[test]
fn regeneration_rewrites_identical_files() {
    let dir = tempfile::tempdir().unwrap();
    let writer = OutputWriter::new(dir.path());

    let artifacts = stdb_gdgen::schema::generate(SCHEMA_JSON, "game").unwrap();
    writer.write_artifacts(&artifacts);
    let first = fs::read_to_string(dir.path().join("tables/player.gd")).unwrap();

    let artifacts = stdb_gdgen::schema::generate(SCHEMA_JSON, "game").unwrap();
    writer.write_artifacts(&artifacts);
    let second = fs::read_to_string(dir.path().join("tables/player.gd")).unwrap();

    assert_eq!(first, second);
}
