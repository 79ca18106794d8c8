//! Ordered model and accessory tests: add, move and remove through the CLI

mod common;

use common::{
    accessory_ids, add_test_accessory, add_test_model, create_test_purchase, full_id,
    model_numbers, read_record, record_path, set_field, setup_test_collection, yardbook,
};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A purchase with six models numbered 0 to 5
fn six_models(tmp: &TempDir) -> (String, Vec<String>) {
    let purchase = create_test_purchase(tmp, "Hornby", "R4000");
    let models = (0..6)
        .map(|n| add_test_model(tmp, &purchase, &n.to_string()))
        .collect();
    (purchase, models)
}

fn position_of(tmp: &TempDir, model: &str) -> i64 {
    let id = full_id(tmp, "model", model);
    read_record(&record_path(tmp, &id))["position"].as_i64().unwrap()
}

fn max_model_position(tmp: &TempDir, purchase: &str) -> i64 {
    let id = full_id(tmp, "purchase", purchase);
    read_record(&record_path(tmp, &id))["max_model_position"]
        .as_i64()
        .unwrap()
}

#[test]
fn test_add_appends_in_order() {
    let tmp = setup_test_collection();
    let purchase = create_test_purchase(&tmp, "Bachmann", "32-452A");

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "add", &purchase, "--class", "Class 47", "--number", "47 401"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added model MDL@1 at position 0 of PUR@1"));

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "add", &purchase, "--number", "47 402"])
        .assert()
        .success()
        .stdout(predicate::str::contains("at position 1"));

    assert_eq!(model_numbers(&tmp, &purchase), vec!["47 401", "47 402"]);

    assert_eq!(max_model_position(&tmp, &purchase), 1);
}

#[test]
fn test_move_backward_places_before() {
    let tmp = setup_test_collection();
    let (purchase, _) = six_models(&tmp);

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "move", &purchase, "4", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from position 4 to 2"))
        .stdout(predicate::str::contains("3 file(s) rewritten"));

    assert_eq!(model_numbers(&tmp, &purchase), vec!["0", "1", "4", "2", "3", "5"]);
}

#[test]
fn test_move_forward_places_after() {
    let tmp = setup_test_collection();
    let (purchase, _) = six_models(&tmp);

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "move", &purchase, "1", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 file(s) rewritten"));

    assert_eq!(model_numbers(&tmp, &purchase), vec!["0", "2", "3", "1", "4", "5"]);
}

#[test]
fn test_move_leaves_siblings_outside_range_untouched() {
    let tmp = setup_test_collection();
    let (purchase, models) = six_models(&tmp);

    let untouched: Vec<(std::path::PathBuf, String)> = [0usize, 1, 5]
        .iter()
        .map(|&i| {
            let path = record_path(&tmp, &full_id(&tmp, "model", &models[i]));
            let content = fs::read_to_string(&path).unwrap();
            (path, content)
        })
        .collect();

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "move", &purchase, "4", "2"])
        .assert()
        .success();

    for (path, before) in untouched {
        assert_eq!(fs::read_to_string(path).unwrap(), before);
    }
    assert_eq!(position_of(&tmp, &models[4]), 2);
    assert_eq!(position_of(&tmp, &models[2]), 3);
}

#[test]
fn test_move_to_same_position_is_noop() {
    let tmp = setup_test_collection();
    let (purchase, _) = six_models(&tmp);

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "move", &purchase, "3", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to move"));

    assert_eq!(model_numbers(&tmp, &purchase), vec!["0", "1", "2", "3", "4", "5"]);
}

#[test]
fn test_move_out_of_range_fails() {
    let tmp = setup_test_collection();
    let (purchase, _) = six_models(&tmp);

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "move", &purchase, "1", "6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "move", &purchase, "--", "-1", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));

    assert_eq!(model_numbers(&tmp, &purchase), vec!["0", "1", "2", "3", "4", "5"]);
}

#[test]
fn test_move_in_empty_purchase_fails() {
    let tmp = setup_test_collection();
    let purchase = create_test_purchase(&tmp, "Hornby", "R600");

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "move", &purchase, "0", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no models"));
}

#[test]
fn test_remove_closes_gap() {
    let tmp = setup_test_collection();
    let (purchase, models) = six_models(&tmp);
    let removed_path = record_path(&tmp, &full_id(&tmp, "model", &models[1]));

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "remove", &models[1]])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed model MDL@2 from position 1"));

    assert!(!removed_path.exists());
    assert_eq!(model_numbers(&tmp, &purchase), vec!["0", "2", "3", "4", "5"]);
    assert_eq!(position_of(&tmp, &models[0]), 0);
    assert_eq!(position_of(&tmp, &models[5]), 4);

    assert_eq!(max_model_position(&tmp, &purchase), 4);
}

#[test]
fn test_remove_last_then_add_reuses_position() {
    let tmp = setup_test_collection();
    let purchase = create_test_purchase(&tmp, "Hornby", "R2702");
    add_test_model(&tmp, &purchase, "a");
    let last = add_test_model(&tmp, &purchase, "b");

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "remove", &last])
        .assert()
        .success();

    let added = add_test_model(&tmp, &purchase, "c");
    assert_eq!(position_of(&tmp, &added), 1);
    assert_eq!(model_numbers(&tmp, &purchase), vec!["a", "c"]);
}

#[test]
fn test_removed_short_id_no_longer_resolves() {
    let tmp = setup_test_collection();
    let purchase = create_test_purchase(&tmp, "Hornby", "R2702");
    let model = add_test_model(&tmp, &purchase, "a");

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "remove", &model])
        .assert()
        .success();

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "show", &model])
        .assert()
        .failure();
}

#[test]
fn test_model_list_filters_by_category() {
    let tmp = setup_test_collection();
    let purchase = create_test_purchase(&tmp, "Hornby", "R3390TTS");
    add_test_model(&tmp, &purchase, "50 033");
    yardbook()
        .current_dir(tmp.path())
        .args(["model", "add", &purchase, "--category", "coach", "--number", "M14000"])
        .assert()
        .success();

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "list", &purchase, "--category", "coach", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("M14000"))
        .stdout(predicate::str::contains("50 033").not());

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "list", &purchase, "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_model_show_displays_decoder() {
    let tmp = setup_test_collection();
    let purchase = create_test_purchase(&tmp, "Hornby", "R3390TTS");

    yardbook()
        .current_dir(tmp.path())
        .args([
            "model", "add", &purchase, "--class", "Class 50", "--number", "50 033",
            "--decoder", "DCC58", "--address", "3",
        ])
        .assert()
        .success();

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "show", "MDL@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Class 50 50 033"))
        .stdout(predicate::str::contains("DCC58"))
        .stdout(predicate::str::contains("Address: 3"));
}

#[test]
fn test_model_gauge_defaults_from_config() {
    let tmp = setup_test_collection();
    let purchase = create_test_purchase(&tmp, "Graham Farish", "371-375");

    yardbook()
        .current_dir(tmp.path())
        .env("YARDBOOK_GAUGE", "N")
        .args(["model", "add", &purchase, "-f", "id"])
        .assert()
        .success();

    let output = yardbook()
        .current_dir(tmp.path())
        .args(["model", "show", "MDL@1", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["gauge"], "N");
}

#[test]
fn test_accessories_are_ordered_independently() {
    let tmp = setup_test_collection();
    let purchase = create_test_purchase(&tmp, "Hornby", "R1126");
    add_test_model(&tmp, &purchase, "0-4-0");
    let first = add_test_accessory(&tmp, &purchase, "Oval of track");
    let second = add_test_accessory(&tmp, &purchase, "Controller");
    let third = add_test_accessory(&tmp, &purchase, "Power supply");

    yardbook()
        .current_dir(tmp.path())
        .args(["acc", "move", &purchase, "2", "0"])
        .assert()
        .success();
    assert_eq!(
        accessory_ids(&tmp, &purchase),
        vec![third.clone(), first.clone(), second.clone()]
    );

    yardbook()
        .current_dir(tmp.path())
        .args(["acc", "remove", &first])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed accessory"));
    assert_eq!(accessory_ids(&tmp, &purchase), vec![third, second]);

    assert_eq!(model_numbers(&tmp, &purchase), vec!["0-4-0"]);
}

#[test]
fn test_move_refuses_inconsistent_positions() {
    let tmp = setup_test_collection();
    let (purchase, models) = six_models(&tmp);

    let path = record_path(&tmp, &full_id(&tmp, "model", &models[5]));
    set_field(&path, "position", 9i64);

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "move", &purchase, "0", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of order"));
}

#[test]
fn test_broken_model_file_does_not_block_other_purchases() {
    let tmp = setup_test_collection();
    let purchase = create_test_purchase(&tmp, "Hornby", "R3390TTS");
    add_test_model(&tmp, &purchase, "50 033");
    fs::write(tmp.path().join("models/MDL-BROKEN.yb.yaml"), "position: [\n").unwrap();

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "list", &purchase])
        .assert()
        .success()
        .stdout(predicate::str::contains("50 033"))
        .stderr(predicate::str::contains("Skipping"))
        .stderr(predicate::str::contains("MDL-BROKEN.yb.yaml"));

    yardbook()
        .current_dir(tmp.path())
        .args(["model", "add", &purchase, "--number", "50 035"])
        .assert()
        .success()
        .stdout(predicate::str::contains("at position 1"));

    assert_eq!(model_numbers(&tmp, &purchase), vec!["50 033", "50 035"]);

    // validate still reports the file
    yardbook()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("MDL-BROKEN.yb.yaml"));
}
