use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

const NOW: i64 = 1_000_000;

fn state_doc(alpha_phase: &str) -> Value {
    json!({
        "campaigns": [
            {
                "campaignId": "camp-alpha", "candidateId": "alpha", "seed": "alpha",
                "cycleSequence": 1, "activePhase": alpha_phase, "phaseEndsEpoch": NOW - 1_000,
                "reputationScore": 80, "fundsRaisedThisCycle": 20000.0,
                "endorsementsAcquired": 8, "scandalsActive": 0
            },
            {
                "campaignId": "camp-bravo", "candidateId": "bravo", "seed": "bravo",
                "cycleSequence": 1, "activePhase": "ACTIVE", "phaseEndsEpoch": NOW + 86_400,
                "reputationScore": 60, "fundsRaisedThisCycle": 5000.0,
                "endorsementsAcquired": 2, "scandalsActive": 0
            }
        ],
        "polls": [
            { "candidateId": "alpha", "timestampEpoch": NOW - 3_600, "finalSupportPercent": 62.0 },
            { "candidateId": "bravo", "timestampEpoch": NOW - 3_600, "finalSupportPercent": 55.0 }
        ],
        "research": [
            { "id": "R-1", "ownerId": "alpha", "targetId": "bravo", "credibility": 80 }
        ],
        "accounts": [
            { "candidateId": "alpha", "funds": 150000.0 },
            { "candidateId": "bravo", "funds": 60000.0 }
        ]
    })
}

fn write_state(dir: &TempDir, doc: &Value) -> PathBuf {
    let path = dir.path().join("state.json");
    std::fs::write(&path, serde_json::to_vec_pretty(doc).unwrap()).unwrap();
    path
}

fn ce(state: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ce").unwrap();
    cmd.env("CE_LOG", "off").arg("--state").arg(state).arg("--now").arg(NOW.to_string());
    cmd
}

fn stdout_json(out: &[u8]) -> Value {
    serde_json::from_slice(out).unwrap()
}

fn read_state(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn probability_prints_factors() {
    let dir = tempfile::tempdir().unwrap();
    let state = write_state(&dir, &state_doc("ELECTION"));

    let out = ce(&state).args(["probability", "--candidate", "alpha"]).assert().success();
    let v = stdout_json(&out.get_output().stdout);
    assert!((v["probability"].as_f64().unwrap() - 72.5).abs() < 1e-9);
    assert_eq!(v["factors"]["debates"].as_f64().unwrap(), 50.0);
}

#[test]
fn resolve_apply_rewrites_state_once() {
    let dir = tempfile::tempdir().unwrap();
    let state = write_state(&dir, &state_doc("ELECTION"));
    let out_dir = dir.path().join("out");

    let out = ce(&state)
        .args(["resolve", "--candidate", "alpha", "--apply", "--out"])
        .arg(&out_dir)
        .assert()
        .success();
    let v = stdout_json(&out.get_output().stdout);
    assert_eq!(v["outcome"]["outcomeTier"], "LANDSLIDE");
    assert_eq!(v["outcome"]["audit"]["roll"], 7);
    assert!(v["outcomeId"].as_str().unwrap().starts_with("OUT:"));
    assert!(out_dir.join("outcome.json").is_file());

    let saved = read_state(&state);
    let alpha = &saved["campaigns"][0];
    assert_eq!(alpha["reputationScore"], 95);
    assert_eq!(alpha["lastResolvedSequence"], 1);
    assert_eq!(saved["accounts"][0]["funds"].as_f64().unwrap(), 160_000.0);

    ce(&state)
        .args(["resolve", "--candidate", "alpha", "--apply"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("already resolved"));
}

#[test]
fn dry_resolve_leaves_state_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let state = write_state(&dir, &state_doc("ELECTION"));
    let before = std::fs::read(&state).unwrap();

    let a = ce(&state).args(["resolve", "--candidate", "alpha"]).assert().success();
    let b = ce(&state).args(["resolve", "--candidate", "alpha"]).assert().success();
    assert_eq!(a.get_output().stdout, b.get_output().stdout);
    assert_eq!(std::fs::read(&state).unwrap(), before);
}

#[test]
fn resolve_outside_election_is_a_precondition_failure() {
    let dir = tempfile::tempdir().unwrap();
    let state = write_state(&dir, &state_doc("RESOLUTION"));
    ce(&state).args(["resolve", "--candidate", "alpha"]).assert().code(3);
}

#[test]
fn unknown_candidate_and_bad_id_codes() {
    let dir = tempfile::tempdir().unwrap();
    let state = write_state(&dir, &state_doc("ELECTION"));
    ce(&state).args(["countdown", "--candidate", "zulu"]).assert().code(5);
    ce(&state).args(["countdown", "--candidate", "no spaces"]).assert().code(2);
}

#[test]
fn rejected_ad_prints_report_and_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let state = write_state(&dir, &state_doc("ACTIVE"));
    let before = std::fs::read(&state).unwrap();

    ce(&state)
        .args(["launch-ad", "--attacker", "alpha", "--target", "bravo", "--amount", "1000"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Ad.AmountBelowMinimum"));
    assert_eq!(std::fs::read(&state).unwrap(), before);
}

#[test]
fn launch_ad_commits_record_and_debit() {
    let dir = tempfile::tempdir().unwrap();
    let state = write_state(&dir, &state_doc("ACTIVE"));

    let out = ce(&state)
        .args([
            "launch-ad", "--attacker", "alpha", "--target", "bravo", "--research", "R-1", "--amount",
            "100000",
        ])
        .assert()
        .success();
    let v = stdout_json(&out.get_output().stdout);
    assert_eq!(v["record"]["id"], "AD-4a62cb4d");
    assert_eq!(v["record"]["backfireOccurred"], false);

    let saved = read_state(&state);
    assert_eq!(saved["ads"].as_array().unwrap().len(), 1);
    assert_eq!(saved["accounts"][0]["funds"].as_f64().unwrap(), 50_000.0);
    assert_eq!(saved["polls"].as_array().unwrap().len(), 4);
}

#[test]
fn validate_ad_reports_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let state = write_state(&dir, &state_doc("ACTIVE"));

    ce(&state)
        .args(["validate-ad", "--attacker", "alpha", "--target", "bravo", "--amount", "30000"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""isValid":true"#));

    ce(&state)
        .args(["validate-ad", "--attacker", "alpha", "--target", "alpha", "--amount", "30000"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Ad.SelfTarget"));
}

#[test]
fn missing_state_is_io_and_bad_params_is_validation() {
    let dir = tempfile::tempdir().unwrap();
    ce(&dir.path().join("absent.json")).args(["overview", "--candidate", "alpha"]).assert().code(4);

    let state = write_state(&dir, &state_doc("ELECTION"));
    let params = dir.path().join("params.json");
    std::fs::write(&params, r#"{"model":{"weights":{"polling":0.9}}}"#).unwrap();
    ce(&state)
        .arg("--params")
        .arg(&params)
        .args(["probability", "--candidate", "alpha"])
        .assert()
        .code(2);
}

#[test]
fn advance_then_next_cycle_after_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let state = write_state(&dir, &state_doc("ELECTION"));

    ce(&state).args(["next-cycle", "--candidate", "alpha"]).assert().code(3);
    ce(&state).args(["resolve", "--candidate", "alpha", "--apply"]).assert().success();

    let out = ce(&state)
        .args(["next-cycle", "--candidate", "alpha", "--campaign", "camp-alpha-2"])
        .assert()
        .success();
    let v = stdout_json(&out.get_output().stdout);
    assert_eq!(v["cycleSequence"], 2);
    assert_eq!(v["activePhase"], "ANNOUNCEMENT");

    ce(&state).args(["advance", "--candidate", "alpha"]).assert().code(3);
}
