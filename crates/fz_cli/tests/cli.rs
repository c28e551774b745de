//! Black-box runs of the `fz` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const HEADER: &str = "Id,Specimen,Originator,RT-pvl Result,RT-mecA Result,RT-mecC Result";

/// 5 must-include, 40 MRSA PVL-negative SSTI, 4 Blood, 10 + 20 MSSA, 21 other.
fn scenario_csv(dir: &Path) -> PathBuf {
    let mut text = format!("{HEADER}\n");
    let mut id = 0;
    let mut push = |n: usize, specimen: &str, mec_a: &str, pvl: &str, origin: &str| {
        for _ in 0..n {
            id += 1;
            text.push_str(&format!("{id},{specimen},{origin},{pvl},{mec_a},\n"));
        }
    };
    push(3, "Wound", "Positive", "Positive", "LAB-A");
    push(2, "Blood", "Positive", "Positive", "LAB-B");
    push(40, "Abscess", "Positive", "Negative", "LAB-A");
    push(4, "Blood", "Positive", "Negative", "LAB-C");
    push(10, "Skin", "Negative", "Positive", "LAB-B");
    push(20, "Blood", "Negative", "Negative", "LAB-B");
    push(21, "Urine", "Positive", "Positive", "LAB-D");
    let path = dir.join("specimens.csv");
    fs::write(&path, text).unwrap();
    path
}

fn fz() -> Command {
    let mut cmd = Command::cargo_bin("fz").unwrap();
    cmd.env_remove("FZ_LOG");
    cmd
}

fn workbooks(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            let name = p.file_name().unwrap().to_string_lossy().into_owned();
            name.starts_with("bact_to_freeze__") && name.ends_with(".xlsx")
        })
        .collect()
}

#[test]
fn run_writes_workbook_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = scenario_csv(dir.path());
    let out = dir.path().join("out");

    fz().arg("--input-file")
        .arg(&input)
        .args(["-n", "30", "--summary", "--no-log-file"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("bact_to_freeze__"));

    assert_eq!(workbooks(&out).len(), 1);

    let summary: serde_json::Value =
        serde_json::from_slice(&fs::read(out.join("selection_summary.json")).unwrap()).unwrap();
    assert_eq!(summary["selected"], 30);
    assert_eq!(summary["shortfall"], 0);
    assert_eq!(summary["completion"]["event"], "ssti_absorbed_blood");
    assert_eq!(summary["input"]["file_name"], "specimens.csv");
}

#[test]
fn summaries_are_byte_identical_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let input = scenario_csv(dir.path());
    let mut bytes = Vec::new();
    for name in ["a", "b"] {
        let out = dir.path().join(name);
        fz().arg("--input_file")
            .arg(&input)
            .args(["--summary", "--quiet", "--no-log-file", "--seed", "7"])
            .arg("--out")
            .arg(&out)
            .assert()
            .success();
        bytes.push(fs::read(out.join("selection_summary.json")).unwrap());
    }
    assert_eq!(bytes[0], bytes[1]);
}

#[test]
fn log_file_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = scenario_csv(dir.path());
    let logs = dir.path().join("logs");

    fz().arg("--input-file")
        .arg(&input)
        .arg("--out")
        .arg(dir.path())
        .arg("--log-dir")
        .arg(&logs)
        .assert()
        .success();

    let files: Vec<PathBuf> = fs::read_dir(&logs).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("logs__") && name.ends_with(".txt"), "{name}");
    let text = fs::read_to_string(&files[0]).unwrap();
    assert!(text.contains("initial quotas"), "{text}");
}

#[test]
fn validate_only_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = scenario_csv(dir.path());
    let out = dir.path().join("out");

    fz().arg("--input-file")
        .arg(&input)
        .args(["--validate-only", "--no-log-file"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();
    assert!(!out.exists());
}

#[test]
fn input_problems_exit_2() {
    let dir = tempfile::tempdir().unwrap();

    fz().args(["--input-file", "no/such/file.csv", "--no-log-file"]).assert().code(2);

    let short = dir.path().join("short.csv");
    fs::write(&short, "Specimen,Originator\nWound,A\n").unwrap();
    fz().arg("--input-file")
        .arg(&short)
        .args(["--validate-only", "--no-log-file"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("RT-pvl Result"));

    let txt = dir.path().join("specimens.txt");
    fs::write(&txt, HEADER).unwrap();
    fz().arg("--input-file").arg(&txt).arg("--no-log-file").assert().code(2);

    let input = scenario_csv(dir.path());
    let params = dir.path().join("params.json");
    fs::write(&params, r#"{"ssti_pct": 60}"#).unwrap();
    fz().arg("--input-file")
        .arg(&input)
        .arg("--params")
        .arg(&params)
        .arg("--no-log-file")
        .assert()
        .code(2);
}

#[test]
fn unwritable_output_exits_4() {
    let dir = tempfile::tempdir().unwrap();
    let input = scenario_csv(dir.path());
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    fz().arg("--input-file")
        .arg(&input)
        .arg("--out")
        .arg(&blocker)
        .arg("--no-log-file")
        .assert()
        .code(4);
}
