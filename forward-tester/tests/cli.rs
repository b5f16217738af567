use std::process::Command;

fn tester() -> Command {
    Command::new(env!("CARGO_BIN_EXE_forward-tester"))
}

fn json_from(stdout: &[u8]) -> serde_json::Value {
    serde_json::from_slice(stdout).expect("stdout is a single JSON document")
}

#[test]
fn cli_json_only_prints_the_report() {
    let output = tester().args(["run", "30", "--json"]).output().expect("run cli");
    assert!(output.status.success());
    let report = json_from(&output.stdout);
    assert_eq!(report["runs"], 30);
    let rate = report["winRate"].as_f64().expect("winRate");
    assert!((0.0..=1.0).contains(&rate));
    for set in ["finalHpWins", "maxHpAll", "combatsAll", "buriedAll"] {
        let p = &report["percentiles"][set];
        let values: Vec<f64> = ["p5", "p25", "p50", "p75", "p95"]
            .iter()
            .map(|k| p[k].as_f64().expect("percentile"))
            .collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]), "{set}: {values:?}");
    }
}

#[test]
fn cli_is_deterministic() {
    let first = tester().args(["run", "12", "--json"]).output().expect("run cli");
    let second = tester().args(["run", "12", "--json"]).output().expect("run cli");
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn cli_malformed_count_falls_back_to_default() {
    let output = tester().args(["run", "nope", "--json"]).output().expect("run cli");
    assert!(output.status.success());
    assert_eq!(json_from(&output.stdout)["runs"], 1000);
}

#[test]
fn cli_console_report_precedes_json() {
    let output = tester()
        .args(["run", "10"])
        .env("NO_COLOR", "1")
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let marker = stdout.find("--- JSON (for tooling) ---").expect("json marker");
    assert!(stdout[..marker].contains("FORWARD Batch Report"));
    let json: serde_json::Value =
        serde_json::from_str(stdout[marker..].split_once('\n').expect("json body").1.trim())
            .expect("trailing json");
    assert_eq!(json["runs"], 10);
}
