use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "detour-defence"])
        .status()
        .expect("failed to invoke cargo check for detour-defence CLI binary");

    assert!(
        status.success(),
        "cargo check --bin detour-defence should succeed"
    );
}

#[test]
fn headless_run_prints_a_json_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_detour-defence"))
        .args([
            "--seed",
            "5",
            "--ticks",
            "400",
            "--auto-build",
            "--json",
            "--log-level",
            "warn",
        ])
        .output()
        .expect("failed to run detour-defence");
    assert!(output.status.success());

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a JSON summary");
    assert_eq!(summary["seed"], 5);
    assert_eq!(summary["stage"], 1);
    assert_eq!(summary["sim_time_ms"], 40_000);
    assert!(summary["towers"].as_u64().expect("tower count") > 0);
    assert!(summary["kills"].as_u64().expect("kill count") > 0);
}

#[test]
fn unreadable_rules_file_fails_the_run() {
    let output = Command::new(env!("CARGO_BIN_EXE_detour-defence"))
        .args(["--config", "/nonexistent/rules.toml", "--ticks", "1"])
        .output()
        .expect("failed to run detour-defence");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/nonexistent/rules.toml"), "{stderr}");
}
