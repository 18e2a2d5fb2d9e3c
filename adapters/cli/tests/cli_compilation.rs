use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "tile-quest"])
        .status()
        .expect("failed to invoke cargo check for tile-quest CLI binary");

    assert!(status.success(), "cargo check --bin tile-quest should succeed");
}

#[test]
fn help_lists_every_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_tile-quest"))
        .arg("--help")
        .output()
        .expect("failed to run tile-quest --help");

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--map",
        "--config",
        "--manifest",
        "--vsync",
        "--no-vsync",
        "--show-fps",
        "--log-filter",
        "--start",
    ] {
        assert!(help.contains(flag), "help output is missing {flag}");
    }
}

#[test]
fn missing_map_fails_with_context() {
    let output = Command::new(env!("CARGO_BIN_EXE_tile-quest"))
        .args(["--map", "does/not/exist.toml", "--no-sprites"])
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run tile-quest");

    assert!(!output.status.success());
    let logs = String::from_utf8_lossy(&output.stdout);
    assert!(
        logs.contains("failed to read map file"),
        "unexpected output: {logs}"
    );
}
