use assert_cmd::Command;

#[test]
fn claw_dry_run_with_override_succeeds() {
    let mut cmd = Command::cargo_bin("claw").expect("claw binary should build");
    cmd.env("CLAW_SANDBOX", "my_sandbox")
        .env("CLAW_DRY_RUN", "1")
        .env("CLAW_LAUNCHER", "cf_sandbox")
        .env("CLAW_CONFIG_PATH", env!("CARGO_MANIFEST_DIR").to_owned() + "/claw.example.toml")
        .env_remove("CLAW_LOG")
        .env_remove("RUST_LOG")
        .args(["run", "TaskX", "--workers", "4"]);
    cmd.assert()
        .success()
        .stdout("cf_sandbox my_sandbox law run TaskX --workers 4\n");
}
