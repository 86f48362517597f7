use assert_cmd::cargo_bin;
use std::path::Path;
use std::process::Command;

/// The binary pointed at an isolated data directory.
pub fn bank(data_dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("boardbank"));
    cmd.env_remove("BOARDBANK_DB_PATH")
        .env_remove("BOARDBANK_DATA_DIR")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--quiet");
    cmd
}
