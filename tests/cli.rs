use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

fn braglog(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("braglog").unwrap();
    cmd.env_remove("BRAGLOG_DB").env_remove("RUST_LOG").arg("--db").arg(db);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn log_then_list_tags_and_projects() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("log.db");

    braglog(&db)
        .args(["log", "-m", "Shipped the thing", "-t", "Zebra, apple,,Banana", "-p", " Alpha "])
        .assert()
        .success();

    assert_eq!(stdout_of(braglog(&db).arg("tags")), "apple\nBanana\nZebra\n");
    assert_eq!(stdout_of(braglog(&db).arg("projects")), "Alpha\n");
    assert_eq!(
        stdout_of(braglog(&db).arg("last")),
        "tags: Zebra,apple,Banana\nproject: Alpha\n"
    );
}

#[test]
fn last_reports_null_values() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("log.db");

    braglog(&db).args(["log", "-m", "plain"]).assert().success();

    assert_eq!(
        stdout_of(braglog(&db).arg("last")),
        "tags: (null)\nproject: (null)\n"
    );
}

#[test]
fn init_creates_database() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("sub").join("log.db");

    let out = stdout_of(braglog(&db).arg("init"));

    assert!(out.contains("schema v1"));
    assert!(db.exists());
}

#[test]
fn import_replaces_log() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("log.db");
    let other = dir.path().join("other.db");

    braglog(&db).args(["log", "-m", "old", "-t", "X"]).assert().success();
    braglog(&other).args(["log", "-m", "new", "-t", "Y"]).assert().success();

    braglog(&db).arg("import").arg(&other).assert().success();

    assert_eq!(stdout_of(braglog(&db).arg("tags")), "Y\n");
    let backups = std::fs::read_dir(dir.path())
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .starts_with("log.db.backup.")
        })
        .count();
    assert_eq!(backups, 1);
}

#[test]
fn import_of_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("log.db");

    braglog(&db).args(["log", "-m", "old", "-t", "X"]).assert().success();

    let output = braglog(&db)
        .arg("import")
        .arg(dir.path().join("missing.db"))
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8(output).unwrap().contains("Import rejected"));
    assert_eq!(stdout_of(braglog(&db).arg("tags")), "X\n");
}

#[test]
fn list_shows_recent_entries() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("log.db");

    assert!(stdout_of(braglog(&db).arg("list")).contains("No logs found."));

    braglog(&db).args(["log", "-m", "first"]).assert().success();
    braglog(&db).args(["log", "-m", "second", "-p", "Beta"]).assert().success();

    let out = stdout_of(braglog(&db).args(["list", "-n", "1"]));
    assert!(out.contains("second"));
    assert!(out.contains("Project: Beta"));
    assert!(!out.contains("first"));
}

#[cfg(target_os = "linux")]
#[test]
fn default_store_lives_in_the_data_dir() {
    let dir = TempDir::new().unwrap();

    Command::cargo_bin("braglog")
        .unwrap()
        .env_remove("BRAGLOG_DB")
        .env_remove("RUST_LOG")
        .env("XDG_DATA_HOME", dir.path())
        .args(["log", "-m", "no --db given", "-t", "Default"])
        .assert()
        .success();

    assert!(dir.path().join("BragLog").join("log.db").exists());
}
