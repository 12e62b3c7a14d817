use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use std::fs::create_dir_all;
use tempfile::tempdir;

/// A command with no storage configuration inherited from the developer's shell.
fn isolated_cmd(cwd: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("storage-backup").expect("Binary exists");
    cmd.current_dir(cwd)
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_SERVICE_ROLE_KEY")
        .env_remove("BACKUP_DIR");
    cmd
}

#[test]
fn backup_fails_fast_without_configuration() {
    let tmp = tempdir().unwrap();

    isolated_cmd(tmp.path())
        .arg("backup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SUPABASE_URL"));

    assert!(
        !tmp.path().join("backups").exists(),
        "No work should start before configuration is complete"
    );
}

#[test]
fn restore_without_backup_directory_succeeds_with_zero_counts() {
    let tmp = tempdir().unwrap();

    // Port 9 (discard) is never contacted: restore stops before any remote call.
    isolated_cmd(tmp.path())
        .arg("restore")
        .arg("--backup-dir")
        .arg(tmp.path().join("missing"))
        .env("SUPABASE_URL", "http://127.0.0.1:9")
        .env("SUPABASE_SERVICE_ROLE_KEY", "service-role")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Storage restore complete: 0/0 files uploaded",
        ));
}

#[test]
fn backup_exits_nonzero_when_buckets_cannot_be_listed() {
    let tmp = tempdir().unwrap();

    isolated_cmd(tmp.path())
        .arg("backup")
        .env("SUPABASE_URL", "http://127.0.0.1:9")
        .env("SUPABASE_SERVICE_ROLE_KEY", "service-role")
        .env("BACKUP_DIR", tmp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Storage backup failed"));
}

#[test]
fn restore_reads_backup_dir_from_yaml_config() {
    let tmp = tempdir().unwrap();
    let config = tmp.path().join("storage-backup.yaml");
    std::fs::write(&config, "url: http://127.0.0.1:9\nbackup_dir: ./nothing-here\n").unwrap();

    isolated_cmd(tmp.path())
        .arg("--config")
        .arg(&config)
        .arg("restore")
        .env("SUPABASE_SERVICE_ROLE_KEY", "service-role")
        .assert()
        .success()
        .stdout(predicate::str::contains("0/0 files uploaded"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
#[serial]
async fn emits_trace_initialised_and_restore_events() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use storage_backup::cli::{run, Cli, Commands};

    let tmp = tempdir().unwrap();
    let backup_dir = tmp.path().join("backup");
    create_dir_all(&backup_dir).unwrap();
    std::env::set_var("SUPABASE_URL", "http://127.0.0.1:9");
    std::env::set_var("SUPABASE_SERVICE_ROLE_KEY", "service-role");

    let cli = Cli {
        config: None,
        backup_dir: Some(backup_dir),
        command: Commands::Restore,
    };

    run(cli).await.expect("Restore of an empty backup should succeed");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
    assert!(
        event_msgs
            .iter()
            .any(|msg| msg.contains("No storage backup found")),
        "Expected the missing-backup notice, got: {:?}",
        event_msgs
    );
}

#[test]
fn dotenv_is_read_from_working_directory_only() {
    let tmp = tempdir().unwrap();
    let nested = tmp.path().join("nested");
    create_dir_all(&nested).unwrap();
    std::fs::write(
        tmp.path().join(".env"),
        "SUPABASE_URL=http://127.0.0.1:9\nSUPABASE_SERVICE_ROLE_KEY=service-role\n",
    )
    .unwrap();

    // The parent's .env is not picked up.
    isolated_cmd(&nested)
        .arg("restore")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SUPABASE_URL"));

    // The working directory's .env is.
    isolated_cmd(tmp.path())
        .arg("restore")
        .arg("--backup-dir")
        .arg(tmp.path().join("missing"))
        .assert()
        .success()
        .stdout(predicate::str::contains("0/0 files uploaded"));
}
