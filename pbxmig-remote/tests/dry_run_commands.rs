use std::fs;
use std::path::Path;

use rstest::rstest;
use tempfile::TempDir;

use pbxmig_core::{MigrationConfig, Secret, Side};
use pbxmig_remote::{CommandSpec, DryRunRunner, Fetcher, Replayer};

fn config_in(root: &Path) -> MigrationConfig {
    let mut config = MigrationConfig {
        data_dir: root.join("data"),
        ..MigrationConfig::default()
    };
    config.old.mysql.password = Secret::from("oldpw");
    config.new.mysql.password = Secret::from("newpw");
    config
}

fn shown(specs: &[CommandSpec]) -> Vec<String> {
    specs.iter().map(|s| s.to_string()).collect()
}

#[rstest]
#[case::old(Side::Old, "old-pbx.example.net", "oldpw")]
#[case::new(Side::New, "new-pbx.example.net", "newpw")]
fn fetch_side_targets_its_host_and_hides_password(
    #[case] side: Side,
    #[case] host: &str,
    #[case] password: &str,
) {
    let dir = TempDir::new().expect("tempdir");
    let config = config_in(dir.path());
    let runner = DryRunRunner::new();

    let fetched = Fetcher::new(&config, &runner)
        .expect("fetcher")
        .fetch_side(side)
        .expect("fetch");
    assert_eq!(fetched.etc_dir, config.etc_dir(side));

    let recorded = runner.recorded();
    assert_eq!(recorded.len(), 2);
    for spec in &recorded {
        assert!(spec.argv().iter().any(|a| a.contains(host)), "{spec}");
    }
    // The real argv carries the password; the displayed form never does.
    assert!(recorded[1].argv().iter().any(|a| a.contains(password)));
    for line in shown(&recorded) {
        assert!(!line.contains(password), "{line}");
    }
}

#[test]
fn replay_pushes_files_then_imports_dump() {
    let dir = TempDir::new().expect("tempdir");
    let config = config_in(dir.path());
    fs::create_dir_all(config.etc_dir(Side::Old)).expect("mkdir");
    fs::write(config.dump_path(Side::Old), "a=1\n").expect("dump");

    let runner = DryRunRunner::new();
    let replayer = Replayer::new(&config, &runner).expect("replayer");
    replayer
        .push_files(&["sip_custom.conf".to_string()])
        .expect("push");
    replayer.import_dump().expect("import");

    let recorded = runner.recorded();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].program(), "rsync");
    assert_eq!(recorded[1].program(), "ssh");
    assert_eq!(recorded[1].stdin(), Some(config.dump_path(Side::Old).as_path()));
    assert!(shown(&recorded).iter().all(|line| !line.contains("newpw")));
}

#[test]
fn import_without_dump_runs_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let config = config_in(dir.path());
    let runner = DryRunRunner::new();

    let result = Replayer::new(&config, &runner).expect("replayer").import_dump();
    assert!(result.is_err());
    assert!(runner.recorded().is_empty());
}
