// Batch execution against fake installers

mod test_helpers;

use brewsync::{Operation, Orchestrator, Outcome, PackageCollection, PackageType, Registry, SyncError};
use test_helpers::{FakeInstaller, call_log, collection, ids, pkg};

#[test]
fn test_failure_does_not_stop_the_batch() {
    let log = call_log();
    let registry = Registry::empty().with(PackageType::Brew, FakeInstaller::new(&log).failing("b"));
    let orchestrator = Orchestrator::new(registry);
    let packages = collection([
        pkg(PackageType::Brew, "a"),
        pkg(PackageType::Brew, "b"),
        pkg(PackageType::Brew, "c"),
    ]);

    let mut seen = Vec::new();
    let report = orchestrator.install_many(&packages, |item| {
        seen.push((item.index, item.total, item.package.name.clone(), item.is_failure()));
    });

    assert_eq!(
        seen,
        [
            (0, 3, "a".to_string(), false),
            (1, 3, "b".to_string(), true),
            (2, 3, "c".to_string(), false),
        ]
    );
    assert_eq!(
        *log.borrow(),
        ["install brew:a", "install brew:b", "install brew:c"]
    );
    assert_eq!(report.succeeded(), 2);
    assert!(!report.is_success());
    match report.last_error() {
        Some(SyncError::OperationFailed { package, .. }) => assert_eq!(package, "brew:b"),
        other => panic!("unexpected last error: {:?}", other),
    }
}

#[test]
fn test_last_error_is_the_latest_failure() {
    let log = call_log();
    let registry = Registry::empty().with(
        PackageType::Cask,
        FakeInstaller::new(&log).failing("first").failing("second"),
    );
    let orchestrator = Orchestrator::new(registry);
    let packages = collection([
        pkg(PackageType::Cask, "first"),
        pkg(PackageType::Cask, "fine"),
        pkg(PackageType::Cask, "second"),
    ]);

    let report = orchestrator.install_many(&packages, |_| {});
    assert_eq!(report.failures().count(), 2);

    let err = report.into_result().unwrap_err();
    assert!(err.to_string().contains("cask:second"), "{}", err);
}

#[test]
fn test_missing_handler_fails_item_and_continues() {
    let log = call_log();
    let registry = Registry::empty().with(PackageType::Brew, FakeInstaller::new(&log));
    let orchestrator = Orchestrator::new(registry);
    let packages = collection([
        pkg(PackageType::Go, "golang.org/x/tools/gopls"),
        pkg(PackageType::Brew, "git"),
    ]);

    let report = orchestrator.install_many(&packages, |_| {});

    assert!(matches!(
        report.outcomes[0].outcome,
        Outcome::Failed(SyncError::HandlerUnavailable(PackageType::Go))
    ));
    assert!(matches!(report.outcomes[1].outcome, Outcome::Succeeded));
    assert_eq!(*log.borrow(), ["install brew:git"]);
}

#[test]
fn test_unavailable_tool_is_never_invoked() {
    let log = call_log();
    let registry = Registry::empty().with(PackageType::Vscode, FakeInstaller::new(&log).unavailable());
    let orchestrator = Orchestrator::new(registry);
    let packages = collection([pkg(PackageType::Vscode, "rust-lang.rust-analyzer")]);

    let report = orchestrator.install_many(&packages, |_| {});

    assert!(matches!(
        report.last_error(),
        Some(SyncError::HandlerUnavailable(PackageType::Vscode))
    ));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_uninstall_unsupported_is_skipped_not_failed() {
    let log = call_log();
    let registry = Registry::empty()
        .with(PackageType::Mas, FakeInstaller::new(&log).without_uninstall())
        .with(PackageType::Brew, FakeInstaller::new(&log));
    let orchestrator = Orchestrator::new(registry);
    let packages = collection([
        pkg(PackageType::Mas, "497799835"),
        pkg(PackageType::Brew, "htop"),
    ]);

    let report = orchestrator.uninstall_many(&packages, |_| {});

    assert_eq!(report.operation, Operation::Uninstall);
    assert!(matches!(report.outcomes[0].outcome, Outcome::Skipped(_)));
    assert_eq!(report.skipped(), 1);
    assert!(report.is_success());
    assert_eq!(*log.borrow(), ["uninstall brew:htop"]);
}

#[test]
fn test_streaming_lines_reach_the_sink() {
    let log = call_log();
    let registry = Registry::empty()
        .with(PackageType::Brew, FakeInstaller::new(&log).streaming())
        .with(PackageType::Go, FakeInstaller::new(&log));
    let orchestrator = Orchestrator::new(registry);
    let packages = collection([
        pkg(PackageType::Brew, "ripgrep"),
        pkg(PackageType::Go, "github.com/junegunn/fzf"),
    ]);

    let mut lines = Vec::new();
    let mut progress = 0;
    let report = orchestrator.install_many_streaming(
        &packages,
        |_| progress += 1,
        |pkg, line| lines.push(format!("{}: {}", pkg.name, line)),
    );

    assert!(report.is_success());
    assert_eq!(progress, 2);
    assert_eq!(
        lines,
        ["ripgrep: ==> Fetching ripgrep", "ripgrep: ==> Pouring ripgrep"]
    );
}

#[test]
fn test_batch_runs_one_item_per_step() {
    let log = call_log();
    let registry = Registry::empty().with(PackageType::Brew, FakeInstaller::new(&log));
    let orchestrator = Orchestrator::new(registry);
    let packages = collection([
        pkg(PackageType::Brew, "one"),
        pkg(PackageType::Brew, "two"),
        pkg(PackageType::Brew, "three"),
    ]);

    let mut batch = orchestrator.batch(Operation::Install, &packages);
    assert_eq!(batch.len(), 3);

    let first = batch.next().unwrap();
    assert_eq!(first.package.name, "one");
    assert_eq!(*log.borrow(), ["install brew:one"]);
    assert_eq!(batch.len(), 2);

    let rest: Vec<_> = batch.map(|item| item.index).collect();
    assert_eq!(rest, [1, 2]);
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn test_empty_batch() {
    let orchestrator = Orchestrator::new(Registry::empty());
    let mut calls = 0;
    let report = orchestrator.install_many(&PackageCollection::new(), |_| calls += 1);

    assert_eq!(calls, 0);
    assert!(report.outcomes.is_empty());
    assert!(report.into_result().is_ok());
}

#[test]
fn test_list_installed_skips_unavailable_handlers() {
    let log = call_log();
    let registry = Registry::empty()
        .with(
            PackageType::Brew,
            FakeInstaller::new(&log).with_installed([pkg(PackageType::Brew, "git")]),
        )
        .with(
            PackageType::Cask,
            FakeInstaller::new(&log).with_installed([pkg(PackageType::Cask, "wezterm")]),
        )
        .with(
            PackageType::Go,
            FakeInstaller::new(&log)
                .unavailable()
                .with_installed([pkg(PackageType::Go, "gopls")]),
        );
    let orchestrator = Orchestrator::new(registry);

    let installed = orchestrator.list_installed(&PackageType::ALL).unwrap();
    assert_eq!(ids(&installed), ["brew:git", "cask:wezterm"]);

    let only_casks = orchestrator.list_installed(&[PackageType::Cask]).unwrap();
    assert_eq!(ids(&only_casks), ["cask:wezterm"]);
}
