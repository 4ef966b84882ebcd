// End-to-end workflows over real files in a temporary config directory
// Installers are faked; manifests, config and history are real

mod test_helpers;

use brewsync::config::CONFIG_FILE;
use brewsync::history::{self, HISTORY_FILE, HistoryEntry};
use brewsync::{
    Config, Orchestrator, PackageType, Registry, SyncMode, diff, manifest,
};
use std::fs;
use tempfile::TempDir;
use test_helpers::{FakeInstaller, call_log, collection, ids, pkg};

const MINI: &str = r#"# Terminal
tap "homebrew/cask-fonts"
brew "git"
# Fast grep
brew "ripgrep"
brew "ollama"
cask "wezterm"
cask "docker"
vscode "rust-lang.rust-analyzer"
mas "Xcode", id: 497799835
"#;

const AIR: &str = r#"brew "git"
brew "htop"
cask "wezterm"
mas "Xcode", id: 497799835
"#;

fn setup() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("Brewfile.mini"), MINI).unwrap();
    fs::write(root.join("Brewfile.air"), AIR).unwrap();

    let yaml = format!(
        r#"
current_machine: air
default_source: mini
machines:
  mini:
    brewfile: {root}/Brewfile.mini
  air:
    brewfile: {root}/Brewfile.air
ignore:
  global:
    categories: [vscode]
  machines:
    air:
      packages: ["cask:docker"]
machine_specific:
  mini: ["brew:ollama"]
  air: ["brew:htop"]
"#,
        root = root.display()
    );
    fs::write(root.join(CONFIG_FILE), yaml).unwrap();

    let config = Config::load_from(&root.join(CONFIG_FILE)).unwrap();
    (dir, config)
}

#[test]
fn test_import_plan_from_manifests() {
    let (_dir, config) = setup();
    let target = config.current_machine().unwrap();
    let source = config.source_machine(None).unwrap();

    let wanted = manifest::read(&config.brewfile_path(&source).unwrap()).unwrap();
    let current = manifest::read(&config.brewfile_path(&target).unwrap()).unwrap();

    let planner = brewsync::Planner::new(&config.ignore, &config.machine_specific);
    let plan = planner.plan(&target, &wanted, &current, SyncMode::Mirror);

    assert_eq!(ids(&plan.to_install), ["tap:homebrew/cask-fonts", "brew:ripgrep"]);
    assert_eq!(ids(&plan.skipped_ignored), ["cask:docker", "vscode:rust-lang.rust-analyzer"]);
    assert_eq!(ids(&plan.skipped_machine_specific), ["brew:ollama"]);
    assert_eq!(ids(&plan.protected), ["brew:htop"]);
    assert!(plan.to_remove.is_empty());
    assert_eq!(plan.unchanged, 3);
}

#[test]
fn test_import_runs_plan_through_orchestrator() {
    let (dir, config) = setup();
    let wanted = manifest::read(&config.brewfile_path("mini").unwrap()).unwrap();
    let log = call_log();
    let installed_now = [pkg(PackageType::Brew, "git"), pkg(PackageType::Brew, "htop")];

    let orchestrator = Orchestrator::new(
        Registry::empty()
            .with(PackageType::Tap, FakeInstaller::new(&log))
            .with(
                PackageType::Brew,
                FakeInstaller::new(&log).with_installed(installed_now).failing("ripgrep"),
            ),
    );
    let current = orchestrator
        .list_installed(&[PackageType::Tap, PackageType::Brew])
        .unwrap();
    let plan = brewsync::Planner::new(&config.ignore, &config.machine_specific).plan(
        "air",
        &wanted.filter(&[PackageType::Tap, PackageType::Brew]),
        &current,
        SyncMode::Additive,
    );

    let report = orchestrator.install_many(&plan.to_install, |_| {});
    assert_eq!(report.succeeded(), 1);
    assert!(
        log.borrow()
            .iter()
            .any(|call| call == "install tap:homebrew/cask-fonts")
    );

    let history_path = dir.path().join(HISTORY_FILE);
    history::append(
        &history_path,
        &HistoryEntry::now("air", "import", format!("{} installed", report.succeeded())),
    )
    .unwrap();
    assert!(report.into_result().is_err());

    let entries = history::read(&history_path, 5).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].summary, "1 installed");
}

#[test]
fn test_dump_keeps_descriptions_and_titles() {
    let (dir, config) = setup();
    let path = config.brewfile_path("mini").unwrap();
    let mut previous = manifest::read(&path).unwrap();
    previous.merge_unique(&manifest::parse(
        "tap \"me/private\", \"git@example.com:me/private.git\"\nbrew \"mpv\", link: false\n",
    ));

    // What the tools report: no descriptions, options or App Store titles
    let mut installed = collection([
        pkg(PackageType::Tap, "me/private"),
        pkg(PackageType::Brew, "ripgrep"),
        pkg(PackageType::Brew, "bat"),
        pkg(PackageType::Brew, "mpv"),
        pkg(PackageType::Mas, "497799835"),
    ]);
    installed.annotate_from(&previous);

    let out = dir.path().join("dump").join("Brewfile.mini");
    manifest::write_with_header(&out, &installed, Some("Brewfile for mini")).unwrap();

    let content = fs::read_to_string(&out).unwrap();
    assert!(content.starts_with("# Brewfile for mini\n\n"));
    assert!(content.contains("# Fast grep\nbrew \"ripgrep\"\n"));
    assert!(content.contains("mas \"Xcode\", id: 497799835"));
    assert!(content.contains("tap \"me/private\", \"git@example.com:me/private.git\"\n"));
    assert!(content.contains("brew \"mpv\", link: false\n"));

    let reread = manifest::read(&out).unwrap();
    assert!(reread.set_eq(&installed));
    assert_eq!(reread.get("brew:bat").unwrap().description, "");
    assert_eq!(reread.get("mas:497799835").unwrap().display_name(), "Xcode");
    assert_eq!(reread.get("brew:mpv").unwrap().option("link"), Some("false"));
}

#[test]
fn test_machine_manifests_diff() {
    let (_dir, config) = setup();
    let mini = manifest::read(&config.brewfile_path("mini").unwrap()).unwrap();
    let air = manifest::read(&config.brewfile_path("air").unwrap()).unwrap();

    let result = diff(&mini, &air);
    assert_eq!(ids(&result.removals), ["brew:htop"]);
    assert_eq!(result.additions.len(), 5);
    assert_eq!(result.common.len(), 3);

    let counts = result.counts_by_type();
    assert_eq!(counts[&PackageType::Brew], (2, 1));
    assert_eq!(counts[&PackageType::Cask], (1, 0));
}

#[test]
fn test_ignore_rules_persist() {
    let (dir, mut config) = setup();
    let path = dir.path().join(CONFIG_FILE);

    config.ignore.layer_mut(None).packages.insert("brew:ripgrep".to_string());
    config.ignore.layer_mut(Some("air")).packages.remove("cask:docker");
    config.ignore.prune();
    config.save_to(&path).unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert!(reloaded.ignore.global.packages.contains("brew:ripgrep"));
    assert!(!reloaded.ignore.machines.contains_key("air"));
    assert!(brewsync::is_ignored(
        "mini",
        &pkg(PackageType::Brew, "ripgrep"),
        &reloaded.ignore
    ));
}
