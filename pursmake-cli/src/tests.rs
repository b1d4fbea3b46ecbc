use super::*;
use clap::Parser;
use tempfile::tempdir;

#[test]
fn no_arguments_means_the_default_task() {
    let cli = Cli::try_parse_from(["pursmake"]).expect("parse");

    assert!(cli.tasks.is_empty());
    assert_eq!(cli.root, PathBuf::from("."));
    assert!(cli.config.is_none());
    assert!(cli.purs.is_none());
    assert!(!cli.list);
    assert!(!cli.json);
    assert!(!cli.verbose);
}

#[test]
fn parses_tasks_and_flags() {
    let cli = Cli::try_parse_from([
        "pursmake", "-C", "/proj", "--purs", "psc", "--jobs", "2", "--json", "clean", "build",
    ])
    .expect("parse");

    assert_eq!(cli.tasks, ["clean", "build"]);
    assert_eq!(cli.root, PathBuf::from("/proj"));
    assert_eq!(cli.purs.as_deref(), Some("psc"));
    assert_eq!(cli.jobs, Some(2));
    assert!(cli.json);
}

#[test]
fn list_prints_tasks_with_prerequisites() {
    let cli = Cli::try_parse_from(["pursmake", "--list"]).expect("parse");

    let mut buf = Vec::new();
    execute(cli, &mut buf).expect("execute");

    let text = String::from_utf8(buf).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"build"));
    assert!(lines.contains(&"test (after: build)"));
    assert!(lines.contains(&"default (after: test)"));
    assert!(lines.contains(&"clean"));
    assert!(lines.contains(&"jsvalidate"));
}

#[test]
fn unknown_task_is_an_error() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().display().to_string();
    let cli = Cli::try_parse_from(["pursmake", "-C", root.as_str(), "deploy"]).expect("parse");

    let mut buf = Vec::new();
    let err = execute(cli, &mut buf).expect_err("must fail");
    assert!(format!("{err:#}").contains("unknown task `deploy`"));
}

#[test]
fn missing_explicit_config_is_an_error() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().display().to_string();
    let config = tmp.path().join("nope.toml").display().to_string();
    let cli = Cli::try_parse_from([
        "pursmake",
        "-C",
        root.as_str(),
        "--config",
        config.as_str(),
        "clean",
    ])
    .expect("parse");

    let mut buf = Vec::new();
    let err = execute(cli, &mut buf).expect_err("must fail");
    assert!(format!("{err:#}").contains("config file does not exist"));
}
