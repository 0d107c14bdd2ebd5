//! Integration tests for the CLI
//!
//! Tests the apply, check and list commands against temporary target files

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const OLD_APP: &str = r#"export default function App() {
  useEffect(() => {
    const path = window.location.pathname;
    const radioMatch = path.match(/^\/radio\/([^\/]+)/);
    if (radioMatch) {
      setRadioSlug(radioMatch[1]);
      setIsRadioMode(true);
    }
  }, []);
}
"#;

/// Helper to create a workspace holding one App.tsx
fn setup_target(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("App.tsx");
    fs::write(&target, content).unwrap();
    (dir, target)
}

fn patcher() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_snippet-patcher"));
    cmd.env_remove("SNIPPET_PATCHER_TARGET")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn run(args: &[&str]) -> Output {
    patcher().args(args).output().unwrap()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_apply_help() {
    let output = run(&["apply", "--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Rewrite the target file in place"));
}

#[test]
fn test_apply_basic() {
    let (_dir, target) = setup_target(OLD_APP);

    let output = run(&["apply", path_str(&target)]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("radio-query-param: 1 match(es) rewritten"));
    assert!(stdout.contains("File updated successfully!"));

    let content = fs::read_to_string(&target).unwrap();
    assert!(content.contains("new URLSearchParams(window.location.search)"));
    assert!(!content.contains("window.location.pathname"));
}

#[test]
fn test_apply_idempotent() {
    let (_dir, target) = setup_target(OLD_APP);

    let first = run(&["apply", path_str(&target)]);
    assert!(first.status.success());
    let after_first = fs::read_to_string(&target).unwrap();

    let second = run(&["apply", path_str(&target)]);
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("no match"));
    assert!(stdout.contains("File updated successfully!"));

    assert_eq!(fs::read_to_string(&target).unwrap(), after_first);
}

#[test]
fn test_apply_no_match_error_policy() {
    let (_dir, target) = setup_target("const unrelated = true;\n");

    let output = run(&["apply", "--on-no-match", "error", path_str(&target)]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CONFLICT"));
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        "const unrelated = true;\n"
    );
}

#[test]
fn test_apply_dry_run_with_diff() {
    let (_dir, target) = setup_target(OLD_APP);

    let output = run(&["apply", "--dry-run", "--diff", path_str(&target)]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DRY RUN"));
    assert!(stdout.contains("+++"));
    assert!(stdout.contains("1 match(es) would be rewritten"));
    assert!(!stdout.contains("File updated successfully!"));
    assert_eq!(fs::read_to_string(&target).unwrap(), OLD_APP);
}

#[test]
fn test_apply_missing_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("missing.tsx");

    let output = run(&["apply", path_str(&target)]);

    assert!(!output.status.success());
    assert!(!target.exists());
}

#[test]
fn test_apply_target_from_env() {
    let (_dir, target) = setup_target(OLD_APP);

    let output = patcher()
        .env("SNIPPET_PATCHER_TARGET", &target)
        .arg("apply")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(fs::read_to_string(&target)
        .unwrap()
        .contains("params.get('radio')"));
}

#[test]
fn test_apply_without_target() {
    let output = run(&["apply"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No target file given"));
}

#[test]
fn test_apply_with_rule_directory() {
    let (dir, target) = setup_target("let answer = 41;\n");
    let rules_dir = dir.path().join("rules");
    fs::create_dir(&rules_dir).unwrap();
    fs::write(
        rules_dir.join("answer.toml"),
        r#"[[rules]]
id = "fix-answer"
pattern = 'answer = \d+;'
replacement = "answer = 42;"
"#,
    )
    .unwrap();

    let output = run(&[
        "apply",
        "--rules",
        path_str(&rules_dir),
        path_str(&target),
    ]);

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&target).unwrap(), "let answer = 42;\n");
}

/// Helper to write one rule set into `<dir>/rules/<name>`
fn write_rule_set(dir: &Path, name: &str, body: &str) -> PathBuf {
    let rules_dir = dir.join("rules");
    fs::create_dir_all(&rules_dir).unwrap();
    fs::write(rules_dir.join(name), body).unwrap();
    rules_dir
}

const STRICT_RULE_SET: &str = r#"[meta]
on_no_match = "error"

[[rules]]
id = "fix-answer"
pattern = 'answer = \d+;'
replacement = "answer = 42;"
"#;

#[test]
fn test_apply_uses_rule_set_policy() {
    let (dir, target) = setup_target("let question = 6 * 7;\n");
    let rules_dir = write_rule_set(dir.path(), "strict.toml", STRICT_RULE_SET);

    let output = run(&["apply", "--rules", path_str(&rules_dir), path_str(&target)]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fix-answer"));
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        "let question = 6 * 7;\n"
    );
}

#[test]
fn test_apply_flag_overrides_rule_set_policy() {
    let (dir, target) = setup_target("let question = 6 * 7;\n");
    let rules_dir = write_rule_set(dir.path(), "strict.toml", STRICT_RULE_SET);

    let output = run(&[
        "apply",
        "--on-no-match",
        "ignore",
        "--rules",
        path_str(&rules_dir),
        path_str(&target),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("no match"));
    assert!(stdout.contains("File updated successfully!"));
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        "let question = 6 * 7;\n"
    );
}

#[test]
fn test_apply_rejects_rule_id_shared_across_files() {
    let (dir, target) = setup_target("x\n");
    write_rule_set(dir.path(), "a.toml", "[[rules]]\nid = \"r\"\npattern = \"x\"\n");
    let rules_dir = write_rule_set(
        dir.path(),
        "b.toml",
        "[[rules]]\nid = \"r\"\npattern = \"zzz\"\n",
    );

    let output = run(&["apply", "--rules", path_str(&rules_dir), path_str(&target)]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("rule id 'r' is declared in both"));
    assert_eq!(fs::read_to_string(&target).unwrap(), "x\n");
}

#[test]
fn test_check_reports_without_writing() {
    let (_dir, target) = setup_target(OLD_APP);

    let output = run(&["check", path_str(&target)]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("radio-query-param: 1 match(es)"));
    assert_eq!(fs::read_to_string(&target).unwrap(), OLD_APP);
}

#[test]
fn test_check_fails_when_unmatched() {
    let (_dir, target) = setup_target("nothing here\n");

    let output = run(&["check", path_str(&target)]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("radio-query-param: no match"));
}

#[test]
fn test_list_builtin() {
    let output = run(&["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("radio-query-param"));
    assert!(stdout.contains("window"));
}
