use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use assert_fs::prelude::*;

fn memwrap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_memwrap"))
}

fn run_with_answer(dir: &Path, answer: &str) -> std::process::Output {
    let mut child = memwrap()
        .args(["--dir", dir.to_str().unwrap()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(answer.as_bytes())
        .unwrap();

    child.wait_with_output().unwrap()
}

#[test]
fn cli_rewrites_calls_and_creates_backups() {
    let temp = assert_fs::TempDir::new().unwrap();
    let original = "void free(Foo *f) {\n}\nvoid drop_foo(Foo *f) {\n    FREE(f->name);\n    free(f);\n}\n";
    temp.child("foo.c").write_str(original).unwrap();

    let output = memwrap()
        .args(["--dir", temp.path().to_str().unwrap(), "--yes"])
        .output()
        .unwrap();

    assert!(output.status.success());

    let rewritten = fs::read_to_string(temp.child("foo.c").path()).unwrap();
    assert!(rewritten.contains("void free(Foo *f) {"));
    assert!(rewritten.contains("SAFE_FREE(f->name);"));
    assert!(rewritten.contains("SAFE_FREE(f);"));
    assert!(!rewritten.contains("free(f);"));

    let backup = fs::read_to_string(temp.child("foo.c.bak").path()).unwrap();
    assert_eq!(backup, original);

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Summary:"));
    assert!(stdout.contains("Backup files created with .bak extension"));
}

#[test]
fn cli_reports_malloc_for_manual_review() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("alloc.c")
        .write_str("char *p = malloc(len + 1);\n")
        .unwrap();

    let output = memwrap()
        .args(["--dir", temp.path().to_str().unwrap(), "--yes"])
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("1 malloc() call(s) need manual review"));
    assert!(stdout.contains("Line 1: char *p = malloc(len + 1);"));
    assert!(stdout.contains("ptr = malloc(size)  -->  ptr = safe_malloc(size, __FILE__, __LINE__)"));

    // Advisory only: nothing was rewritten, so nothing was written.
    assert!(!temp.child("alloc.c.bak").path().exists());
}

#[test]
fn cli_skips_declaration_files_and_deep_nesting() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("top.c").write_str("FREE(a);\n").unwrap();
    temp.child("sub/one.c").write_str("FREE(b);\n").unwrap();
    temp.child("sub/defs.h").write_str("FREE(c);\n").unwrap();
    temp.child("sub/deep/two.c").write_str("FREE(d);\n").unwrap();

    let output = memwrap()
        .args(["--dir", temp.path().to_str().unwrap(), "--yes"])
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Total: 2 .c files to process"));

    assert_eq!(
        fs::read_to_string(temp.child("sub/defs.h").path()).unwrap(),
        "FREE(c);\n"
    );
    assert_eq!(
        fs::read_to_string(temp.child("sub/deep/two.c").path()).unwrap(),
        "FREE(d);\n"
    );
    assert!(fs::read_to_string(temp.child("top.c").path())
        .unwrap()
        .contains("SAFE_FREE(a);"));
}

#[test]
fn cli_declined_prompt_aborts_without_side_effects() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.c").write_str("FREE(a);\n").unwrap();

    let output = run_with_answer(temp.path(), "no\n");

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Proceed with replacements? (yes/no): "));
    assert!(stdout.contains("Aborted."));

    assert_eq!(
        fs::read_to_string(temp.child("a.c").path()).unwrap(),
        "FREE(a);\n"
    );
    assert!(!temp.child("a.c.bak").path().exists());
}

#[test]
fn cli_accepts_short_affirmative_answer() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.c").write_str("FREE(a);\n").unwrap();

    let output = run_with_answer(temp.path(), "y\n");

    assert!(output.status.success());
    assert!(fs::read_to_string(temp.child("a.c").path())
        .unwrap()
        .contains("SAFE_FREE(a);"));
}

#[test]
fn cli_fails_when_no_source_files_exist() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("notes.txt").write_str("nothing").unwrap();

    let output = memwrap()
        .args(["--dir", temp.path().to_str().unwrap(), "--yes"])
        .output()
        .unwrap();

    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("No .c files found"));
}

#[test]
fn cli_dry_run_reports_without_writing() {
    let temp = assert_fs::TempDir::new().unwrap();
    let original = "FREE(a);\np = malloc(4);\n";
    temp.child("a.c").write_str(original).unwrap();

    let output = memwrap()
        .args(["--dir", temp.path().to_str().unwrap(), "--yes", "--dry-run"])
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Would modify (dry run)"));
    assert!(stdout.contains("No files were written (dry run)"));

    assert_eq!(
        fs::read_to_string(temp.child("a.c").path()).unwrap(),
        original
    );
    assert!(!temp.child("a.c.bak").path().exists());
}

#[test]
fn cli_second_run_reports_no_changes() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.c").write_str("FREE(a);\nfree(b);\n").unwrap();

    let first = memwrap()
        .args(["--dir", temp.path().to_str().unwrap(), "--yes"])
        .output()
        .unwrap();
    assert!(first.status.success());

    let after_first = fs::read_to_string(temp.child("a.c").path()).unwrap();

    let second = memwrap()
        .args(["--dir", temp.path().to_str().unwrap(), "--yes"])
        .output()
        .unwrap();
    assert!(second.status.success());

    let stdout = String::from_utf8(second.stdout).unwrap();
    assert!(stdout.contains("No changes needed"));
    assert_eq!(
        fs::read_to_string(temp.child("a.c").path()).unwrap(),
        after_first
    );
}
