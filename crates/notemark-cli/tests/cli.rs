use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn bin_path() -> PathBuf {
    if let Some(path) = env::var_os("CARGO_BIN_EXE_notemark-cli") {
        return PathBuf::from(path);
    }
    if let Some(path) = env::var_os("CARGO_BIN_EXE_notemark_cli") {
        return PathBuf::from(path);
    }
    let exe = env::current_exe().expect("current exe");
    let mut debug_dir = exe.as_path();
    while let Some(parent) = debug_dir.parent() {
        if parent.file_name().and_then(|name| name.to_str()) == Some("debug") {
            let candidate = parent.join("notemark-cli");
            if candidate.exists() {
                return candidate;
            }
        }
        debug_dir = parent;
    }
    panic!("binary path missing");
}

const VALID_DOC: &str = "---\nNotemark-Version: 1.0\nauthor: Ada\n---\n#* Title\nHello **world**.\n";

fn write_doc(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write doc");
    path
}

#[test]
fn renders_html_to_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_doc(&dir, "doc.nmd", VALID_DOC);
    let output = Command::new(bin_path())
        .args(["--quiet", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<!doctype html>"), "expected HTML page");
    assert!(stdout.contains("<h1>Title</h1>"));
    assert!(stdout.contains("<strong>world</strong>"));
}

#[test]
fn parse_error_reports_line_and_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_doc(
        &dir,
        "bad.nmd",
        "---\nNotemark-Version: 1.0\n---\n#* Title\nBroken **bold.\n",
    );
    let output = Command::new(bin_path())
        .args(["--quiet", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Syntax error on line 5"),
        "expected line number in: {stderr}"
    );
}

#[test]
fn html_flag_writes_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_doc(&dir, "doc.nmd", VALID_DOC);
    let out = dir.path().join("out.html");
    let output = Command::new(bin_path())
        .args([
            "--quiet",
            "--html",
            out.to_str().expect("path"),
            input.to_str().expect("path"),
        ])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    assert!(output.stdout.is_empty(), "expected nothing on stdout");
    let written = fs::read_to_string(&out).expect("read output");
    assert!(written.contains("<h1>Title</h1>"));
}

#[test]
fn css_flag_inlines_stylesheet() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_doc(&dir, "doc.nmd", VALID_DOC);
    let css = dir.path().join("style.css");
    fs::write(&css, "body { color: teal; }").expect("write css");
    let output = Command::new(bin_path())
        .args([
            "--quiet",
            "--css",
            css.to_str().expect("path"),
            input.to_str().expect("path"),
        ])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<style>body { color: teal; }</style>"));
}

#[test]
fn missing_input_is_an_error() {
    let output = Command::new(bin_path())
        .args(["--quiet", "/nowhere/missing.nmd"])
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"), "got: {stderr}");
}

#[test]
fn steps_are_printed_to_stderr() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_doc(&dir, "doc.nmd", VALID_DOC);
    let output = Command::new(bin_path())
        .args([input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Parsing your file..."), "got: {stderr}");
    assert!(stderr.contains("HTML rendering complete."), "got: {stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<!doctype html>"));
}
