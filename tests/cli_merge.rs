//! `intellimerge merge` driven through the binary.

mod common;
use common::*;

const BASE: &str = "\
import os


def load(path):
    return open(path).read()
";

const SNIPPET: &str = "\
def save(path, text):
    open(path, 'w').write(text)
";

const MERGED: &str = "\
import os


def load(path):
    return open(path).read()


def save(path, text):
    open(path, 'w').write(text)
";

#[test]
fn merge_prints_result_and_leaves_base_alone() {
    let dir = setup_project();
    write(dir.path(), "app.py", BASE);
    write(dir.path(), "snippet.py", SNIPPET);

    let stdout = im_ok(dir.path(), &["merge", "app.py", "snippet.py"]);

    assert_eq!(stdout, MERGED);
    assert_eq!(read(dir.path(), "app.py"), BASE);
}

#[test]
fn merge_in_place_rewrites_base() {
    let dir = setup_project();
    write(dir.path(), "app.py", BASE);
    write(dir.path(), "snippet.py", SNIPPET);

    let args = ["merge", "app.py", "snippet.py", "--in-place"];
    let (stdout, stderr) = assert_ok(&im_in(dir.path(), &args), &args);

    assert!(stdout.is_empty(), "nothing on stdout, got: {stdout}");
    assert!(stderr.contains("Merged snippet into app.py"), "{stderr}");
    assert_eq!(read(dir.path(), "app.py"), MERGED);
}

#[test]
fn merge_reads_snippet_from_stdin() {
    let dir = setup_project();
    write(dir.path(), "app.py", BASE);

    let args = ["merge", "app.py", "-", "--in-place"];
    assert_ok(&im_with_stdin(dir.path(), &args, SNIPPET), &args);

    assert_eq!(read(dir.path(), "app.py"), MERGED);
}

#[test]
fn merge_writes_to_output_path() {
    let dir = setup_project();
    write(dir.path(), "app.py", BASE);
    write(dir.path(), "snippet.py", SNIPPET);

    im_ok(
        dir.path(),
        &["merge", "app.py", "snippet.py", "--output", "merged.py"],
    );

    assert_eq!(read(dir.path(), "merged.py"), MERGED);
    assert_eq!(read(dir.path(), "app.py"), BASE);
}

#[test]
fn merge_replaces_same_named_function() {
    let dir = setup_project();
    write(dir.path(), "app.py", BASE);
    write(
        dir.path(),
        "snippet.py",
        "def load(path):\n    return os.path.getsize(path)\n",
    );

    let stdout = im_ok(dir.path(), &["merge", "app.py", "snippet.py"]);

    assert_eq!(stdout.matches("def load").count(), 1);
    assert!(stdout.contains("os.path.getsize(path)"));
    assert!(!stdout.contains("open(path).read()"));
}

#[test]
fn merge_honours_deletion_marker_in_base() {
    let dir = setup_project();
    write(
        dir.path(),
        "app.py",
        "def old():\n    # delete me\n    return 0\n\n\ndef keep():\n    return 1\n",
    );
    write(dir.path(), "snippet.py", "def new():\n    return 2\n");

    let stdout = im_ok(dir.path(), &["merge", "app.py", "snippet.py"]);

    assert_eq!(
        stdout,
        "def keep():\n    return 1\n\n\ndef new():\n    return 2\n"
    );
}

#[test]
fn merge_in_place_without_changes_says_so() {
    let dir = setup_project();
    write(dir.path(), "app.py", MERGED);
    write(dir.path(), "snippet.py", SNIPPET);

    let args = ["merge", "app.py", "snippet.py", "--in-place"];
    let (_, stderr) = assert_ok(&im_in(dir.path(), &args), &args);

    assert!(stderr.contains("already up to date"), "{stderr}");
    assert_eq!(read(dir.path(), "app.py"), MERGED);
}

#[test]
fn broken_base_is_a_file_level_error_and_untouched() {
    let dir = setup_project();
    write(dir.path(), "app.py", "def f(:\n    pass\n");
    write(dir.path(), "snippet.py", SNIPPET);

    let stderr = im_fails(dir.path(), &["merge", "app.py", "snippet.py", "--in-place"]);

    assert!(stderr.contains("app.py does not parse"), "{stderr}");
    assert!(stderr.contains("left untouched"), "{stderr}");
    assert_eq!(read(dir.path(), "app.py"), "def f(:\n    pass\n");
}

#[test]
fn broken_snippet_fails_without_writing() {
    let dir = setup_project();
    write(dir.path(), "app.py", BASE);
    write(dir.path(), "snippet.py", "def g(:\n");

    let stderr = im_fails(dir.path(), &["merge", "app.py", "snippet.py", "--in-place"]);

    assert!(stderr.contains("snippet does not parse"), "{stderr}");
    assert_eq!(read(dir.path(), "app.py"), BASE);
}

#[test]
fn in_place_and_output_conflict() {
    let dir = setup_project();
    write(dir.path(), "app.py", BASE);
    write(dir.path(), "snippet.py", SNIPPET);

    let stderr = im_fails(
        dir.path(),
        &["merge", "app.py", "snippet.py", "-i", "-o", "x.py"],
    );

    assert!(stderr.contains("cannot be used with"), "{stderr}");
}

#[test]
fn non_python_base_is_refused_and_untouched() {
    let dir = setup_project();
    write(dir.path(), "notes.txt", "plain text\n");
    write(dir.path(), "snippet.py", SNIPPET);

    let stderr = im_fails(dir.path(), &["merge", "notes.txt", "snippet.py", "-i"]);

    assert!(stderr.contains("notes.txt is not a Python source file"), "{stderr}");
    assert_eq!(read(dir.path(), "notes.txt"), "plain text\n");
}

#[test]
fn missing_base_file_is_reported() {
    let dir = setup_project();
    write(dir.path(), "snippet.py", SNIPPET);

    let stderr = im_fails(dir.path(), &["merge", "absent.py", "snippet.py"]);

    assert!(stderr.contains("absent.py"), "{stderr}");
}
