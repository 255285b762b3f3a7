use closure_deps::core::scanner::FileScanner;
use std::fs;
use std::path::Path;

fn touch<P: AsRef<Path>>(p: P) {
    fs::write(p, "// test").unwrap();
}

#[test]
fn scanner_filters_by_extension_and_sorts() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("b")).unwrap();

    touch(root.join("b/app.js"));
    touch(root.join("a/lib.js"));
    touch(root.join("a/UPPER.JS"));
    touch(root.join("a/types.ts"));
    touch(root.join("b/readme.txt")); // ignored

    let scanner = FileScanner::new();
    let files = scanner.scan(root, &["js"]).unwrap();

    let names: Vec<_> = files
        .iter()
        .map(|f| f.strip_prefix(root).unwrap().to_str().unwrap().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["a/UPPER.JS", "a/lib.js", "b/app.js"]);

    let files = scanner.scan(root, &["js", "ts"]).unwrap();
    assert_eq!(files.len(), 4);
}

#[test]
fn scanner_returns_single_file_input() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("only.txt");
    touch(&file);

    let files = FileScanner::new().scan(&file, &["js"]).unwrap();
    assert_eq!(files, vec![file]);
}

#[test]
fn scanner_fails_on_missing_input() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(FileScanner::new()
        .scan(&dir.path().join("missing"), &["js"])
        .is_err());
}
