use super::*;
use std::fs;
use std::io::Cursor;

#[test]
fn binary_detection_resets_position() {
    let mut text = Cursor::new(b"fn main() {}\n".to_vec());
    assert!(!is_binary_reader(&mut text).unwrap());
    assert_eq!(text.position(), 0);

    let mut bin = Cursor::new(vec![0x7f, b'E', 0, 1]);
    assert!(is_binary_reader(&mut bin).unwrap());
}

#[test]
fn counts_non_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.rs"), "fn a() {\n\n    1\n}\n   \n").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/b.py"), "x = 1\ny = 2").unwrap();
    let loc = LinesOfCode.size(dir.path()).unwrap();
    assert_eq!(loc, 5.0);
}

#[test]
fn skips_binary_and_git_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("blob.bin"), [0u8, 1, 2, b'\n', 3]).unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    fs::write(dir.path().join(".git/config"), "[core]\n").unwrap();
    fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();
    assert_eq!(LinesOfCode.size(dir.path()).unwrap(), 1.0);
}

#[test]
fn missing_root_is_an_error() {
    let err = LinesOfCode.size(Path::new("/no/such/project")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
