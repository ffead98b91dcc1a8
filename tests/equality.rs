//! Integration tests for windowed file content comparison.

use mmap_eq::{contents_equal, ContentComparator, IoPhase, MmapEqError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn small_window() -> ContentComparator {
    // A 4 KiB ceiling makes multi-window behavior testable without
    // gigabyte fixtures.
    ContentComparator::with_max_window(4096).expect("comparator")
}

#[test]
fn reflexivity() {
    let dir = TempDir::new().expect("tempdir");
    let a = write_file(&dir, "a.bin", b"some file contents");
    assert!(contents_equal(&a, &a).expect("compare"));
}

#[test]
fn identical_copies_compare_equal_symmetrically() {
    let dir = TempDir::new().expect("tempdir");
    let contents = vec![0x61u8; 20_000];
    let a = write_file(&dir, "a.bin", &contents);
    let b = write_file(&dir, "b.bin", &contents);

    assert!(small_window().contents_equal(&a, &b).expect("a vs b"));
    assert!(small_window().contents_equal(&b, &a).expect("b vs a"));
}

#[test]
fn zero_length_files_are_equal() {
    let dir = TempDir::new().expect("tempdir");
    let a = write_file(&dir, "a.bin", b"");
    let b = write_file(&dir, "b.bin", b"");
    assert!(contents_equal(&a, &b).expect("compare"));
}

#[test]
fn differing_sizes_short_circuit_to_not_equal() {
    let dir = TempDir::new().expect("tempdir");
    let a = write_file(&dir, "a.bin", &vec![0x61u8; 10_000]);
    let b = write_file(&dir, "b.bin", &vec![0x61u8; 10_001]);
    assert!(!contents_equal(&a, &b).expect("compare"));
}

#[test]
fn single_byte_divergence_is_detected_anywhere() {
    let dir = TempDir::new().expect("tempdir");
    let reference = vec![0x61u8; 20_000];
    let a = write_file(&dir, "a.bin", &reference);

    for &at in &[0usize, 10_000, 19_999] {
        let mut diverged = reference.clone();
        diverged[at] = 0x62;
        let b = write_file(&dir, &format!("b_{at}.bin"), &diverged);
        assert!(
            !small_window().contents_equal(&a, &b).expect("compare"),
            "divergence at byte {at} not detected"
        );
        assert!(
            !small_window().contents_equal(&b, &a).expect("compare"),
            "divergence at byte {at} not detected in reverse order"
        );
    }
}

#[test]
fn exact_window_multiple_and_one_past_it() {
    let dir = TempDir::new().expect("tempdir");
    let cmp = small_window();

    // Size an exact multiple of the window ceiling.
    let exact = vec![0x5au8; 3 * 4096];
    let a = write_file(&dir, "exact_a.bin", &exact);
    let b = write_file(&dir, "exact_b.bin", &exact);
    assert!(cmp.contents_equal(&a, &b).expect("exact multiple"));

    // One byte past the multiple: the final window holds a single byte.
    let mut longer = exact.clone();
    longer.push(0x5a);
    let c = write_file(&dir, "long_c.bin", &longer);
    let d = write_file(&dir, "long_d.bin", &longer);
    assert!(cmp.contents_equal(&c, &d).expect("multiple plus one"));

    // Divergence confined to that trailing one-byte window.
    let mut trailing = longer.clone();
    *trailing.last_mut().expect("last byte") = 0x5b;
    let e = write_file(&dir, "long_e.bin", &trailing);
    assert!(!cmp.contents_equal(&c, &e).expect("trailing divergence"));
}

#[test]
fn directory_is_rejected_before_any_open() {
    let dir = TempDir::new().expect("tempdir");
    let a = write_file(&dir, "a.bin", b"contents");

    let err = contents_equal(dir.path(), Path::new(&a)).unwrap_err();
    assert!(matches!(err, MmapEqError::NotRegularFile(ref p) if p.as_path() == dir.path()));

    // The regular-file argument is also validated when it comes second.
    let err = contents_equal(&a, &dir.path().to_path_buf()).unwrap_err();
    assert!(matches!(err, MmapEqError::NotRegularFile(_)));
}

#[test]
fn missing_file_surfaces_metadata_phase() {
    let dir = TempDir::new().expect("tempdir");
    let a = write_file(&dir, "a.bin", b"contents");
    let missing = dir.path().join("nope.bin");

    let err = contents_equal(&a, &missing).unwrap_err();
    match err {
        MmapEqError::Io { path, phase, .. } => {
            assert_eq!(path, missing);
            assert_eq!(phase, IoPhase::Metadata);
        }
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn identical_prefix_different_content_across_windows() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new().expect("tempdir");

    // Divergence only in the third window; the first two must match and
    // advance the position correctly.
    let mut left = vec![0x10u8; 5 * 4096];
    let right = left.clone();
    left[2 * 4096 + 7] = 0x11;
    let a = write_file(&dir, "a.bin", &left);
    let b = write_file(&dir, "b.bin", &right);
    assert!(!small_window().contents_equal(&a, &b).expect("compare"));
}
