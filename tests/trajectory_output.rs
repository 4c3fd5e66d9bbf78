//! Trajectory file format and failure behaviour of the writer.

use std::fs;

use mcdamp::error::SimError;
use mcdamp::io::{format_sci, read_trajectory, write_trajectory};

/// `d.dddddd E ±dd` as printed by C's `%E`.
fn looks_like_percent_e(field: &str) -> bool {
    let (mantissa, exp) = match field.split_once('E') {
        Some(parts) => parts,
        None => return false,
    };
    let mantissa = mantissa.strip_prefix('-').unwrap_or(mantissa);
    let exp_ok = (exp.starts_with('+') || exp.starts_with('-'))
        && exp.len() >= 3
        && exp[1..].chars().all(|c| c.is_ascii_digit());
    let mant_ok = mantissa.len() == 8
        && mantissa.as_bytes()[1] == b'.'
        && mantissa.chars().filter(|c| *c != '.').all(|c| c.is_ascii_digit());
    exp_ok && mant_ok
}

#[test]
fn lines_are_two_percent_e_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mean.dat");
    let time = vec![0.0, 0.01, 0.02];
    let mean = vec![0.0, 9.98e-4, -1.5e-12];
    write_trajectory(&path, &time, &mean).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "0.000000E+00 0.000000E+00\n1.000000E-02 9.980000E-04\n2.000000E-02 -1.500000E-12\n");
    for line in text.lines() {
        let fields: Vec<_> = line.split_whitespace().collect();
        assert_eq!(fields.len(), 2);
        assert!(fields.iter().all(|f| looks_like_percent_e(f)), "{}", line);
    }

    let (t, y) = read_trajectory(&path).unwrap();
    assert_eq!(t, time);
    assert_eq!(y, mean);
}

#[test]
fn missing_directory_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("mean.dat");
    let err = write_trajectory(&path, &[0.0], &[0.0]).unwrap_err();
    assert!(matches!(err, SimError::Io { .. }));
    assert_eq!(err.exit_code(), 5);
    assert!(!path.exists());
}

#[test]
fn failed_rename_cleans_up_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    // the destination is a non-empty directory, so the final rename fails
    let dest = dir.path().join("occupied");
    fs::create_dir(&dest).unwrap();
    fs::write(dest.join("keep"), b"x").unwrap();

    let err = write_trajectory(&dest, &[0.0, 0.01], &[0.0, 1e-3]).unwrap_err();
    assert!(matches!(err, SimError::Io { .. }));
    assert!(dest.is_dir());
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("occupied")]);
}

#[test]
fn malformed_line_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.dat");
    fs::write(&path, "0.000000E+00 1.0E-03\n1.000000E-02\n").unwrap();
    match read_trajectory(&path) {
        Err(SimError::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn formatting_reference_values() {
    assert_eq!(format_sci(1.99), "1.990000E+00");
    assert_eq!(format_sci(-2.5e-7), "-2.500000E-07");
}

#[test]
fn neighbouring_files_are_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mean.dat");
    let neighbour = dir.path().join("mean.dat.partial");
    fs::write(&neighbour, b"keep me").unwrap();

    write_trajectory(&path, &[0.0], &[0.0]).unwrap();
    assert_eq!(fs::read(&neighbour).unwrap(), b"keep me");

    // a failed write must not remove it either
    let occupied = dir.path().join("occupied");
    fs::create_dir(&occupied).unwrap();
    fs::write(occupied.join("x"), b"x").unwrap();
    assert!(write_trajectory(&occupied, &[0.0], &[0.0]).is_err());
    assert_eq!(fs::read(&neighbour).unwrap(), b"keep me");

    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["mean.dat", "mean.dat.partial", "occupied"]);
}

#[test]
fn mismatched_columns_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mean.dat");
    let err = write_trajectory(&path, &[0.0, 0.01, 0.02], &[0.0, 1.0]).unwrap_err();
    assert!(matches!(err, SimError::Config(_)));
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
