//! Two-column trajectory files.
//!
//! One line per sample, `time mean\n`, no header. Numbers are printed like C's
//! `%E`: one leading digit, six decimals, uppercase `E` and a signed exponent
//! of at least two digits (`1.000000E-02`).
//!
//! Files are written to a uniquely named temporary file in the destination
//! directory and renamed into place, so a failed write never leaves a partial
//! file at the destination and never touches other files there.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::SimError;

/// Format `x` the way C's `printf("%E", x)` does.
pub fn format_sci(x: f64) -> String {
    if x.is_nan() {
        return "NAN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "INF".to_string() } else { "-INF".to_string() };
    }
    let s = format!("{:.6E}", x);
    match s.split_once('E') {
        Some((mantissa, exp)) => {
            let e: i32 = exp.parse().unwrap_or(0);
            let sign = if e < 0 { '-' } else { '+' };
            format!("{mantissa}E{sign}{:02}", e.abs())
        }
        None => s,
    }
}

/// Write `time` and `mean` side by side to `path`.
pub fn write_trajectory(path: &Path, time: &[f64], mean: &[f64]) -> Result<(), SimError> {
    if time.len() != mean.len() {
        return Err(SimError::Config(format!(
            "time vector has {} samples but the mean has {}",
            time.len(),
            mean.len()
        )));
    }
    let io_err = |source| SimError::Io { path: path.to_path_buf(), source };

    // unique sibling name; removed on drop unless persisted
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".mcdamp-")
        .suffix(".partial")
        .tempfile_in(dir)
        .map_err(io_err)?;

    let mut w = BufWriter::new(tmp);
    for (t, y) in time.iter().zip(mean) {
        writeln!(w, "{} {}", format_sci(*t), format_sci(*y)).map_err(io_err)?;
    }
    let tmp = w.into_inner().map_err(|e| io_err(e.into_error()))?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Parse a trajectory file back into `(time, mean)`.
pub fn read_trajectory(path: &Path) -> Result<(Vec<f64>, Vec<f64>), SimError> {
    let file = File::open(path).map_err(|source| SimError::Io { path: path.to_path_buf(), source })?;
    let mut time = Vec::new();
    let mut mean = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| SimError::Io { path: path.to_path_buf(), source })?;
        let parse_err = |reason: String| SimError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
        };
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(parse_err(format!("expected 2 fields, found {}", fields.len())));
        }
        let t: f64 = fields[0].parse().map_err(|e| parse_err(format!("time: {e}")))?;
        let y: f64 = fields[1].parse().map_err(|e| parse_err(format!("mean: {e}")))?;
        time.push(t);
        mean.push(y);
    }
    Ok((time, mean))
}
