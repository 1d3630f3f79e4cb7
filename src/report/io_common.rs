use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use snafu::prelude::*;

use crate::report::{ReportResult, WritingOutputSnafu};

/// A file name for the outputs of a subject. Path separators and characters that are
/// not allowed in file names are replaced with `_`.
pub fn safe_file_stem(subject: &str) -> String {
    let stem: String = subject
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() || stem == "." || stem == ".." {
        "_".to_string()
    } else {
        stem
    }
}

/// A file stem that no previous subject of the run uses. Stems are compared without
/// case; a taken stem gets a `_2`, `_3`, ... suffix.
pub fn unique_file_stem(subject: &str, used: &mut HashSet<String>) -> String {
    let base = safe_file_stem(subject);
    let mut stem = base.clone();
    let mut n = 1;
    while !used.insert(stem.to_lowercase()) {
        n += 1;
        stem = format!("{}_{}", base, n);
    }
    if n > 1 {
        warn!(
            "unique_file_stem: subject {:?}: file name {:?} already used, writing to {:?}",
            subject, base, stem
        );
    }
    stem
}

/// Paths of the configuration are relative to the directory of the configuration file.
pub fn resolve(root: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> ReportResult<()> {
    fs::write(path, bytes).context(WritingOutputSnafu {
        path: path.display().to_string(),
    })
}
