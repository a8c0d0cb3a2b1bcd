//! File and directory naming

use std::path::{Path, PathBuf};

/// Characters that are not allowed in file names on common filesystems
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make `name` usable as a single path component.
///
/// Reserved and control characters become `_`, surrounding whitespace
/// and trailing dots are removed. An empty result becomes `_`.
pub fn safe_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim().trim_end_matches('.').trim_end();
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Directory name of chapter `number`, e.g. `0007 - The Return`.
pub fn chapter_dir_name(number: u32, title: &str) -> String {
    format!("{:04} - {}", number, safe_file_name(title))
}

/// Integer value of a file stem (`12.png` is 12).
pub fn numeric_stem(path: &Path) -> Option<u32> {
    path.file_stem()?.to_str()?.parse().ok()
}

/// Keep only paths with a numeric stem, ordered by that number.
pub fn sort_by_numeric_stem<I>(paths: I) -> Vec<(u32, PathBuf)>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut numbered: Vec<(u32, PathBuf)> = paths
        .into_iter()
        .filter_map(|p| numeric_stem(&p).map(|n| (n, p)))
        .collect();
    numbered.sort_by_key(|(n, _)| *n);
    numbered
}
