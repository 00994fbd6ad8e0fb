//! Run-artifact enumeration
//!
//! All run artifacts live flat in one directory as
//! `Snapward-Date<token>.<log|err|digest>`. The `.log`/`.err`/`.digest`
//! files sharing one token form one group: the run, not the file, is the
//! unit of retention.

use retention::extract_artifact_token;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Group artifact files by their run token; foreign files are ignored
pub fn group_by_run_token(dir: &Path) -> std::io::Result<BTreeMap<String, Vec<PathBuf>>> {
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(token) = extract_artifact_token(name) {
            groups.entry(token.to_string()).or_default().push(entry.path());
        }
    }

    Ok(groups)
}

/// Newest artifact with the given extension, judged by run token
///
/// The token is fixed-width, so lexical order is chronological order; no
/// filesystem timestamps are consulted.
pub fn newest_with_extension(dir: &Path, ext: &str) -> Option<PathBuf> {
    let groups = group_by_run_token(dir).ok()?;

    groups
        .iter()
        .rev()
        .flat_map(|(_, files)| files.iter())
        .find(|path| path.extension().is_some_and(|e| e == ext))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_groups_triples_by_token() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Snapward-Date-2024-01-01_00_00_00.log");
        touch(dir.path(), "Snapward-Date-2024-01-01_00_00_00.err");
        touch(dir.path(), "Snapward-Date-2024-01-01_00_00_00.digest");
        touch(dir.path(), "Snapward-Date-2024-01-02_00_00_00.log");
        touch(dir.path(), "unrelated.txt");

        let groups = group_by_run_token(dir.path()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["2024-01-01_00_00_00"].len(), 3);
        assert_eq!(groups["2024-01-02_00_00_00"].len(), 1);
    }

    #[test]
    fn test_groups_tolerate_both_date_spellings() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Snapward-Date2024-01-01_00_00_00.log");
        touch(dir.path(), "Snapward-Date-2024-01-01_00_00_00.err");

        let groups = group_by_run_token(dir.path()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["2024-01-01_00_00_00"].len(), 2);
    }

    #[test]
    fn test_newest_by_token_not_by_mtime() {
        let dir = tempfile::tempdir().unwrap();
        // Written newest-token first; token order must still win
        touch(dir.path(), "Snapward-Date-2024-03-01_12_00_00.log");
        touch(dir.path(), "Snapward-Date-2024-01-01_00_00_00.log");
        touch(dir.path(), "Snapward-Date-2024-02-01_00_00_00.err");

        let newest_log = newest_with_extension(dir.path(), "log").unwrap();
        assert!(newest_log.ends_with("Snapward-Date-2024-03-01_12_00_00.log"));

        let newest_err = newest_with_extension(dir.path(), "err").unwrap();
        assert!(newest_err.ends_with("Snapward-Date-2024-02-01_00_00_00.err"));

        assert_eq!(newest_with_extension(dir.path(), "digest"), None);
    }
}
