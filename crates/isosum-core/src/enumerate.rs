//! Candidate file discovery.
//!
//! Lists the immediate children of a directory (no recursion) and keeps the
//! regular files whose extension matches the target case-insensitively.
//! Symlinks are followed: a link to a regular file is a candidate, a link to
//! a directory or a dangling link is skipped. Result order is whatever the
//! platform's directory listing yields.
//!
//! Only the last extension of a file name is compared (`image.tar.gz` has
//! extension `gz`), so filters with more than one part such as `.tar.gz`
//! are rejected rather than silently matching nothing.

use std::fs;
use std::path::Path;

use crate::error::ScanError;
use crate::task::FileTask;

/// Default extension filter.
pub const DEFAULT_EXTENSION: &str = ".iso";

/// Normalize an extension filter: strip one leading dot and lowercase.
/// `".ISO"`, `"iso"` and `"Iso"` all become `"iso"`. Empty and multi-part
/// filters are rejected.
pub fn normalize_extension(ext: &str) -> Result<String, ScanError> {
    let bare = ext.strip_prefix('.').unwrap_or(ext);
    if bare.is_empty() || bare.contains('.') {
        return Err(ScanError::InvalidExtension {
            extension: ext.to_string(),
        });
    }
    Ok(bare.to_lowercase())
}

/// Whether `path` has the (already normalized) extension `target`.
pub fn has_extension(path: &Path, target: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase() == target)
        .unwrap_or(false)
}

/// List candidate files in `dir` whose extension matches `extension`.
///
/// Fails with `NotADirectory` when `dir` does not resolve to an existing
/// directory. A valid directory with no matches yields an empty vector.
pub fn enumerate(dir: &Path, extension: &str) -> Result<Vec<FileTask>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    let target = normalize_extension(extension)?;

    let entries = fs::read_dir(dir).map_err(|source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut tasks = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if !has_extension(&path, &target) {
            continue;
        }
        // fs::metadata follows symlinks.
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => tasks.push(FileTask::new(path, meta.len())),
            Ok(_) => tracing::debug!("skipping non-regular entry {}", path.display()),
            Err(e) => tracing::debug!("skipping {}: {}", path.display(), e),
        }
    }

    tracing::debug!(
        "found {} candidate file(s) with extension .{} in {}",
        tasks.len(),
        target,
        dir.display()
    );
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn names(tasks: &[FileTask]) -> BTreeSet<String> {
        tasks.iter().map(|t| t.file_name()).collect()
    }

    #[test]
    fn normalize_strips_dot_and_lowercases() {
        assert_eq!(normalize_extension(".ISO").unwrap(), "iso");
        assert_eq!(normalize_extension("iso").unwrap(), "iso");
        assert_eq!(normalize_extension("Img").unwrap(), "img");
    }

    #[test]
    fn normalize_rejects_multi_part_and_empty() {
        for bad in [".tar.gz", "tar.gz", "", ".", ".."] {
            assert!(
                matches!(
                    normalize_extension(bad),
                    Err(ScanError::InvalidExtension { .. })
                ),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn multi_part_filter_is_an_error_not_zero_matches() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("z.tar.gz"), b"x").unwrap();
        let err = enumerate(dir.path(), ".tar.gz").unwrap_err();
        assert!(matches!(err, ScanError::InvalidExtension { .. }));

        let tasks = enumerate(dir.path(), "gz").unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn filters_by_extension_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.iso"), b"aaaa").unwrap();
        fs::write(dir.path().join("B.ISO"), b"").unwrap();
        fs::write(dir.path().join("c.Iso"), b"c").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("iso"), b"x").unwrap();
        fs::write(dir.path().join(".iso"), b"x").unwrap();
        fs::write(dir.path().join("image.iso.part"), b"x").unwrap();

        let tasks = enumerate(dir.path(), ".iso").unwrap();
        assert_eq!(tasks.len(), 3);
        let expected: BTreeSet<String> = ["a.iso", "B.ISO", "c.Iso"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names(&tasks), expected);

        let a = tasks.iter().find(|t| t.file_name() == "a.iso").unwrap();
        assert_eq!(a.size, 4);
    }

    #[test]
    fn does_not_recurse_or_match_directories() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("nested.iso");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("inner.iso"), b"x").unwrap();
        fs::write(dir.path().join("top.iso"), b"x").unwrap();

        let tasks = enumerate(dir.path(), "iso").unwrap();
        assert_eq!(names(&tasks), ["top.iso".to_string()].into_iter().collect());
    }

    #[test]
    fn empty_directory_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), b"x").unwrap();
        let tasks = enumerate(dir.path(), ".iso").unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn missing_directory_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = enumerate(&missing, ".iso").unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory { .. }));
    }

    #[test]
    fn regular_file_path_is_not_a_directory() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let err = enumerate(f.path(), ".iso").unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinks_to_files_and_skips_dangling() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.bin");
        fs::write(&real, b"12345").unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("link.iso")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("dangling.iso"))
            .unwrap();

        let tasks = enumerate(dir.path(), ".iso").unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].file_name(), "link.iso");
        assert_eq!(tasks[0].size, 5);
    }
}
