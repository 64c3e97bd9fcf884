//! Path utilities for generated clip names and downloaded files

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Characters reserved by common filesystems
const RESERVED_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Suffixes left behind by an interrupted or in-progress download
const PARTIAL_SUFFIXES: [&str; 2] = [".part", ".ytdl"];

/// Remove every filesystem-reserved character from a human supplied name.
///
/// Everything else, whitespace and unicode included, is kept as-is.
pub fn sanitize_filename(name: &str) -> String {
    name.chars().filter(|c| !RESERVED_CHARS.contains(c)).collect()
}

/// Whether a file name marks an unfinished download
pub fn is_partial_download(file_name: &str) -> bool {
    PARTIAL_SUFFIXES
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
}

/// Whether `file_name` is `base` itself or `base` followed by extensions
fn belongs_to_base(file_name: &str, base: &str) -> bool {
    match file_name.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

/// List regular files directly inside `dir` named `base` or `base.<ext>...`.
///
/// `base_1` does not claim `base_10.mp4`. Results are sorted by name so
/// callers get a stable order.
pub fn files_for_base(dir: &Path, base: &str) -> Vec<PathBuf> {
    let mut matches: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| belongs_to_base(&entry.file_name().to_string_lossy(), base))
        .map(|entry| entry.into_path())
        .collect();

    matches.sort();
    matches
}

/// Find the finished download for `base`, skipping partial leftovers
pub fn find_completed_download(dir: &Path, base: &str) -> Option<PathBuf> {
    files_for_base(dir, base).into_iter().find(|path| {
        path.file_name()
            .map(|name| !is_partial_download(&name.to_string_lossy()))
            .unwrap_or(false)
    })
}

/// Base name of a path for user facing messages
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sanitize_removes_reserved() {
        assert_eq!(sanitize_filename("a/b*c?.mp4"), "abc.mp4");
        assert_eq!(sanitize_filename(r#"x\y:z"w<v>u|t"#), "xyzwvut");
    }

    #[test]
    fn test_sanitize_keeps_other_characters() {
        assert_eq!(sanitize_filename("My Clip"), "My Clip");
        assert_eq!(sanitize_filename("Café – 東京 🎬"), "Café – 東京 🎬");
        assert_eq!(sanitize_filename(""), "");
    }

    #[test]
    fn test_find_completed_download_skips_partials() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dl_1.mp4.part"), b"partial").unwrap();
        fs::write(dir.path().join("dl_1.mp4"), b"done").unwrap();
        fs::write(dir.path().join("other.mp4"), b"unrelated").unwrap();

        let found = find_completed_download(dir.path(), "dl_1").unwrap();
        assert_eq!(found, dir.path().join("dl_1.mp4"));
    }

    #[test]
    fn test_find_completed_download_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dl_2.webm.part"), b"partial").unwrap();

        assert!(find_completed_download(dir.path(), "dl_2").is_none());
        assert_eq!(files_for_base(dir.path(), "dl_2").len(), 1);
    }

    #[test]
    fn test_files_for_base_ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("dl_3_dir")).unwrap();
        fs::write(dir.path().join("dl_3_dir").join("dl_3.mp4"), b"nested").unwrap();

        assert!(files_for_base(dir.path(), "dl_3").is_empty());
    }

    #[test]
    fn test_files_for_base_skips_longer_sibling_bases() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dl_4.mp4.part"), b"own").unwrap();
        fs::write(dir.path().join("dl_40.mp4"), b"other job").unwrap();
        fs::write(dir.path().join("dl_41.webm.part"), b"other job").unwrap();

        assert_eq!(
            files_for_base(dir.path(), "dl_4"),
            vec![dir.path().join("dl_4.mp4.part")]
        );
        assert!(find_completed_download(dir.path(), "dl_4").is_none());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/tmp/out/My_Clip.gif")), "My_Clip.gif");
    }
}
