//! Path helpers for user-supplied locations and display labels

use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR` and `${VAR}`, leaving the input untouched on failure.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(expand_env_vars(path.to_string_lossy().as_ref()))
}

/// `path` relative to `base` for display, falling back to `path` itself.
pub fn relative_label(base: &Path, path: &Path) -> String {
    pathdiff::diff_paths(path, base)
        .filter(|relative| !relative.as_os_str().is_empty())
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tilde_when_expanding_then_home_is_substituted() {
        let home = std::env::var("HOME").expect("HOME should be set");
        let expanded = expand_path(Path::new("~/projects"));
        assert!(expanded.starts_with(&home));
    }

    #[test]
    fn given_nested_path_when_labelling_then_relative_to_base() {
        assert_eq!(relative_label(Path::new("/a/b"), Path::new("/a/b/c/d")), "c/d");
        assert_eq!(relative_label(Path::new("/a/b"), Path::new("/a/b")), "/a/b");
    }
}
