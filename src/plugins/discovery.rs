//! Plugin library discovery

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, Result};

/// File extension of shared libraries on this platform (`so`, `dylib`, `dll`)
pub const LIBRARY_EXTENSION: &str = std::env::consts::DLL_EXTENSION;

/// List plugin libraries in `dirs`.
///
/// Each directory's matches are sorted by full path on their own and then
/// appended in directory order, so the result is
/// `sorted(dirs[0]) ++ sorted(dirs[1]) ++ ...`.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn discover_plugin_libraries<P: AsRef<Path>>(dirs: &[P]) -> Result<Vec<PathBuf>> {
    let mut libraries = Vec::new();
    for dir in dirs {
        libraries.extend(libraries_in_dir(dir.as_ref())?);
    }
    Ok(libraries)
}

fn libraries_in_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        Error::Config(format!("Unable to read plugin directory {}: {e}", dir.display()))
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == LIBRARY_EXTENSION) {
            found.push(path);
        }
    }
    found.sort();

    debug!(dir = %dir.display(), count = found.len(), "Scanned plugin directory");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_directories_are_sorted_individually_then_appended() {
        let plugins = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();

        let foo = touch(plugins.path(), &format!("foo.{LIBRARY_EXTENSION}"));
        let bar = touch(plugins.path(), &format!("bar.{LIBRARY_EXTENSION}"));
        let zap = touch(other.path(), &format!("zap.{LIBRARY_EXTENSION}"));
        touch(plugins.path(), "README.md");
        touch(plugins.path(), &format!("noext{LIBRARY_EXTENSION}"));

        let found = discover_plugin_libraries(&[plugins.path(), other.path()]).unwrap();
        assert_eq!(found, vec![bar, foo, zap]);
    }

    #[test]
    fn test_subdirectories_are_skipped() {
        let plugins = tempfile::tempdir().unwrap();
        std::fs::create_dir(plugins.path().join(format!("nested.{LIBRARY_EXTENSION}"))).unwrap();

        let found = discover_plugin_libraries(&[plugins.path()]).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_missing_directory_fails() {
        let err = discover_plugin_libraries(&[Path::new("/nonexistent/plugins")]).unwrap_err();
        assert!(err.to_string().contains("Unable to read plugin directory"));
    }
}
