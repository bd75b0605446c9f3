use bpaudit_core::RouteSourceError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories no scanner descends into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "dist", ".next", ".git"];

/// Files under `root` accepted by `keep`, in a stable order.
pub(crate) fn source_files(
    root: &Path,
    keep: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>, RouteSourceError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIPPED_DIRS.contains(&name))
        });
    for entry in walker {
        let entry = entry.map_err(|err| RouteSourceError::Walk {
            root: root.display().to_string(),
            message: err.to_string(),
        })?;
        if entry.file_type().is_file() && keep(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Reads a source file. Bytes that are not valid UTF-8 are replaced rather
/// than failing the scan.
pub(crate) fn read_source(path: &Path) -> Result<String, RouteSourceError> {
    let bytes = std::fs::read(path).map_err(|source| RouteSourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            tracing::warn!(
                file = %path.display(),
                "source file is not valid UTF-8; decoding lossily"
            );
            Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}
