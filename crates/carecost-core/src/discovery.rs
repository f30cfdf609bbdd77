//! Data file discovery with ordered fallback directories
//!
//! The first directory that exists and can be listed wins, even if it holds
//! no matching files. Only when every candidate is unavailable does the
//! report receive a fatal entry; the store then starts empty.

use crate::config::DataConfig;
use crate::error::{CoreError, LoadError, LoadReport};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One discovered file: bare name plus raw contents
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Find and read data files, trying `config.dir` then each fallback in order
pub fn discover(config: &DataConfig, report: &mut LoadReport) -> Vec<RawFile> {
    let candidates = config.search_dirs();

    for (attempt, dir) in candidates.iter().enumerate() {
        match read_dir_files(dir, &config.extensions, report) {
            Ok(files) => {
                if attempt > 0 {
                    warn!(dir = %dir.display(), attempt, "Using fallback data directory");
                }
                info!(dir = %dir.display(), files = files.len(), "Discovered data files");
                report.source_dir = Some(dir.clone());
                return files;
            }
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "Data directory unavailable");
                report.add_warning("discovery", e.to_string());
            }
        }
    }

    let tried = candidates
        .iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    warn!(tried = %tried, "No data directory available, starting with an empty store");
    report.add_fatal(
        "discovery",
        format!("No data directory available (tried: {})", tried),
    );
    Vec::new()
}

/// Read every matching file directly inside `dir`, sorted by name
fn read_dir_files(
    dir: &Path,
    extensions: &[String],
    report: &mut LoadReport,
) -> Result<Vec<RawFile>, CoreError> {
    if !dir.is_dir() {
        return Err(CoreError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| CoreError::FileRead {
            path: dir.to_path_buf(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        match std::fs::read(&path) {
            Ok(bytes) => files.push(RawFile { name, bytes }),
            Err(source) => {
                let err = CoreError::FileRead {
                    path: path.clone(),
                    source,
                };
                warn!(error = %err, "Skipping unreadable data file");
                report.skip_file(LoadError::from_core_error(name, &err));
            }
        }
    }

    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(dir: PathBuf, fallback_dirs: Vec<PathBuf>) -> DataConfig {
        DataConfig {
            dir,
            fallback_dirs,
            extensions: vec!["csv".to_string()],
        }
    }

    #[test]
    fn test_discover_primary_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b_X_data.csv"), "b").unwrap();
        std::fs::write(dir.path().join("a_X_data.csv"), "a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c_X_data.csv"), "c").unwrap();

        let mut report = LoadReport::new();
        let files = discover(&config(dir.path().to_path_buf(), vec![]), &mut report);

        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a_X_data.csv", "b_X_data.csv"]);
        assert_eq!(files[0].bytes, b"a");
        assert_eq!(report.source_dir.as_deref(), Some(dir.path()));
        assert!(!report.has_errors());
    }

    #[test]
    fn test_discover_uses_fallback() {
        let fallback = tempdir().unwrap();
        std::fs::write(fallback.path().join("Austin_Aetna_PPO_data.csv"), "x").unwrap();

        let mut report = LoadReport::new();
        let files = discover(
            &config(
                PathBuf::from("/nonexistent/carecost/data"),
                vec![
                    PathBuf::from("/nonexistent/carecost/other"),
                    fallback.path().to_path_buf(),
                ],
            ),
            &mut report,
        );

        assert_eq!(files.len(), 1);
        assert_eq!(report.source_dir.as_deref(), Some(fallback.path()));
        assert_eq!(report.warnings().count(), 2);
        assert!(!report.has_fatal_errors());
    }

    #[test]
    fn test_discover_all_unavailable_is_fatal_but_empty() {
        let mut report = LoadReport::new();
        let files = discover(
            &config(PathBuf::from("/nonexistent/carecost/data"), vec![]),
            &mut report,
        );

        assert!(files.is_empty());
        assert!(report.has_fatal_errors());
        assert!(report.source_dir.is_none());
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let exts = vec!["csv".to_string()];
        assert!(has_extension(Path::new("a.CSV"), &exts));
        assert!(!has_extension(Path::new("a.csv.bak"), &exts));
        assert!(!has_extension(Path::new("csv"), &exts));
    }
}
