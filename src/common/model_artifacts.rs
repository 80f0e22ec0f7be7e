use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::data::FsAccess;
use crate::error::DetectError;

const CONFIG_EXT: &str = "cfg";
const WEIGHTS_EXT: &str = "weights";
const NAMES_EXT: &str = "names";

/// The three files a detector is built from. Read-only, owned by the caller.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifacts {
    pub config_path: PathBuf,
    pub weights_path: PathBuf,
    pub names_path: PathBuf,
}

impl ModelArtifacts {
    pub fn new(config_path: impl Into<PathBuf>, weights_path: impl Into<PathBuf>, names_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            weights_path: weights_path.into(),
            names_path: names_path.into(),
        }
    }

    /// Checks the files the native engine reads exist. The engine itself reports
    /// nothing more useful than a status code when they don't.
    pub fn validate(&self) -> crate::Result<()> {
        for (kind, path) in [("config", &self.config_path), ("weights", &self.weights_path)] {
            if !path.is_file() {
                return Err(DetectError::Config(format!("{} file {} does not exist", kind, path.display())));
            }
        }
        Ok(())
    }

    /// Finds exactly one `.cfg`, `.weights` and `.names` file in `dir`.
    pub fn discover(dir: &Path) -> crate::Result<Self> {
        let entries = fs::read_dir(dir)
            .map_err(|e| DetectError::ArtifactDiscovery(format!("cannot read {}: {}", dir.display(), e)))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DetectError::ArtifactDiscovery(e.to_string()))?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }

        Ok(Self {
            config_path: single_with_extension(dir, &files, CONFIG_EXT)?,
            weights_path: single_with_extension(dir, &files, WEIGHTS_EXT)?,
            names_path: single_with_extension(dir, &files, NAMES_EXT)?,
        })
    }

    /// Tries the current directory, then `<config dir>/yolo`, `<cache dir>/yolo` and `~/.yolo`.
    /// Locations the platform doesn't have are skipped.
    pub fn discover_default() -> crate::Result<Self> {
        let mut failures = Vec::new();
        for location in FsAccess::SEARCH_ORDER {
            let dir = match location.search_path() {
                Ok(dir) => dir,
                Err(e) => {
                    log::debug!("Skipping {:?}: {}", location, e);
                    failures.push(format!("{:?}: {}", location, e));
                    continue;
                }
            };
            match Self::discover(&dir) {
                Ok(artifacts) => {
                    log::info!("Found model artifacts in {}", dir.display());
                    return Ok(artifacts);
                }
                Err(e) => failures.push(e.to_string()),
            }
        }
        Err(DetectError::ArtifactDiscovery(failures.join("; ")))
    }
}

fn single_with_extension(dir: &Path, files: &[PathBuf], ext: &str) -> crate::Result<PathBuf> {
    let mut matches = files
        .iter()
        .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext)));
    match (matches.next(), matches.next()) {
        (Some(path), None) => Ok(path.clone()),
        (None, _) => Err(DetectError::ArtifactDiscovery(format!("no .{} file in {}", ext, dir.display()))),
        (Some(_), Some(_)) => Err(DetectError::ArtifactDiscovery(format!("more than one .{} file in {}", ext, dir.display()))),
    }
}

impl fmt::Display for ModelArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Config File Path: {}\n\
        Weights File Path: {}\n\
        Names File Path: {}",
               self.config_path.display(), self.weights_path.display(), self.names_path.display())
    }
}
