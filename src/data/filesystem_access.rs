//! File/code adapted from https://github.com/jamjamjon/usls
//!
//! Represents various directories on the system, including Home, Cache, Config, and current directory.
#[derive(Debug, Clone, Copy)]
pub enum FsAccess {
    Home,
    Cache,
    Config,
    Current,
}

const APP_DIR: &str = "yolo";

impl FsAccess {
    /// Every location, in the order artifact discovery searches them.
    pub const SEARCH_ORDER: [FsAccess; 4] = [FsAccess::Current, FsAccess::Config, FsAccess::Cache, FsAccess::Home];

    /// Returns the default location of the `yolo` directory without creating it.
    /// The current directory never gets the subdirectory.
    ///
    /// Examples:
    /// `./`, `~/.config/yolo`, `~/.cache/yolo`, `~/.yolo`.
    pub fn search_path(&self) -> anyhow::Result<std::path::PathBuf> {
        let base_path = match self {
            FsAccess::Home => dirs::home_dir(),
            FsAccess::Cache => dirs::cache_dir(),
            FsAccess::Config => dirs::config_dir(),
            FsAccess::Current => std::env::current_dir().ok(),
        };

        let mut path = base_path.ok_or_else(|| {
            anyhow::anyhow!("Unsupported operating system. Supported OS: Linux, MacOS, Windows.")
        })?;

        match self {
            FsAccess::Home => path.push(format!(".{}", APP_DIR)),
            FsAccess::Current => {}
            _ => path.push(APP_DIR),
        }
        Ok(path)
    }
}
