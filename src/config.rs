/// Name of the folder that receives results when a directory is cleaned into itself.
pub const TEMP_DIR: &str = "temp";

/// Immutable settings shared by every action of one invocation.
///
/// Built once at startup with [`Config::default`] and handed around by
/// reference.
///
/// ```rust
/// use exif_remover::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.temp_dir, "temp");
/// assert!(config.version.starts_with("EXIFRemover"));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Version line printed by `--version`.
    pub version: String,
    /// Usage line shown at the top of `--help`.
    pub usage: &'static str,
    /// ASCII banner printed before any action.
    pub banner: &'static str,
    /// Reserved subdirectory used when source and destination folders coincide.
    pub temp_dir: &'static str,
}

const USAGE: &str = "exifremover -d <filename/folder> [--dest <filename/folder>]";

const BANNER: &str = r" _____  _____ ___ ___
| __\ \/ /_ _| __| _ \___ _ __  _____ _____ _ _
| _| >  < | || _||   / -_) '  \/ _ \ V / -_) '_|
|___/_/\_\___|_| |_|_\___|_|_|_\___/\_/\___|_|
";

impl Default for Config {
    fn default() -> Self {
        Self {
            version: format!("EXIFRemover {}", env!("CARGO_PKG_VERSION")),
            usage: USAGE,
            banner: BANNER,
            temp_dir: TEMP_DIR,
        }
    }
}
