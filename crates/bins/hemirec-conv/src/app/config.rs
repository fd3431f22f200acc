use crate::app::error::RuntimeError;
use base::{HemisphereGrid, StepRangeIncl};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory and in
/// the system configuration directory.
pub const CONFIG_FILE_NAME: &str = "hemirec.toml";

/// Default angular sampling step, in degrees.
pub const DEFAULT_SAMPLING: f64 = 1.0;

/// hemirec configuration.
#[derive(Debug)]
pub struct Config {
    /// Current working directory (where the user started the program).
    /// CWD will be used in case [`UserConfig::output_dir`] is not defined.
    pub(crate) cwd: PathBuf,

    /// User-defined configuration.
    pub(crate) user: UserConfig,
}

/// Options configured by user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Path to the user-defined output directory.
    /// If not set, the current working directory is used.
    pub output_dir: Option<PathBuf>,

    /// Angular sampling step of the exit hemisphere, in degrees.
    pub sampling: f64,

    /// Comment written in the header of the exported files.
    pub comment: Option<String>,

    /// Exit polar axis, replaces `0 .. =90 / sampling`. Must span
    /// [0°, 90°], only the step differs.
    pub theta_range: Option<StepRangeIncl<f64>>,

    /// Exit azimuthal axis, replaces `0 .. =360 / sampling`. Must span
    /// [0°, 360°], only the step differs.
    pub phi_range: Option<StepRangeIncl<f64>>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            sampling: DEFAULT_SAMPLING,
            comment: None,
            theta_range: None,
            phi_range: None,
        }
    }
}

impl UserConfig {
    /// Load [`UserConfig`] from a .toml file.
    ///
    /// A relative `output_dir` is resolved against the directory holding the
    /// file.
    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let string = std::fs::read_to_string(path)
            .map_err(|err| RuntimeError::ReadConfig(path.to_path_buf(), err))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::parse(&string, base)
            .map_err(|err| RuntimeError::ParseConfig(path.to_path_buf(), err))?;
        log::info!("    - User output directory: {:?}", config.output_dir);
        log::info!("    - Sampling: {}°", config.sampling);
        if let Some(range) = &config.theta_range {
            log::info!("    - θ range: {range}");
        }
        if let Some(range) = &config.phi_range {
            log::info!("    - φ range: {range}");
        }
        Ok(config)
    }

    /// Parses the configuration from TOML text, resolving relative paths
    /// against `base`.
    pub fn parse(text: &str, base: &Path) -> Result<Self, toml::de::Error> {
        let mut config: UserConfig = toml::from_str(text)?;
        if let Some(output_dir) = config.output_dir {
            config.output_dir = Some(resolve_against(base, &output_dir));
        }
        Ok(config)
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// If `filepath` is given, the file must exist. Otherwise `hemirec.toml`
    /// is looked up in the current working directory, then in the
    /// `hemirec` folder of the system configuration directory. Defaults are
    /// used when no file is found.
    ///
    /// # System configuration directory
    ///
    /// + On *nix system: "$XDG_CONFIG_HOME" or "$HOME/.config"
    ///
    /// + On windows system: `%APPDATA%` which is usually
    ///   "C:\Users\username\AppData\Roaming"
    ///
    /// + On macos system: "$HOME/Library/Application Support"
    pub fn load_config(filepath: Option<&Path>) -> Result<Self, RuntimeError> {
        let cwd = std::env::current_dir().map_err(RuntimeError::CurrentDir)?;
        let sys_config_dir = dirs::config_dir().map(|dir| dir.join("hemirec"));
        log::info!("Configuring hemirec...");

        let user = match filepath {
            Some(path) => {
                let path = resolve_against(&cwd, path);
                if !path.is_file() {
                    return Err(RuntimeError::UserConfigNotFound(path));
                }
                log::info!("  Load user specified configuration from {}", path.display());
                UserConfig::load(&path)?
            },
            None => {
                let config_in_cwd = cwd.join(CONFIG_FILE_NAME);
                let config_in_sys = sys_config_dir
                    .as_ref()
                    .map(|dir| dir.join(CONFIG_FILE_NAME))
                    .filter(|path| path.is_file());
                if config_in_cwd.is_file() {
                    log::info!("  Load configuration in CWD: {}", config_in_cwd.display());
                    UserConfig::load(&config_in_cwd)?
                } else if let Some(config_in_sys) = config_in_sys {
                    log::info!("  Load configuration from {}", config_in_sys.display());
                    UserConfig::load(&config_in_sys)?
                } else {
                    log::info!("  No configuration file found, using defaults");
                    UserConfig::default()
                }
            },
        };

        Ok(Self { cwd, user })
    }

    /// Returns the user configuration.
    pub fn user(&self) -> &UserConfig { &self.user }

    /// Returns the output directory.
    /// If the output directory is not set, the current working directory will
    /// be returned.
    pub fn output_dir(&self) -> &Path {
        self.user
            .output_dir
            .as_ref()
            .map_or(self.cwd.as_path(), |output_dir| output_dir.as_path())
    }

    /// Resolves the output directory of a command.
    ///
    /// A directory given on the command line is resolved against the current
    /// working directory; it may not exist yet but must not be a file.
    pub fn resolve_output_dir(&self, output_dir: Option<&Path>) -> Result<PathBuf, RuntimeError> {
        let resolved = match output_dir {
            Some(dir) => resolve_against(&self.cwd, dir),
            None => self.output_dir().to_path_buf(),
        };
        if resolved.exists() && !resolved.is_dir() {
            return Err(RuntimeError::InvalidOutputDir(resolved));
        }
        Ok(resolved)
    }

    /// Resolves an input path against the current working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf { resolve_against(&self.cwd, path) }

    /// Builds the exit hemisphere grid.
    ///
    /// A sampling step given on the command line overrides the configured
    /// one, including the step of configured ranges.
    pub fn hemisphere_grid(&self, sampling: Option<f64>) -> Result<HemisphereGrid, RuntimeError> {
        let step = sampling.unwrap_or(self.user.sampling);
        let axis = |configured: Option<StepRangeIncl<f64>>, (start, stop): (f64, f64)| {
            match (configured, sampling) {
                (Some(range), None) => range,
                (Some(range), Some(step)) => StepRangeIncl::new(range.start, range.stop, step),
                (None, _) => StepRangeIncl::new(start, stop, step),
            }
        };
        let theta = axis(self.user.theta_range, HemisphereGrid::THETA_RANGE);
        let phi = axis(self.user.phi_range, HemisphereGrid::PHI_RANGE);
        log::debug!("Exit hemisphere: θ {theta}, φ {phi}");
        Ok(HemisphereGrid::from_ranges(theta, phi)?)
    }
}

/// Joins a relative path to `base`; absolute paths are returned as is.
///
/// A leading `~/` is expanded to the home directory.
fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if let (Ok(stripped), Some(home)) = (path.strip_prefix("~"), dirs::home_dir()) {
        return home.join(stripped);
    }
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
