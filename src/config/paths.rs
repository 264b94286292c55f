//! Platform-aware configuration paths for codescope

use std::env;
use std::path::PathBuf;

use crate::core::errors::ConfigError;

pub const CONFIG_DIR_ENV: &str = "CODESCOPE_CONFIG_DIR";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the configuration directory for the current platform
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    resolve_config_dir(env::var(CONFIG_DIR_ENV).ok(), dirs::config_dir())
}

/// Default location of the configuration file
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

fn resolve_config_dir(
    env_override: Option<String>,
    platform_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(custom_dir) = env_override.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(custom_dir));
    }

    platform_dir
        .map(|p| p.join("codescope"))
        .ok_or(ConfigError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_wins() {
        let dir = resolve_config_dir(
            Some("/custom/config".to_string()),
            Some(PathBuf::from("/home/u/.config")),
        )
        .unwrap();
        assert_eq!(dir, PathBuf::from("/custom/config"));
    }

    #[test]
    fn test_platform_dir_gets_app_folder() {
        let dir = resolve_config_dir(None, Some(PathBuf::from("/home/u/.config"))).unwrap();
        assert_eq!(dir, PathBuf::from("/home/u/.config/codescope"));

        let empty_override =
            resolve_config_dir(Some(String::new()), Some(PathBuf::from("/x"))).unwrap();
        assert_eq!(empty_override, PathBuf::from("/x/codescope"));
    }

    #[test]
    fn test_no_platform_dir() {
        assert!(matches!(
            resolve_config_dir(None, None),
            Err(ConfigError::NoConfigDir)
        ));
    }
}
