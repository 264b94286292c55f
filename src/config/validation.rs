//! Configuration validation for codescope

use crate::core::errors::ConfigError;
use crate::core::repository::FileFilter;

use super::CodeScopeConfig;

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Check value ranges before any component is built from the configuration
pub fn validate_config(config: &CodeScopeConfig) -> Result<(), ConfigError> {
    let fetch = &config.fetch;
    if fetch.max_concurrent_fetches == 0 {
        return Err(invalid("fetch.max_concurrent_fetches", "must be at least 1"));
    }
    if fetch.max_file_size == 0 {
        return Err(invalid("fetch.max_file_size", "must be greater than 0"));
    }
    if fetch.request_timeout_seconds == 0 {
        return Err(invalid("fetch.request_timeout_seconds", "must be greater than 0"));
    }
    let ttl_fits = i64::try_from(fetch.cache_ttl_seconds)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .is_some();
    if !ttl_fits {
        return Err(invalid(
            "fetch.cache_ttl_seconds",
            format!("{} seconds is out of range", fetch.cache_ttl_seconds),
        ));
    }
    if !fetch.api_base_url.starts_with("http://") && !fetch.api_base_url.starts_with("https://") {
        return Err(invalid(
            "fetch.api_base_url",
            format!("'{}' is not an http(s) URL", fetch.api_base_url),
        ));
    }

    let analysis = &config.analysis;
    if analysis.blast_radius_depth == 0 {
        return Err(invalid("analysis.blast_radius_depth", "must be at least 1"));
    }
    if analysis.complexity_medium_above >= analysis.complexity_high_above {
        return Err(invalid(
            "analysis.complexity_medium_above",
            format!(
                "must be below complexity_high_above ({} >= {})",
                analysis.complexity_medium_above, analysis.complexity_high_above
            ),
        ));
    }

    // Compiles the globs; a bad pattern surfaces here rather than mid-run.
    FileFilter::new().with_exclude_patterns(&config.scan.exclude_patterns)?;

    Ok(())
}
