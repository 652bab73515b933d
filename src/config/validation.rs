use crate::config::types::{Config, HarvestConfig, OutputConfig, UserAgentConfig, UserAgentMode};
use crate::model::{SearchStrategy, SiteDescriptor};
use crate::url::parse_base_url;
use crate::ConfigError;
use std::collections::HashSet;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates fetching and paging limits
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.max_listing_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-listing-pages must be >= 1, got {}",
            config.max_listing_pages
        )));
    }

    if config.max_empty_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-empty-pages must be >= 1, got {}",
            config.max_empty_pages
        )));
    }

    if config.workers_per_site < 1 || config.workers_per_site > 16 {
        return Err(ConfigError::Validation(format!(
            "workers-per-site must be between 1 and 16, got {}",
            config.workers_per_site
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout must be >= 1s, got {}s",
            config.request_timeout
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.mode == UserAgentMode::Fixed {
        match config.value.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => {}
            _ => {
                return Err(ConfigError::Validation(
                    "user-agent value is required when mode is \"fixed\"".to_string(),
                ))
            }
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let required = [
        ("checkpoint-dir", &config.checkpoint_dir),
        ("ledger-path", &config.ledger_path),
        ("export-path", &config.export_path),
        ("summary-path", &config.summary_path),
    ];

    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    if let Some(split_dir) = &config.split_dir {
        if split_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "split-dir cannot be empty when present".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the site list
fn validate_sites(sites: &[SiteDescriptor]) -> Result<(), ConfigError> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[site]] must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for site in sites {
        validate_site_name(&site.name)?;

        if !seen.insert(site.name.as_str()) {
            return Err(ConfigError::DuplicateSite(site.name.clone()));
        }

        parse_base_url(&site.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid base-url '{}' for site '{}': {}",
                site.base_url, site.name, e
            ))
        })?;

        let needs_category = matches!(
            site.search_strategy,
            SearchStrategy::CategoryPage | SearchStrategy::MakeModelBrowse
        );
        let has_category = site
            .category_url
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        if needs_category && !has_category {
            return Err(ConfigError::Validation(format!(
                "site '{}' needs a category-url for its search strategy",
                site.name
            )));
        }

        if site.search_strategy == SearchStrategy::KeywordSearch
            && site.search_term.trim().is_empty()
        {
            return Err(ConfigError::Validation(format!(
                "site '{}' has an empty search-term",
                site.name
            )));
        }
    }

    Ok(())
}

/// Site names key checkpoint files, so they are restricted to `[A-Za-z0-9_-]`
fn validate_site_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "site name cannot be empty".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "site name must contain only letters, digits, '-' and '_', got '{}'",
            name
        )));
    }

    Ok(())
}
