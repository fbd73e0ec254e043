//! Platform registry used to validate links.
//!
//! The registry rarely changes, so reads go through the cache with a long
//! TTL; the built-in defaults are the authoritative source for now.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformRule {
    pub display_name: String,
    /// Required URL prefix; empty means any http(s) URL is accepted.
    pub url_prefix: String,
}

pub type PlatformRules = BTreeMap<String, PlatformRule>;

pub fn default_platform_rules() -> PlatformRules {
    let mut rules = BTreeMap::new();
    let mut add = |key: &str, display_name: &str, url_prefix: &str| {
        rules.insert(
            key.to_string(),
            PlatformRule {
                display_name: display_name.to_string(),
                url_prefix: url_prefix.to_string(),
            },
        );
    };

    add("github", "GitHub", "https://github.com/");
    add("twitter", "Twitter / X", "https://x.com/");
    add("instagram", "Instagram", "https://instagram.com/");
    add("youtube", "YouTube", "https://youtube.com/");
    add("tiktok", "TikTok", "https://tiktok.com/@");
    add("linkedin", "LinkedIn", "https://linkedin.com/in/");
    add("twitch", "Twitch", "https://twitch.tv/");
    add("website", "Website", "");

    rules
}

/// Check a link's platform and URL against the registry.
pub fn validate_link_url(
    rules: &PlatformRules,
    platform: &str,
    url: &str,
) -> Result<(), DomainError> {
    let rule = rules
        .get(platform)
        .ok_or_else(|| DomainError::validation(format!("Unknown platform '{platform}'")))?;

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(DomainError::validation("URL must be http(s)"));
    }
    if !rule.url_prefix.is_empty() && !url.starts_with(&rule.url_prefix) {
        return Err(DomainError::validation(format!(
            "URL for {} must start with {}",
            rule.display_name, rule.url_prefix
        )));
    }
    Ok(())
}
