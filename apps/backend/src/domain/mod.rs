pub mod platforms;
pub mod views;

pub use platforms::{default_platform_rules, validate_link_url, PlatformRule, PlatformRules};
pub use views::{PublicLink, PublicProfile, SessionEntry};
