//! Rate limiting middleware configuration helpers
//!
//! - Authentication endpoints: 5 requests per minute per IP
//! - General API endpoints: 100 requests per minute per IP
//! - Health check: exempt

use std::time::Duration;

use actix_extensible_rate_limit::backend::SimpleInputFunctionBuilder;

/// Login/register/refresh: 5 requests per 60 seconds per IP address.
pub fn auth_rate_limit_config() -> SimpleInputFunctionBuilder {
    SimpleInputFunctionBuilder::new(Duration::from_secs(60), 5).real_ip_key()
}

/// General API endpoints: 100 requests per 60 seconds per IP address.
pub fn api_rate_limit_config() -> SimpleInputFunctionBuilder {
    SimpleInputFunctionBuilder::new(Duration::from_secs(60), 100).real_ip_key()
}
