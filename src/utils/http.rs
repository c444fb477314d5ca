// src/utils/http.rs

//! HTTP client utilities.

use reqwest::redirect::Policy;

use crate::error::Result;
use crate::models::ProbeConfig;

/// Create a configured asynchronous HTTP client.
///
/// No client-wide timeout is set: every probe phase applies its own budget.
pub fn create_async_client(config: &ProbeConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .redirect(Policy::limited(config.max_redirects))
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_with_defaults() {
        assert!(create_async_client(&ProbeConfig::default()).is_ok());
    }
}
