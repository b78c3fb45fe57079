// HTTP client construction
use crate::domain::error::AveoError;
use crate::infrastructure::config::HttpConfig;
use reqwest::Client;
use std::time::Duration;

/// Build the shared reqwest client. No overall timeout unless configured.
pub fn create_client(config: &HttpConfig) -> Result<Client, AveoError> {
    let mut builder = Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .user_agent(config.user_agent.clone());

    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    Ok(builder.build()?)
}
