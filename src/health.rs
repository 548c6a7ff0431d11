use std::time::Instant;

use crate::client::MongoClient;

/// Health check status for a MongoDB connection
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the server answered the ping
    pub healthy: bool,
    /// Error details when unhealthy
    pub message: Option<String>,
    /// Round-trip time in milliseconds
    pub response_time_ms: u64,
}

/// Check connectivity with a `ping` command
pub async fn check_health(client: &MongoClient) -> bool {
    client.ping().await.is_ok()
}

/// Check connectivity and report latency and error details
///
/// # Example
/// ```ignore
/// let status = check_health_detailed(&client).await;
/// if !status.healthy {
///     warn!("MongoDB unhealthy: {:?}", status.message);
/// }
/// ```
pub async fn check_health_detailed(client: &MongoClient) -> HealthStatus {
    let start = Instant::now();
    match client.ping().await {
        Ok(()) => HealthStatus {
            healthy: true,
            message: None,
            response_time_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => HealthStatus {
            healthy: false,
            message: Some(e.to_string()),
            response_time_ms: start.elapsed().as_millis() as u64,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MongoConfig;

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_check_health() {
        let config = MongoConfig::new("mongodb://localhost:27017");
        let client = MongoClient::connect(&config).await.unwrap();
        assert!(check_health(&client).await);
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_check_health_detailed() {
        let config = MongoConfig::new("mongodb://localhost:27017");
        let client = MongoClient::connect(&config).await.unwrap();
        let status = check_health_detailed(&client).await;
        assert!(status.healthy);
        assert!(status.message.is_none());
    }
}
