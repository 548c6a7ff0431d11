use std::collections::HashMap;

use tracing::{debug, info};

use crate::client::MongoClient;
use crate::config::MongoConfig;
use crate::error::{MongoError, MongoResult};

/// Named collection of MongoDB clients
///
/// Built once at startup from the configuration entries and then passed by
/// reference to whoever needs a handle; there is no process-global state
/// and no mutation after construction. Looking up a name that was never
/// registered is an error, not a panic.
///
/// # Example
///
/// ```ignore
/// use mongokit::{ClientRegistry, MongoConfig};
///
/// let configs = vec![
///     MongoConfig::with_database("mongodb://primary:27017", "app").with_name("primary"),
///     MongoConfig::with_database("mongodb://reports:27017", "reports").with_name("reports"),
/// ];
/// let registry = ClientRegistry::from_configs(&configs).await?;
/// let reports = registry.get("reports")?;
/// ```
#[derive(Default)]
pub struct ClientRegistry {
    clients: HashMap<String, MongoClient>,
}

impl ClientRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one client per configuration entry
    ///
    /// Clients are constructed lazily; the driver connects on first use.
    /// An entry without a `name`, or two entries sharing one, fails the
    /// whole startup.
    pub async fn from_configs(configs: &[MongoConfig]) -> MongoResult<Self> {
        let mut registry = Self::new();
        for config in configs {
            if config.name.is_empty() {
                return Err(MongoError::InvalidConfig {
                    key: "name".to_string(),
                    details: "client name is required".to_string(),
                });
            }
            let client = MongoClient::new(config).await?;
            registry.register(config.name.clone(), client)?;
        }
        info!(clients = registry.len(), "MongoDB client registry ready");
        Ok(registry)
    }

    /// Like [`ClientRegistry::from_configs`], but verify each connection
    /// with a `ping` before returning
    pub async fn connect_all(configs: &[MongoConfig]) -> MongoResult<Self> {
        let registry = Self::from_configs(configs).await?;
        for (name, client) in &registry.clients {
            client
                .ping()
                .await
                .map_err(|e| MongoError::ConnectionFailed(format!("{name}: {e}")))?;
            debug!(name = %name, "Verified MongoDB connection");
        }
        Ok(registry)
    }

    /// Register a client under a name
    pub fn register(&mut self, name: impl Into<String>, client: MongoClient) -> MongoResult<()> {
        let name = name.into();
        if self.clients.contains_key(&name) {
            return Err(MongoError::DuplicateClient(name));
        }
        self.clients.insert(name, client);
        Ok(())
    }

    /// Look up a client by name
    pub fn get(&self, name: &str) -> MongoResult<&MongoClient> {
        self.clients
            .get(name)
            .ok_or_else(|| MongoError::UnknownClient(name.to_string()))
    }

    /// Names of all registered clients
    pub fn names(&self) -> Vec<&str> {
        self.clients.keys().map(String::as_str).collect()
    }

    /// Number of registered clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether the registry holds no clients
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str) -> MongoConfig {
        MongoConfig::with_database("mongodb://localhost:27017", "testdb").with_name(name)
    }

    #[tokio::test]
    async fn test_register_duplicate_fails() {
        let mut registry = ClientRegistry::new();
        let first = MongoClient::new(&config("primary")).await.unwrap();
        let second = MongoClient::new(&config("primary")).await.unwrap();

        registry.register("primary", first).unwrap();
        let result = registry.register("primary", second);
        assert!(matches!(
            result,
            Err(MongoError::DuplicateClient(ref name)) if name == "primary"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_fails() {
        let registry = ClientRegistry::new();
        let result = registry.get("nope");
        assert!(matches!(
            result,
            Err(MongoError::UnknownClient(ref name)) if name == "nope"
        ));
    }

    #[tokio::test]
    async fn test_from_configs() {
        let configs = vec![config("primary"), config("reports")];
        let registry = ClientRegistry::from_configs(&configs).await.unwrap();
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        let mut names = registry.names();
        names.sort_unstable();
        assert_eq!(names, vec!["primary", "reports"]);
        assert_eq!(registry.get("reports").unwrap().database().name(), "testdb");
    }

    #[tokio::test]
    async fn test_from_configs_rejects_missing_name() {
        let configs = vec![MongoConfig::with_database(
            "mongodb://localhost:27017",
            "testdb",
        )];
        let result = ClientRegistry::from_configs(&configs).await;
        assert!(matches!(
            result,
            Err(MongoError::InvalidConfig { ref key, .. }) if key == "name"
        ));
    }

    #[tokio::test]
    async fn test_from_configs_rejects_duplicate_name() {
        let configs = vec![config("primary"), config("primary")];
        let result = ClientRegistry::from_configs(&configs).await;
        assert!(matches!(result, Err(MongoError::DuplicateClient(_))));
    }
}
