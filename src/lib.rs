//! Configuration and convenience layer over the MongoDB driver
//!
//! This crate does not implement any database logic of its own. Connection
//! pooling, server discovery, retries, and the wire protocol all belong to
//! the [`mongodb`] driver; what lives here is the glue around it:
//!
//! - [`MongoConfig`] - a serde-deserializable settings struct mapped
//!   field-by-field onto the driver's `ClientOptions`
//! - [`MongoClient`] - a client handle bound to a default database with
//!   forwarding CRUD and query methods
//! - [`ClientRegistry`] - named clients built once at startup and passed
//!   by reference, instead of process-global state
//! - [`options`] - one-call constructors for find/distinct options
//! - [`health`] - ping-based connectivity checks
//!
//! # Examples
//!
//! ## Single client
//!
//! ```ignore
//! use mongokit::{MongoClient, MongoConfig};
//! use mongodb::bson::doc;
//!
//! let config = MongoConfig::from_env()?;
//! let client = MongoClient::connect(&config).await?;
//!
//! let user: Option<User> = client
//!     .find_one("users", doc! { "email": "a@b.c" }, None)
//!     .await?;
//! ```
//!
//! ## Named clients
//!
//! ```ignore
//! use mongokit::{ClientRegistry, MongoConfig};
//!
//! let configs: Vec<MongoConfig> = load_from_config_file()?;
//! let registry = ClientRegistry::from_configs(&configs).await?;
//! let reports = registry.get("reports")?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod options;
pub mod registry;

pub use client::MongoClient;
pub use config::{
    MongoConfig, ReadConcernLevel, ReadPreferenceConfig, ReadPreferenceMode, WriteConcernConfig,
};
pub use error::{MongoError, MongoResult};
pub use health::{HealthStatus, check_health, check_health_detailed};
pub use registry::ClientRegistry;

// Re-export driver types for convenience
pub use mongodb::{Client, Collection, Cursor, Database, bson};
