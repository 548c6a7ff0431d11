use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use mongodb::bson::Document;
use mongodb::options::{
    Acknowledgment, AuthMechanism, ClientOptions, Compressor, Credential, ReadConcern,
    ReadPreference, ReadPreferenceOptions, SelectionCriteria, ServerAddress, WriteConcern,
};
use serde::Deserialize;

use crate::error::{MongoError, MongoResult};

/// MongoDB client configuration
///
/// Covers the connection settings the underlying driver understands:
/// address list or full URI, credentials, pool sizes, timeouts, topology
/// hints, compression, retry flags, and read/write concern. Every field
/// maps one-to-one onto `mongodb::options::ClientOptions`; fields left
/// unset keep the driver's own default.
///
/// The struct deserializes from any serde-backed config source, and the
/// common subset can also be loaded from `MONGODB_*` environment variables
/// with [`MongoConfig::from_env`].
///
/// # Example
///
/// ```ignore
/// use mongokit::MongoConfig;
///
/// // Manual construction
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "mydb");
///
/// // From environment variables
/// let config = MongoConfig::from_env()?;
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    /// Name this client registers under in a `ClientRegistry`
    pub name: String,

    /// Full connection string. When set it is parsed first and the other
    /// fields act as overrides; otherwise the client is built from `hosts`.
    pub uri: Option<String>,

    /// Server address list (`host[:port]`), used when `uri` is unset
    pub hosts: Vec<String>,

    /// Default database the client binds to
    pub database: String,

    /// Optional application name for server logs
    pub app_name: Option<String>,

    /// Username; no credential is attached when absent or empty
    pub username: Option<String>,

    /// Password for `username`
    pub password: Option<String>,

    /// Authentication database, defaults to `admin` when credentials are set
    pub auth_source: Option<String>,

    /// Authentication mechanism name (e.g. `SCRAM-SHA-256`)
    pub auth_mechanism: Option<String>,

    /// Extra properties for the authentication mechanism
    pub auth_mechanism_properties: Option<HashMap<String, String>>,

    /// Wire compressors in order of preference: `zstd`, `zlib`, `snappy`
    pub compressors: Vec<String>,

    /// Compression level for the `zlib` compressor
    pub zlib_level: Option<u32>,

    /// Compression level for the `zstd` compressor
    pub zstd_level: Option<i32>,

    /// Connect only to the listed hosts instead of discovering the topology
    pub direct_connection: Option<bool>,

    /// Replica set name
    pub replica_set: Option<String>,

    /// Maximum number of connections in the pool
    pub max_pool_size: u32,

    /// Minimum number of connections in the pool
    pub min_pool_size: u32,

    /// How long a pooled connection may sit idle before it is closed
    pub max_idle_time_secs: Option<u64>,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Server selection timeout in seconds
    pub server_selection_timeout_secs: u64,

    /// Interval between server monitoring checks
    pub heartbeat_interval_ms: Option<u64>,

    /// Latency window for selecting among suitable servers
    pub local_threshold_ms: Option<u64>,

    /// Whether reads are retried once on transient failures
    pub retry_reads: Option<bool>,

    /// Whether writes are retried once on transient failures
    pub retry_writes: Option<bool>,

    /// Read concern level for operations on this client
    pub read_concern: Option<ReadConcernLevel>,

    /// Read preference for server selection
    pub read_preference: Option<ReadPreferenceConfig>,

    /// Write concern for operations on this client
    pub write_concern: Option<WriteConcernConfig>,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            uri: None,
            hosts: vec!["localhost:27017".to_string()],
            database: "default".to_string(),
            app_name: None,
            username: None,
            password: None,
            auth_source: None,
            auth_mechanism: None,
            auth_mechanism_properties: None,
            compressors: Vec::new(),
            zlib_level: None,
            zstd_level: None,
            direct_connection: None,
            replica_set: None,
            max_pool_size: 100,
            min_pool_size: 5,
            max_idle_time_secs: None,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
            heartbeat_interval_ms: None,
            local_threshold_ms: None,
            retry_reads: None,
            retry_writes: None,
            read_concern: None,
            read_preference: None,
            write_concern: None,
        }
    }
}

impl MongoConfig {
    /// Create a config for a connection string, with the default database
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Default::default()
        }
    }

    /// Create a config for a connection string and a specific database
    pub fn with_database(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            database: database.into(),
            ..Default::default()
        }
    }

    /// Create a config from a host list and a specific database
    pub fn with_hosts(hosts: Vec<String>, database: impl Into<String>) -> Self {
        Self {
            hosts,
            database: database.into(),
            ..Default::default()
        }
    }

    /// Set custom pool bounds
    pub fn with_pool_size(mut self, max_pool_size: u32, min_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self.min_pool_size = min_pool_size;
        self
    }

    /// Set the application name reported in server logs
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Set the registry name for this client
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the default database name
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Translate this configuration into driver `ClientOptions`
    ///
    /// Settings that were not provided keep whatever the driver (or the
    /// parsed URI) already has, so omitted fields never override driver
    /// defaults.
    pub async fn client_options(&self) -> MongoResult<ClientOptions> {
        let mut options = match &self.uri {
            Some(uri) => ClientOptions::parse(uri).await?,
            None => {
                let hosts = self
                    .hosts
                    .iter()
                    .map(ServerAddress::parse)
                    .collect::<mongodb::error::Result<Vec<_>>>()?;
                ClientOptions::builder().hosts(hosts).build()
            }
        };

        if self.app_name.is_some() {
            options.app_name = self.app_name.clone();
        }
        if let Some(credential) = self.credential()? {
            options.credential = Some(credential);
        }

        options.max_pool_size = Some(self.max_pool_size);
        options.min_pool_size = Some(self.min_pool_size);
        options.connect_timeout = Some(Duration::from_secs(self.connect_timeout_secs));
        options.server_selection_timeout =
            Some(Duration::from_secs(self.server_selection_timeout_secs));

        if let Some(secs) = self.max_idle_time_secs {
            options.max_idle_time = Some(Duration::from_secs(secs));
        }
        if let Some(ms) = self.heartbeat_interval_ms {
            options.heartbeat_freq = Some(Duration::from_millis(ms));
        }
        if let Some(ms) = self.local_threshold_ms {
            options.local_threshold = Some(Duration::from_millis(ms));
        }
        if self.direct_connection.is_some() {
            options.direct_connection = self.direct_connection;
        }
        if self.replica_set.is_some() {
            options.repl_set_name = self.replica_set.clone();
        }
        if self.retry_reads.is_some() {
            options.retry_reads = self.retry_reads;
        }
        if self.retry_writes.is_some() {
            options.retry_writes = self.retry_writes;
        }
        if let Some(level) = self.read_concern {
            options.read_concern = Some(level.to_driver());
        }
        if let Some(ref pref) = self.read_preference {
            options.selection_criteria =
                Some(SelectionCriteria::ReadPreference(pref.to_driver()));
        }
        if let Some(ref concern) = self.write_concern {
            options.write_concern = Some(concern.to_driver());
        }
        if !self.compressors.is_empty() {
            options.compressors = Some(self.compressor_list()?);
        }

        Ok(options)
    }

    fn credential(&self) -> MongoResult<Option<Credential>> {
        let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) else {
            return Ok(None);
        };

        let mut credential = Credential::default();
        credential.username = Some(username.to_string());
        credential.password = self.password.clone();
        credential.source = Some(
            self.auth_source
                .clone()
                .unwrap_or_else(|| "admin".to_string()),
        );
        if let Some(ref name) = self.auth_mechanism {
            credential.mechanism = Some(parse_auth_mechanism(name)?);
        }
        if let Some(ref props) = self.auth_mechanism_properties {
            let mut doc = Document::new();
            for (key, value) in props {
                doc.insert(key.clone(), value.clone());
            }
            credential.mechanism_properties = Some(doc);
        }

        Ok(Some(credential))
    }

    fn compressor_list(&self) -> MongoResult<Vec<Compressor>> {
        self.compressors
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "zstd" => Ok(Compressor::Zstd {
                    level: self.zstd_level,
                }),
                "zlib" => Ok(Compressor::Zlib {
                    level: self.zlib_level,
                }),
                "snappy" => Ok(Compressor::Snappy),
                other => Err(MongoError::InvalidConfig {
                    key: "compressors".to_string(),
                    details: format!("unsupported compressor '{other}'"),
                }),
            })
            .collect()
    }

    /// Load the common settings from environment variables
    ///
    /// Environment variables:
    /// - `MONGODB_URI` or `MONGODB_HOSTS` (required) - connection string, or
    ///   comma-separated `host[:port]` list
    /// - `MONGODB_DATABASE` (required) - default database name
    /// - `MONGODB_CLIENT_NAME` (optional, default: `default`) - registry name
    /// - `MONGODB_APP_NAME` (optional) - application name for server logs
    /// - `MONGODB_USERNAME` / `MONGODB_PASSWORD` / `MONGODB_AUTH_SOURCE` (optional)
    /// - `MONGODB_MAX_POOL_SIZE` (optional, default: 100)
    /// - `MONGODB_MIN_POOL_SIZE` (optional, default: 5)
    /// - `MONGODB_CONNECT_TIMEOUT_SECS` (optional, default: 10)
    /// - `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` (optional, default: 30)
    /// - `MONGODB_REPLICA_SET` (optional)
    /// - `MONGODB_DIRECT_CONNECTION` / `MONGODB_RETRY_READS` /
    ///   `MONGODB_RETRY_WRITES` (optional booleans)
    /// - `MONGODB_COMPRESSORS` (optional, comma-separated)
    pub fn from_env() -> MongoResult<Self> {
        let uri = env_opt("MONGODB_URI");
        let hosts = env_opt("MONGODB_HOSTS").map(csv);
        if uri.is_none() && hosts.is_none() {
            return Err(MongoError::MissingEnvVar(
                "MONGODB_URI or MONGODB_HOSTS".to_string(),
            ));
        }

        let database = env_opt("MONGODB_DATABASE")
            .ok_or_else(|| MongoError::MissingEnvVar("MONGODB_DATABASE".to_string()))?;

        let defaults = Self::default();
        Ok(Self {
            name: env_opt("MONGODB_CLIENT_NAME").unwrap_or_else(|| "default".to_string()),
            uri,
            hosts: hosts.unwrap_or(defaults.hosts),
            database,
            app_name: env_opt("MONGODB_APP_NAME"),
            username: env_opt("MONGODB_USERNAME"),
            password: env_opt("MONGODB_PASSWORD"),
            auth_source: env_opt("MONGODB_AUTH_SOURCE"),
            auth_mechanism: env_opt("MONGODB_AUTH_MECHANISM"),
            compressors: env_opt("MONGODB_COMPRESSORS").map(csv).unwrap_or_default(),
            replica_set: env_opt("MONGODB_REPLICA_SET"),
            direct_connection: env_parse_opt("MONGODB_DIRECT_CONNECTION")?,
            max_pool_size: env_parse_or("MONGODB_MAX_POOL_SIZE", defaults.max_pool_size)?,
            min_pool_size: env_parse_or("MONGODB_MIN_POOL_SIZE", defaults.min_pool_size)?,
            connect_timeout_secs: env_parse_or(
                "MONGODB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            server_selection_timeout_secs: env_parse_or(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                defaults.server_selection_timeout_secs,
            )?,
            retry_reads: env_parse_opt("MONGODB_RETRY_READS")?,
            retry_writes: env_parse_opt("MONGODB_RETRY_WRITES")?,
            ..Default::default()
        })
    }
}

/// Read concern level, as understood by the server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadConcernLevel {
    Local,
    Majority,
    Available,
    Linearizable,
    Snapshot,
}

impl ReadConcernLevel {
    fn to_driver(self) -> ReadConcern {
        match self {
            ReadConcernLevel::Local => ReadConcern::local(),
            ReadConcernLevel::Majority => ReadConcern::majority(),
            ReadConcernLevel::Available => ReadConcern::available(),
            ReadConcernLevel::Linearizable => ReadConcern::linearizable(),
            ReadConcernLevel::Snapshot => ReadConcern::snapshot(),
        }
    }
}

/// Read preference mode for server selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadPreferenceMode {
    #[default]
    Primary,
    PrimaryPreferred,
    Secondary,
    SecondaryPreferred,
    Nearest,
}

/// Read preference settings: mode plus optional tag sets and max staleness
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReadPreferenceConfig {
    pub mode: ReadPreferenceMode,
    pub tag_sets: Vec<HashMap<String, String>>,
    pub max_staleness_secs: Option<u64>,
}

impl ReadPreferenceConfig {
    fn to_driver(&self) -> ReadPreference {
        let options = if self.tag_sets.is_empty() && self.max_staleness_secs.is_none() {
            None
        } else {
            let mut opts = ReadPreferenceOptions::default();
            if !self.tag_sets.is_empty() {
                opts.tag_sets = Some(self.tag_sets.clone());
            }
            opts.max_staleness = self.max_staleness_secs.map(Duration::from_secs);
            Some(opts)
        };

        match self.mode {
            ReadPreferenceMode::Primary => ReadPreference::Primary,
            ReadPreferenceMode::PrimaryPreferred => ReadPreference::PrimaryPreferred { options },
            ReadPreferenceMode::Secondary => ReadPreference::Secondary { options },
            ReadPreferenceMode::SecondaryPreferred => {
                ReadPreference::SecondaryPreferred { options }
            }
            ReadPreferenceMode::Nearest => ReadPreference::Nearest { options },
        }
    }
}

/// Write concern settings
///
/// Acknowledgment precedence: `w_majority`, then `w_tag`, then `w`; an
/// empty struct falls back to majority.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct WriteConcernConfig {
    /// Number of nodes that must acknowledge a write
    pub w: Option<u32>,
    /// Require acknowledgment from a majority of nodes
    pub w_majority: bool,
    /// Require acknowledgment from nodes carrying this tag
    pub w_tag: Option<String>,
    /// Require the write to hit the on-disk journal
    pub journal: Option<bool>,
    /// How long the server waits for the write concern to be satisfied
    pub w_timeout_ms: Option<u64>,
}

impl WriteConcernConfig {
    fn to_driver(&self) -> WriteConcern {
        let acknowledgment = if self.w_majority {
            Acknowledgment::Majority
        } else if let Some(ref tag) = self.w_tag {
            Acknowledgment::Custom(tag.clone())
        } else if let Some(nodes) = self.w {
            Acknowledgment::Nodes(nodes)
        } else {
            Acknowledgment::Majority
        };

        let mut concern = WriteConcern::majority();
        concern.w = Some(acknowledgment);
        concern.journal = self.journal;
        concern.w_timeout = self.w_timeout_ms.map(Duration::from_millis);
        concern
    }
}

fn parse_auth_mechanism(name: &str) -> MongoResult<AuthMechanism> {
    match name.to_ascii_uppercase().as_str() {
        "SCRAM-SHA-1" => Ok(AuthMechanism::ScramSha1),
        "SCRAM-SHA-256" => Ok(AuthMechanism::ScramSha256),
        "MONGODB-X509" => Ok(AuthMechanism::MongoDbX509),
        "PLAIN" => Ok(AuthMechanism::Plain),
        other => Err(MongoError::InvalidConfig {
            key: "auth_mechanism".to_string(),
            details: format!("unsupported mechanism '{other}'"),
        }),
    }
}

fn csv(value: String) -> Vec<String> {
    value
        .split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn env_parse_or<T: FromStr>(key: &str, default: T) -> MongoResult<T>
where
    T::Err: std::fmt::Display,
{
    Ok(env_parse_opt(key)?.unwrap_or(default))
}

fn env_parse_opt<T: FromStr>(key: &str) -> MongoResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|e| MongoError::InvalidConfig {
            key: key.to_string(),
            details: format!("{e}"),
        }),
    }
}
