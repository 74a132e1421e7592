//! Redis cache variants.
//!
//! Values are stored as JSON text. Entries with a TTL are written with
//! `SET key value PX ms`, entries without one with a plain `SET` and never
//! expire.
//! Both variants connect on first use and reconnect after a failure, so a
//! Redis outage surfaces as per-operation errors rather than at construction.

use std::fmt;
use std::time::Duration;

use parking_lot::Mutex;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Commands, Connection};
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::cache::{AsyncCache, Cache, CacheError};

/// Connection timeout and per-command I/O timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Where to find the Redis server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisSettings {
    /// Server host name or address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database index
    pub db: i64,
    /// Connection and command timeout
    pub timeout: Duration,
}

impl RedisSettings {
    /// Settings for a server at `host:port`, database 0.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Select the database index.
    pub fn db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Set the connection and command timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Connection URL in `redis://host:port/db` form.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn encode(value: &Value) -> Result<String, CacheError> {
    Ok(serde_json::to_string(value)?)
}

fn decode(data: Option<String>) -> Result<Option<Value>, CacheError> {
    data.map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(CacheError::from)
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn set_command(key: &str, data: String, ttl: Option<Duration>) -> redis::Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(data);
    if let Some(ttl) = ttl {
        cmd.arg("PX").arg(ttl_millis(ttl));
    }
    cmd
}

/// Redis cache over a single blocking connection.
pub struct SyncRedisCache {
    client: Client,
    timeout: Duration,
    connection: Mutex<Option<Connection>>,
}

impl SyncRedisCache {
    /// Create a cache for the given server. No connection is made yet.
    pub fn new(settings: &RedisSettings) -> Result<Self, CacheError> {
        Ok(Self {
            client: Client::open(settings.url())?,
            timeout: settings.timeout,
            connection: Mutex::new(None),
        })
    }

    /// Run a command on the shared connection, opening it if needed.
    ///
    /// The connection is dropped after any error so the next call starts
    /// fresh.
    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> redis::RedisResult<T>,
    ) -> Result<T, CacheError> {
        let mut slot = self.connection.lock();
        let mut connection = match slot.take() {
            Some(connection) => connection,
            None => {
                let connection = self.client.get_connection_with_timeout(self.timeout)?;
                connection.set_read_timeout(Some(self.timeout))?;
                connection.set_write_timeout(Some(self.timeout))?;
                connection
            }
        };

        let result = op(&mut connection)?;
        *slot = Some(connection);
        Ok(result)
    }
}

impl fmt::Debug for SyncRedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncRedisCache")
            .field("client", &self.client)
            .field("timeout", &self.timeout)
            .field("connected", &self.connection.lock().is_some())
            .finish()
    }
}

impl Cache for SyncRedisCache {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let data: Option<String> = self.with_connection(|conn| conn.get(key))?;
        decode(data)
    }

    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError> {
        let cmd = set_command(key, encode(value)?, ttl);
        self.with_connection(|conn| cmd.query(conn))
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.with_connection(|conn| conn.del::<_, ()>(key))
    }
}

/// Redis cache over a multiplexed, self-reconnecting async connection.
pub struct AsyncRedisCache {
    client: Client,
    timeout: Duration,
    manager: OnceCell<ConnectionManager>,
}

impl AsyncRedisCache {
    /// Create a cache for the given server. No connection is made yet.
    pub fn new(settings: &RedisSettings) -> Result<Self, CacheError> {
        Ok(Self {
            client: Client::open(settings.url())?,
            timeout: settings.timeout,
            manager: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                tokio::time::timeout(self.timeout, self.client.get_connection_manager())
                    .await
                    .map_err(|_| CacheError::Timeout(self.timeout))?
                    .map_err(CacheError::from)
            })
            .await?;
        Ok(manager.clone())
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = redis::RedisResult<T>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| CacheError::Timeout(self.timeout))?
            .map_err(CacheError::from)
    }
}

impl fmt::Debug for AsyncRedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRedisCache")
            .field("client", &self.client)
            .field("timeout", &self.timeout)
            .field("connected", &self.manager.initialized())
            .finish()
    }
}

impl AsyncCache for AsyncRedisCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn = self.connection().await?;
        let data: Option<String> = self.bounded(conn.get(key)).await?;
        decode(data)
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError> {
        let cmd = set_command(key, encode(value)?, ttl);
        let mut conn = self.connection().await?;
        self.bounded(cmd.query_async(&mut conn)).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(conn.del::<_, ()>(key)).await
    }
}
