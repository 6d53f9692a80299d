//! # Synchronous Client API
//!
//! Purpose: Expose typed, blocking helpers over a Valkey/Redis connection,
//! one remote command per call.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `Client` hides command building and reply decoding.
//! 2. **Missing Is Not An Error**: A nil reply becomes the zero value.
//! 3. **Fail Fast**: Every other error surfaces unchanged, with no retries.
//! 4. **Explicit Context**: Cancellation and deadlines live on the instance.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use redis::cluster::{ClusterClientBuilder, ClusterConnection};
use redis::{Cmd, ConnectionInfo, ConnectionLike, RedisError, RedisResult, Value};

use crate::command;
use crate::config::{ClientConfig, TlsConfig};
use crate::context::Context;
use crate::error::{ConnectionResult, OperationError, OperationResult};
use crate::reply::{ignore, or_zero};

/// Connected store handle, single node or cluster.
enum Handle {
    Single(redis::Connection),
    Cluster(ClusterConnection),
}

impl Handle {
    fn conn(&mut self) -> &mut dyn ConnectionLike {
        match self {
            Handle::Single(conn) => conn,
            Handle::Cluster(conn) => conn,
        }
    }

    fn set_timeout(&self, timeout: Option<Duration>) -> RedisResult<()> {
        match self {
            Handle::Single(conn) => {
                conn.set_read_timeout(timeout)?;
                conn.set_write_timeout(timeout)
            }
            Handle::Cluster(conn) => {
                conn.set_read_timeout(timeout)?;
                conn.set_write_timeout(timeout)
            }
        }
    }

    fn topology(&self) -> &'static str {
        match self {
            Handle::Single(_) => "single",
            Handle::Cluster(_) => "cluster",
        }
    }
}

/// Synchronous store client with typed helpers.
///
/// Every method sends exactly one command through the shared handle and
/// blocks until the reply arrives or the context deadline elapses. Reads of
/// absent keys or fields return the zero value of their type.
pub struct Client {
    handle: Mutex<Handle>,
    ctx: Context,
    addr: String,
}

impl Client {
    /// Connects with the classic argument list.
    ///
    /// `tls: None` disables TLS; `Some(TlsConfig::default())` enables it with
    /// defaults.
    pub fn new(
        addr: impl Into<String>,
        password: impl Into<String>,
        db: i64,
        force_single: bool,
        tls: Option<TlsConfig>,
    ) -> ConnectionResult<Self> {
        Self::with_config(ClientConfig {
            addr: addr.into(),
            password: password.into(),
            db,
            force_single,
            tls,
            ..ClientConfig::default()
        })
    }

    /// Connects with a full configuration and a background context.
    pub fn with_config(config: ClientConfig) -> ConnectionResult<Self> {
        Self::with_context(config, Context::background())
    }

    /// Connects with a full configuration and a caller-provided context.
    pub fn with_context(config: ClientConfig, ctx: Context) -> ConnectionResult<Self> {
        let handle = open(&config)?;
        tracing::debug!(
            addr = %config.addr,
            db = config.db,
            tls = config.tls.is_some(),
            topology = handle.topology(),
            "client connected"
        );
        Ok(Client {
            handle: Mutex::new(handle),
            ctx,
            addr: config.addr,
        })
    }

    /// The context applied to every call of this client.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// True when connected through cluster routing.
    pub fn is_cluster(&self) -> bool {
        matches!(*self.handle.lock(), Handle::Cluster(_))
    }

    /// Closes the connection. Dropping the client has the same effect.
    pub fn close(self) {
        drop(self);
    }

    /// Deletes a key. Deleting an absent key is not an error.
    pub fn delete(&self, key: &str) -> OperationResult<()> {
        ignore(self.dispatch(&command::del(key))?)
    }

    /// Sets a string value, with an expiry in whole seconds when given.
    pub fn set_string(&self, key: &str, value: &str, ex: Option<Duration>) -> OperationResult<()> {
        ignore(self.dispatch(&command::set(key, value, ex))?)
    }

    /// Returns the string value, or "" when the key is missing.
    pub fn get_string(&self, key: &str) -> OperationResult<String> {
        or_zero(self.dispatch(&command::get(key))?)
    }

    /// Returns the value parsed as an integer, or 0 when the key is missing.
    pub fn get_int64(&self, key: &str) -> OperationResult<i64> {
        or_zero(self.dispatch(&command::get(key))?)
    }

    /// Appends elements to the tail of a list.
    pub fn append_slice<S: AsRef<str>>(&self, key: &str, values: &[S]) -> OperationResult<()> {
        ignore(self.dispatch(&command::rpush(key, values))?)
    }

    /// Pushes all elements onto the head in one LPUSH; they end up in
    /// reverse input order.
    pub fn append_slice_reverse<S: AsRef<str>>(
        &self,
        key: &str,
        values: &[S],
    ) -> OperationResult<()> {
        ignore(self.dispatch(&command::lpush(key, values))?)
    }

    /// Returns list elements between `start` and `stop`, both inclusive.
    pub fn get_slice(&self, key: &str, start: i64, stop: i64) -> OperationResult<Vec<String>> {
        or_zero(self.dispatch(&command::lrange(key, start, stop))?)
    }

    /// Returns the list element at `index`, or "" when out of range.
    pub fn get_slice_by_index(&self, key: &str, index: i64) -> OperationResult<String> {
        or_zero(self.dispatch(&command::lindex(key, index))?)
    }

    /// Returns the list length, or 0 when the key is missing.
    pub fn get_slice_len(&self, key: &str) -> OperationResult<i64> {
        or_zero(self.dispatch(&command::llen(key))?)
    }

    /// Sets one hash field.
    pub fn set_map(&self, key: &str, field: &str, value: &str) -> OperationResult<()> {
        ignore(self.dispatch(&command::hset(key, field, value))?)
    }

    /// Returns one hash field, or "" when the key or field is missing.
    pub fn get_map_str(&self, key: &str, field: &str) -> OperationResult<String> {
        or_zero(self.dispatch(&command::hget(key, field))?)
    }

    /// Returns one hash field parsed as an integer, or 0 when missing.
    pub fn get_map_int64(&self, key: &str, field: &str) -> OperationResult<i64> {
        or_zero(self.dispatch(&command::hget(key, field))?)
    }

    /// Returns every field of a hash, or an empty map when the key is missing.
    pub fn get_map_all(&self, key: &str) -> OperationResult<HashMap<String, String>> {
        or_zero(self.dispatch(&command::hgetall(key))?)
    }

    /// Returns the number of hash fields, or 0 when the key is missing.
    pub fn get_map_len(&self, key: &str) -> OperationResult<i64> {
        or_zero(self.dispatch(&command::hlen(key))?)
    }

    /// Whether the hash field exists; false when the key is missing.
    pub fn check_if_map_field_exists(&self, key: &str, field: &str) -> OperationResult<bool> {
        or_zero(self.dispatch(&command::hexists(key, field))?)
    }

    /// Whether the key exists.
    pub fn check_if_key_exists(&self, key: &str) -> OperationResult<bool> {
        or_zero(self.dispatch(&command::exists(key))?)
    }

    fn dispatch(&self, cmd: &Cmd) -> OperationResult<Value> {
        if let Some(err) = self.ctx.err() {
            return Err(err);
        }
        tracing::trace!(command = %command::name(cmd), "dispatch");

        let mut handle = self.handle.lock();
        if let Some(left) = self.ctx.remaining() {
            // Zero is rejected by the socket layer.
            handle.set_timeout(Some(left.max(Duration::from_millis(1))))?;
        }

        match cmd.query::<Value>(handle.conn()) {
            Ok(value) => Ok(value),
            Err(err) if err.is_timeout() => Err(self.ctx.err().unwrap_or(OperationError::Store(err))),
            Err(err) => Err(err.into()),
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        tracing::debug!(addr = %self.addr, "client closed");
    }
}

fn open(config: &ClientConfig) -> ConnectionResult<Handle> {
    let info = config.connection_info()?;
    if config.force_single {
        return Ok(Handle::Single(connect_single(info, config)?));
    }

    // Probe on database 0: cluster nodes reject SELECT.
    let mut probe_info = info.clone();
    probe_info.redis.db = 0;
    let mut conn = connect_single(probe_info, config)?;
    match command::cluster_info().query::<Value>(&mut conn) {
        Err(err) if is_cluster_disabled(&err) => {
            tracing::debug!(addr = %config.addr, "cluster support disabled, using single node");
            if config.db != 0 {
                command::select(config.db).query::<Value>(&mut conn)?;
            }
            Ok(Handle::Single(conn))
        }
        Err(err) => Err(err.into()),
        Ok(_) => {
            drop(conn);
            let cluster = connect_cluster(info, certificates(config)?, config)?;
            Ok(Handle::Cluster(cluster))
        }
    }
}

fn connect_single(info: ConnectionInfo, config: &ClientConfig) -> ConnectionResult<redis::Connection> {
    let client = match certificates(config)? {
        Some(certs) => redis::Client::build_with_tls(info, certs)?,
        None => redis::Client::open(info)?,
    };
    let conn = match config.connect_timeout {
        Some(timeout) => client.get_connection_with_timeout(timeout)?,
        None => client.get_connection()?,
    };
    Ok(conn)
}

fn connect_cluster(
    mut info: ConnectionInfo,
    certs: Option<redis::TlsCertificates>,
    config: &ClientConfig,
) -> RedisResult<ClusterConnection> {
    // Cluster nodes only serve database 0.
    info.redis.db = 0;
    let mut builder = ClusterClientBuilder::new(vec![info]);
    if let Some(timeout) = config.connect_timeout {
        builder = builder.connection_timeout(timeout);
    }
    if let Some(certs) = certs {
        builder = builder.certs(certs);
    }
    builder.build()?.get_connection()
}

fn certificates(config: &ClientConfig) -> ConnectionResult<Option<redis::TlsCertificates>> {
    match &config.tls {
        Some(tls) => tls.certificates(),
        None => Ok(None),
    }
}

/// Whether the probed node is a standalone server rather than a cluster.
fn is_cluster_disabled(err: &RedisError) -> bool {
    err.to_string()
        .to_ascii_lowercase()
        .contains("cluster support disabled")
}
