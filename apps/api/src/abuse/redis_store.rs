use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Client as RedisClient;
use tracing::info;

use crate::abuse::store::{CounterStore, StoreError};

/// Redis-backed store. Each primitive is a single Redis command, so the
/// atomicity of `INCR` and `SET NX` carries over unchanged.
#[derive(Clone)]
pub struct RedisCounterStore {
    conn: MultiplexedConnection,
}

impl RedisCounterStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = RedisClient::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis counter store connected");
        Ok(Self { conn })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.conn.clone();
        let n = redis::cmd("INCR")
            .arg(key)
            .query_async::<_, i64>(&mut conn)
            .await?;
        Ok(n)
    }

    async fn increment_by(&self, key: &str, by: i64) -> Result<i64, StoreError> {
        let mut conn = self.conn.clone();
        let n = redis::cmd("INCRBY")
            .arg(key)
            .arg(by)
            .query_async::<_, i64>(&mut conn)
            .await?;
        Ok(n)
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("EXPIRE")
            .arg(key)
            .arg(ttl.as_secs())
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn create_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        // Reply is "OK" when set, nil when the key already existed.
        let reply = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async::<_, Option<String>>(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value = redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}
