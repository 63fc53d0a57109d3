//! Remote store connection pool
//!
//! Hands each in-flight upload task an exclusive store connection.
//! Connections are created lazily through the factory and returned to
//! the pool on drop, up to the configured capacity.

use crate::error::Result;
use crate::remote::RemoteStore;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Factory producing fresh store connections
pub type StoreFactory<R> = Box<dyn Fn() -> Result<R> + Send + Sync>;

/// Pool of remote store connections
pub struct StorePool<R: RemoteStore> {
    connections: Mutex<VecDeque<R>>,
    capacity: usize,
    factory: StoreFactory<R>,
}

impl<R: RemoteStore> StorePool<R> {
    /// Create a pool that keeps at most `capacity` idle connections
    pub fn new<F>(capacity: usize, factory: F) -> Self
    where
        F: Fn() -> Result<R> + Send + Sync + 'static,
    {
        Self {
            connections: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            factory: Box::new(factory),
        }
    }

    /// Get a connection, reusing an idle one when available
    pub fn get(&self) -> Result<PooledStore<'_, R>> {
        let idle = {
            let mut pool = self.connections.lock().unwrap();
            pool.pop_front()
        };

        let connection = match idle {
            Some(c) => c,
            None => (self.factory)()?,
        };

        Ok(PooledStore {
            pool: self,
            connection: Some(connection),
        })
    }

    /// Number of idle connections currently held
    pub fn idle(&self) -> usize {
        self.connections.lock().unwrap().len()
    }

    fn return_connection(&self, connection: R) {
        let mut pool = self.connections.lock().unwrap();
        if pool.len() < self.capacity {
            pool.push_back(connection);
        }
    }
}

/// Pooled connection wrapper, returned to the pool on drop
pub struct PooledStore<'a, R: RemoteStore> {
    pool: &'a StorePool<R>,
    connection: Option<R>,
}

impl<R: RemoteStore> PooledStore<'_, R> {
    /// Get mutable access to the connection
    pub fn get_mut(&mut self) -> &mut R {
        self.connection
            .as_mut()
            .expect("connection taken before drop")
    }
}

impl<R: RemoteStore> Drop for PooledStore<'_, R> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.return_connection(connection);
        }
    }
}
