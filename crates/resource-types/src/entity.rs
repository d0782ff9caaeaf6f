//! Entity capability

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// A record the pipeline can store, list and serve.
///
/// Identifiers and timestamps are owned by the store: whatever a client puts
/// in those fields is overwritten on create and update.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Storage collection (table) name
    const COLLECTION: &'static str;

    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);

    /// Ordering key for listings
    fn name(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    /// Set both persistence timestamps
    fn stamp(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>);

    /// Business validation of a client payload
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
