//! Fingerprint registry.
//!
//! The registry maps DNA tokens to [`Certificate`]s and carries two
//! process-wide counters. The engine only talks to it through the
//! [`FingerprintRegistry`] trait, so the backing store can be swapped
//! without touching classification logic.
//!
//! ## Consistency
//!
//! - Writes to a single entry are atomic: readers see the old or the new
//!   certificate, never a mix.
//! - [`FingerprintRegistry::all`] returns a snapshot. Entries inserted while
//!   the snapshot is taken may or may not be part of it.
//! - Counter increments are atomic.

mod memory;

pub use memory::InMemoryRegistry;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::certificate::Certificate;

/// Registry failures. These are infrastructure errors, not caller errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Snapshot of the process-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCounters {
    pub verifications: u64,
    pub tamper_flags: u64,
}

/// Key-value store of DNA token -> certificate.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait FingerprintRegistry: Send + Sync {
    /// Look up a certificate by DNA token.
    async fn get(&self, dna: &str) -> Result<Option<Certificate>, RegistryError>;

    /// Store a certificate under its DNA token, replacing any previous entry.
    async fn put(&self, certificate: Certificate) -> Result<(), RegistryError>;

    /// Mark a certificate revoked.
    ///
    /// Returns `false` for unknown tokens. Revoking twice succeeds and keeps
    /// the first `revoked_at`.
    async fn revoke(&self, dna: &str, at: DateTime<Utc>) -> Result<bool, RegistryError>;

    /// Delete an entry outright.
    async fn remove(&self, dna: &str) -> Result<Option<Certificate>, RegistryError>;

    /// Snapshot of every certificate.
    async fn all(&self) -> Result<Vec<Certificate>, RegistryError>;

    /// Bump the verification counter, returning the new value.
    async fn increment_verification(&self) -> Result<u64, RegistryError>;

    /// Bump the tamper-flag counter, returning the new value.
    async fn increment_tamper_flag(&self) -> Result<u64, RegistryError>;

    async fn counters(&self) -> Result<RegistryCounters, RegistryError>;
}
