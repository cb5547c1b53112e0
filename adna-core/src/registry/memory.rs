//! In-memory registry.
//!
//! Certificates live in a sharded concurrent map; each entry is guarded by
//! its shard lock, so two concurrent revocations of the same token cannot
//! interleave their status and timestamp writes. Nothing is persisted.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use super::{FingerprintRegistry, RegistryCounters, RegistryError};
use crate::certificate::Certificate;

#[derive(Default)]
pub struct InMemoryRegistry {
    entries: DashMap<String, Certificate>,
    verifications: AtomicU64,
    tamper_flags: AtomicU64,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored certificates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl FingerprintRegistry for InMemoryRegistry {
    async fn get(&self, dna: &str) -> Result<Option<Certificate>, RegistryError> {
        Ok(self.entries.get(dna).map(|entry| entry.value().clone()))
    }

    async fn put(&self, certificate: Certificate) -> Result<(), RegistryError> {
        let dna = certificate.dna.clone();
        if self.entries.insert(dna.clone(), certificate).is_some() {
            debug!(dna = %dna, "Replaced existing certificate");
        }
        Ok(())
    }

    async fn revoke(&self, dna: &str, at: DateTime<Utc>) -> Result<bool, RegistryError> {
        match self.entries.get_mut(dna) {
            Some(mut entry) => {
                entry.revoke(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, dna: &str) -> Result<Option<Certificate>, RegistryError> {
        Ok(self.entries.remove(dna).map(|(_, certificate)| certificate))
    }

    async fn all(&self) -> Result<Vec<Certificate>, RegistryError> {
        Ok(self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn increment_verification(&self) -> Result<u64, RegistryError> {
        Ok(self.verifications.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn increment_tamper_flag(&self) -> Result<u64, RegistryError> {
        Ok(self.tamper_flags.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn counters(&self) -> Result<RegistryCounters, RegistryError> {
        Ok(RegistryCounters {
            verifications: self.verifications.load(Ordering::SeqCst),
            tamper_flags: self.tamper_flags.load(Ordering::SeqCst),
        })
    }
}

impl std::fmt::Debug for InMemoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRegistry")
            .field("entries", &self.entries.len())
            .field("verifications", &self.verifications.load(Ordering::Relaxed))
            .field("tamper_flags", &self.tamper_flags.load(Ordering::Relaxed))
            .finish()
    }
}
