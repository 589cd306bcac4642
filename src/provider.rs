//! Provider Registry Records
//!
//! A provider is an independent operator selling storage capacity on the
//! marketplace, identified by its endpoint and self-declared capabilities.
//! Records are immutable once registered except via explicit re-registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of storage a provider offers, which selects the probe suite
/// used to benchmark it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageKind {
    /// Raw block storage
    Block,
    /// Object/blob storage
    Object,
    /// Content-addressed storage (IPFS-style pin/resolve/retrieve)
    ContentAddressed,
    /// Mixed block + object offering
    Hybrid,
}

impl StorageKind {
    /// Content-addressed providers get the pin/resolve/retrieve suite
    /// instead of the block/object suite.
    pub fn is_content_addressed(&self) -> bool {
        matches!(self, StorageKind::ContentAddressed)
    }
}

/// Capabilities a provider declares at registration time. Deviation between
/// these claims and measured values drives the reputation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclaredCapabilities {
    /// Declared usable capacity in GB (0 = not declared)
    pub capacity_gb: f64,
    /// Declared sustained IOPS (0 = not declared)
    pub iops: f64,
    /// Declared sustained throughput in MB/s (0 = not declared)
    pub throughput_mbps: f64,
}

/// A registered storage provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Marketplace-wide unique provider id
    pub id: String,
    /// Human-readable operator name
    pub name: String,
    /// Base URL of the provider's benchmark endpoint surface
    pub endpoint: String,
    /// Storage kind, selects the probe suite
    pub kind: StorageKind,
    /// Self-declared capabilities
    pub declared: DeclaredCapabilities,
    /// Operator-reported region (informational)
    pub region: String,
    /// When this record was (re-)registered
    pub registered_at: DateTime<Utc>,
}
