//! Remote probe clients
//!
//! A probe performs one remote check per call and reports how long it took.
//! Every call sets up its own connection and session; nothing is reused
//! between calls, so each latency includes the full connect and mount cost.

pub mod smb1;
pub mod smb2;
pub mod timing;

pub use smb1::Smb1Probe;
pub use smb2::Smb2Probe;
pub use timing::PhaseTimer;

use crate::error::Result;
use crate::logging::ProbeLogger;
use crate::models::{Config, Timed};
use crate::types::ProtocolVersion;
use async_trait::async_trait;
use std::sync::Arc;

/// Timed remote checks against the configured share
#[async_trait]
pub trait RemoteProbe: Send + Sync {
    /// Protocol family this probe speaks
    fn family(&self) -> ProtocolVersion;

    /// Whether `file_name` resolves to a file or a directory
    async fn exists(&self, config: &Config) -> Result<Timed<bool>>;

    /// Whether `dir_name` resolves to a directory
    async fn is_directory(&self, config: &Config) -> Result<Timed<bool>>;

    /// Size in bytes of `file_name`
    async fn length(&self, config: &Config) -> Result<Timed<u64>>;
}

/// One probe per protocol family
pub struct ProbeRegistry {
    current: Box<dyn RemoteProbe>,
    legacy: Box<dyn RemoteProbe>,
}

impl ProbeRegistry {
    pub fn new(current: Box<dyn RemoteProbe>, legacy: Box<dyn RemoteProbe>) -> Self {
        Self { current, legacy }
    }

    /// Registry backed by the real SMB clients
    pub fn smb(logger: Arc<ProbeLogger>) -> Self {
        Self::new(
            Box::new(Smb2Probe::new(Arc::clone(&logger))),
            Box::new(Smb1Probe::new(logger)),
        )
    }

    /// Probe for the selected protocol family
    pub fn probe_for(&self, version: ProtocolVersion) -> &dyn RemoteProbe {
        match version {
            ProtocolVersion::V1 => self.legacy.as_ref(),
            ProtocolVersion::V2_3 => self.current.as_ref(),
        }
    }
}

/// Normalise a configured target to a share-relative path with `sep` separators
pub(crate) fn share_relative(target: &str, sep: char) -> String {
    target
        .trim_start_matches(['/', '\\'])
        .chars()
        .map(|c| if c == '/' || c == '\\' { sep } else { c })
        .collect()
}
