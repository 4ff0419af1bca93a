//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// SMB protocol-version family a probe talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
    /// Legacy SMB1 (CIFS) family
    V1,
    /// Current SMB2/SMB3 family
    V2_3,
}

impl ProtocolVersion {
    /// Select the family from a raw selector string.
    ///
    /// Only the literal `v1`, in any case, selects the legacy family. Every
    /// other value, including the empty string, selects the current family.
    pub fn from_selector(selector: &str) -> Self {
        if selector.eq_ignore_ascii_case("v1") {
            Self::V1
        } else {
            Self::V2_3
        }
    }

    /// Canonical selector string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "V1",
            Self::V2_3 => "V2_3",
        }
    }

    /// Human-readable family name
    pub fn family_name(&self) -> &'static str {
        match self {
            Self::V1 => "SMB1",
            Self::V2_3 => "SMB2/3",
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::V1)
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::V2_3
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three timed operations, in the order an iteration runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeOperation {
    Exists,
    IsDirectory,
    Length,
}

impl ProbeOperation {
    pub const ALL: [ProbeOperation; 3] = [Self::Exists, Self::IsDirectory, Self::Length];

    /// Label used in reports and charts
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exists => "Exists",
            Self::IsDirectory => "IsDirectory",
            Self::Length => "Length",
        }
    }

    /// Method-style name used in log messages
    pub fn call_name(&self) -> &'static str {
        match self {
            Self::Exists => "exists()",
            Self::IsDirectory => "isDirectory()",
            Self::Length => "length()",
        }
    }
}

impl fmt::Display for ProbeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
