//! Defines the identifier types used by ban records

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

pub type LocalId = i64;

/// Identifies a stored ban record
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct BanId(LocalId);

impl BanId {
    pub fn new(id: LocalId) -> Self {
        Self(id)
    }

    pub fn local(&self) -> LocalId {
        self.0
    }
}

/// Identifies a stored unban record
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct UnbanId(LocalId);

impl UnbanId {
    pub fn new(id: LocalId) -> Self {
        Self(id)
    }

    pub fn local(&self) -> LocalId {
        self.0
    }
}

/// A player or admin account, as issued by the central authentication service
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for AccountId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// An opaque hardware fingerprint reported by the client.
///
/// The contents are never interpreted; two hardware IDs are the same only if
/// their bytes are identical.
#[derive(Eq, PartialEq, Clone, Hash, Serialize, Deserialize)]
pub struct HardwareId(Box<[u8]>);

impl HardwareId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into().into_boxed_slice())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for HardwareId {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Display for HardwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for HardwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardwareId({})", self)
    }
}
