//! Defines errors returned by the other modules

use crate::id::*;
use std::net::IpAddr;
use thiserror::Error;

/// Structural errors raised while building or modifying a ban record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BanError {
    #[error("Must have at least one of banned account, banned address or hardware ID")]
    InvalidBanTarget,
    #[error("Prefix length {prefix} is out of range for address {address}")]
    InvalidPrefix { address: IpAddr, prefix: u8 },
    #[error("Ban {0:?} has already been reversed")]
    AlreadyUnbanned(Option<BanId>),
}

/// Convenience definition of a Result type for ban record operations
pub type BanResult<T> = std::result::Result<T, BanError>;

/// Types of error that can occur while looking up or updating stored bans
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("No such ban id {0:?}")]
    NoSuchBan(BanId),
    #[error("Ban id {0:?} is already in use")]
    DuplicateBan(BanId),
    #[error("No ban ids remain after {0:?}")]
    IdsExhausted(BanId),
    #[error(transparent)]
    Rejected(#[from] BanError),
}

/// Convenience definition of a Result type used to look up stored bans
pub type LookupResult<T> = std::result::Result<T, LookupError>;
