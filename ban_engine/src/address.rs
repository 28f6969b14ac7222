//! Network address criteria for bans

use crate::errors::*;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::{Deserialize, Serialize};
use std::{fmt, net::IpAddr, str::FromStr};
use thiserror::Error;

/// Number of leading bits occupied by the `::ffff:0:0/96` prefix of an
/// IPv4-mapped IPv6 address
const MAPPED_PREFIX_BITS: u8 = 96;

/// Error type denoting an unparseable address mask was supplied
#[derive(Debug, Clone, Error)]
#[error("Invalid ban address mask")]
pub struct InvalidAddressMask;

/// Return the address in the form it would take on an IPv4-only socket, if
/// it is an IPv4 address that arrived in IPv4-mapped IPv6 form. Other
/// addresses are returned unchanged.
pub fn canonical_address(address: IpAddr) -> IpAddr {
    match address {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(address, IpAddr::V4),
        IpAddr::V4(_) => address,
    }
}

/// An IP network that a ban applies to.
///
/// IPv4 addresses supplied in IPv4-mapped IPv6 form are stored in plain
/// IPv4 form with the prefix length reduced to match, so a ban taken from a
/// dual-stack listener compares equal to the same ban taken from an
/// IPv4-only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IpNet", into = "IpNet")]
pub struct AddressCriterion(IpNet);

impl AddressCriterion {
    /// Build a criterion from a raw address and CIDR prefix length.
    pub fn normalize(address: IpAddr, prefix_len: u8) -> BanResult<Self> {
        let invalid = || BanError::InvalidPrefix {
            address,
            prefix: prefix_len,
        };

        let net = match address {
            IpAddr::V4(v4) => IpNet::V4(Ipv4Net::new(v4, prefix_len).map_err(|_| invalid())?),
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => {
                    let prefix_len = prefix_len
                        .checked_sub(MAPPED_PREFIX_BITS)
                        .ok_or_else(invalid)?;
                    IpNet::V4(Ipv4Net::new(v4, prefix_len).map_err(|_| invalid())?)
                }
                None => IpNet::V6(Ipv6Net::new(v6, prefix_len).map_err(|_| invalid())?),
            },
        };

        Ok(Self(net))
    }

    /// Build a criterion that matches exactly one address
    pub fn exact(address: IpAddr) -> Self {
        Self(IpNet::from(canonical_address(address)))
    }

    /// The stored network address, as supplied (host bits are not cleared)
    pub fn address(&self) -> IpAddr {
        self.0.addr()
    }

    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    pub fn network(&self) -> IpNet {
        self.0
    }

    /// Whether this criterion covers only a single address
    pub fn is_exact(&self) -> bool {
        self.0.prefix_len() == self.0.max_prefix_len()
    }

    /// Determine whether the given address falls inside this network.
    ///
    /// Addresses of the other family never match; that is not an error.
    pub fn contains(&self, candidate: &IpAddr) -> bool {
        self.0.contains(&canonical_address(*candidate))
    }
}

impl TryFrom<IpNet> for AddressCriterion {
    type Error = BanError;

    fn try_from(net: IpNet) -> BanResult<Self> {
        Self::normalize(net.addr(), net.prefix_len())
    }
}

impl From<AddressCriterion> for IpNet {
    fn from(criterion: AddressCriterion) -> Self {
        criterion.0
    }
}

impl FromStr for AddressCriterion {
    type Err = InvalidAddressMask;

    /// Parse either a bare address (matching only that address) or
    /// `address/prefix` CIDR notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((addr, prefix)) => {
                let addr = IpAddr::from_str(addr).map_err(|_| InvalidAddressMask)?;
                let prefix = u8::from_str(prefix).map_err(|_| InvalidAddressMask)?;
                Self::normalize(addr, prefix).map_err(|_| InvalidAddressMask)
            }
            None => Ok(Self::exact(IpAddr::from_str(s).map_err(|_| InvalidAddressMask)?)),
        }
    }
}

impl fmt::Display for AddressCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn ip(s: &str) -> IpAddr {
        IpAddr::from_str(s).unwrap()
    }

    #[test]
    fn mapped_address_folds_to_ipv4() {
        let mapped = AddressCriterion::normalize(ip("::ffff:203.0.113.5"), 128).unwrap();
        let plain = AddressCriterion::normalize(ip("203.0.113.5"), 32).unwrap();

        assert_eq!(mapped, plain);
        assert_eq!(mapped.address(), IpAddr::V4(Ipv4Addr::new(203, 0, 113, 5)));
        assert_eq!(mapped.prefix_len(), 32);
    }

    #[test]
    fn mapped_range_keeps_its_width() {
        for prefix in 96..=128u8 {
            let mapped = AddressCriterion::normalize(ip("::ffff:10.1.0.0"), prefix).unwrap();
            let plain = AddressCriterion::normalize(ip("10.1.0.0"), prefix - 96).unwrap();
            assert_eq!(mapped, plain);
        }
    }

    #[test]
    fn mapped_prefix_below_96_is_rejected() {
        let err = AddressCriterion::normalize(ip("::ffff:10.1.0.0"), 64).unwrap_err();
        assert_eq!(
            err,
            BanError::InvalidPrefix {
                address: ip("::ffff:10.1.0.0"),
                prefix: 64
            }
        );
    }

    #[test]
    fn oversized_prefix_is_rejected() {
        assert!(AddressCriterion::normalize(ip("10.0.0.1"), 33).is_err());
        assert!(AddressCriterion::normalize(ip("fc00::1"), 129).is_err());
        assert!(AddressCriterion::normalize(ip("::ffff:10.0.0.1"), 129).is_err());
    }

    #[test]
    fn native_ipv6_is_stored_as_given() {
        let criterion = AddressCriterion::normalize(ip("fc00:1:2:3::"), 64).unwrap();
        assert_eq!(criterion.address(), IpAddr::V6(Ipv6Addr::new(0xfc00, 1, 2, 3, 0, 0, 0, 0)));
        assert_eq!(criterion.prefix_len(), 64);
    }

    #[test]
    fn full_width_prefix_is_exact() {
        let criterion = AddressCriterion::normalize(ip("192.168.0.1"), 32).unwrap();
        assert!(criterion.is_exact());
        assert!(criterion.contains(&ip("192.168.0.1")));
        assert!(!criterion.contains(&ip("192.168.0.2")));
        assert!(!criterion.contains(&ip("192.168.0.0")));
    }

    #[test]
    fn zero_prefix_covers_the_whole_family() {
        let v4 = AddressCriterion::normalize(ip("0.0.0.0"), 0).unwrap();
        assert!(v4.contains(&ip("1.2.3.4")));
        assert!(v4.contains(&ip("255.255.255.255")));
        assert!(!v4.contains(&ip("::1")));

        let v6 = AddressCriterion::normalize(ip("::"), 0).unwrap();
        assert!(v6.contains(&ip("fc00::1")));
        assert!(!v6.contains(&ip("10.0.0.1")));
    }

    #[test]
    fn range_ignores_host_bits() {
        let criterion = AddressCriterion::normalize(ip("192.168.0.77"), 24).unwrap();
        assert!(criterion.contains(&ip("192.168.0.1")));
        assert!(criterion.contains(&ip("192.168.0.255")));
        assert!(!criterion.contains(&ip("192.168.1.1")));
    }

    #[test]
    fn family_mismatch_does_not_match() {
        let criterion = AddressCriterion::normalize(ip("fc00:1:2:3::"), 64).unwrap();
        assert!(!criterion.contains(&ip("10.0.0.1")));
    }

    #[test]
    fn mapped_candidate_matches_ipv4_criterion() {
        let criterion = AddressCriterion::normalize(ip("203.0.113.0"), 24).unwrap();
        assert!(criterion.contains(&ip("::ffff:203.0.113.9")));
    }

    #[test]
    fn parse_exact_and_cidr() {
        let exact = AddressCriterion::from_str("::ffff:192.168.0.1").unwrap();
        assert_eq!(exact, AddressCriterion::normalize(ip("192.168.0.1"), 32).unwrap());

        let range = AddressCriterion::from_str("fc00:1:2:3::/64").unwrap();
        assert_eq!(range.to_string(), "fc00:1:2:3::/64");

        assert!(AddressCriterion::from_str("192.168.0.0/40").is_err());
        assert!(AddressCriterion::from_str("not-an-address").is_err());
    }

    #[test]
    fn deserializing_applies_normalization() {
        let criterion: AddressCriterion = serde_json::from_str("\"::ffff:10.0.0.0/120\"").unwrap();
        assert_eq!(criterion.to_string(), "10.0.0.0/24");
        assert_eq!(serde_json::to_string(&criterion).unwrap(), "\"10.0.0.0/24\"");
    }
}
