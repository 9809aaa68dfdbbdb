//! Self-describing network addresses.
//!
//! A [`Multiaddr`] is a sequence of protocol components rendered as
//! `/proto/value/proto/value...`, e.g. `/ip4/127.0.0.1/tcp/4006`. The store
//! only needs equality, hashing, and text rendering; parsing validates the
//! component values so two spellings of the same address compare equal.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// A single multiaddr component.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Ip4(Ipv4Addr),
    Ip6(Ipv6Addr),
    Tcp(u16),
    Udp(u16),
    Dns(String),
    Dns4(String),
    Dns6(String),
    Quic,
    Ws,
    Wss,
}

impl Protocol {
    fn name(&self) -> &'static str {
        match self {
            Self::Ip4(_) => "ip4",
            Self::Ip6(_) => "ip6",
            Self::Tcp(_) => "tcp",
            Self::Udp(_) => "udp",
            Self::Dns(_) => "dns",
            Self::Dns4(_) => "dns4",
            Self::Dns6(_) => "dns6",
            Self::Quic => "quic",
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name())?;
        match self {
            Self::Ip4(ip) => write!(f, "/{ip}"),
            Self::Ip6(ip) => write!(f, "/{ip}"),
            Self::Tcp(port) | Self::Udp(port) => write!(f, "/{port}"),
            Self::Dns(host) | Self::Dns4(host) | Self::Dns6(host) => write!(f, "/{host}"),
            Self::Quic | Self::Ws | Self::Wss => Ok(()),
        }
    }
}

/// A parsed, validated network address.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Multiaddr {
    components: Vec<Protocol>,
}

impl Multiaddr {
    /// Build an address from already-validated components.
    pub fn from_components(components: Vec<Protocol>) -> Self {
        Self { components }
    }

    /// The address components in order.
    pub fn components(&self) -> &[Protocol] {
        &self.components
    }

    /// Append a component, returning the extended address.
    pub fn with(mut self, protocol: Protocol) -> Self {
        self.components.push(protocol);
        self
    }

    /// Returns `true` if the address has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

fn invalid(addr: &str, reason: impl Into<String>) -> TypeError {
    TypeError::InvalidMultiaddr {
        addr: addr.to_string(),
        reason: reason.into(),
    }
}

impl FromStr for Multiaddr {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| invalid(s, "must start with '/'"))?;
        let mut parts = rest.split('/');
        let mut components = Vec::new();

        while let Some(name) = parts.next() {
            if name.is_empty() {
                if components.is_empty() && rest.is_empty() {
                    break;
                }
                return Err(invalid(s, "empty protocol name"));
            }
            let mut value = |what: &str| {
                parts
                    .next()
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| invalid(s, format!("missing {what} value")))
            };
            let component = match name {
                "ip4" => Protocol::Ip4(
                    value("ip4")?
                        .parse()
                        .map_err(|_| invalid(s, "bad ip4 address"))?,
                ),
                "ip6" => Protocol::Ip6(
                    value("ip6")?
                        .parse()
                        .map_err(|_| invalid(s, "bad ip6 address"))?,
                ),
                "tcp" => Protocol::Tcp(
                    value("tcp")?
                        .parse()
                        .map_err(|_| invalid(s, "bad tcp port"))?,
                ),
                "udp" => Protocol::Udp(
                    value("udp")?
                        .parse()
                        .map_err(|_| invalid(s, "bad udp port"))?,
                ),
                "dns" => Protocol::Dns(value("dns")?.to_string()),
                "dns4" => Protocol::Dns4(value("dns4")?.to_string()),
                "dns6" => Protocol::Dns6(value("dns6")?.to_string()),
                "quic" => Protocol::Quic,
                "ws" => Protocol::Ws,
                "wss" => Protocol::Wss,
                other => return Err(invalid(s, format!("unknown protocol {other:?}"))),
            };
            components.push(component);
        }

        if components.is_empty() {
            return Err(invalid(s, "no components"));
        }
        Ok(Self { components })
    }
}

impl fmt::Display for Multiaddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.components {
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Multiaddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiaddr({self})")
    }
}

impl Serialize for Multiaddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Multiaddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
