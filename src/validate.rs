//! Field validators
//!
//! Small predicates shared by the request builders. Each one either passes or
//! returns [`VultrError::InvalidParameter`] carrying the reason for the failing
//! field. Builders call them in a fixed order and stop at the first failure.

use crate::error::{Result, VultrError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::RangeInclusive;
use std::sync::LazyLock;

/// Highest TCP/UDP port number
pub const MAX_PORT: u16 = 65535;

/// Algorithms accepted for uploaded SSH keys
pub const SSH_ALGORITHMS: &[&str] = &["ssh-rsa", "ssh-dss"];

/// Port expression: a single port, `port-`/`port:` (open-ended) or `low:high`
static PORT_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)([:-]?)(\d+)?$").expect("PORT_EXPRESSION is a valid regex pattern")
});

/// Loose domain shape: optional sub-label, label, 2-7 letter TLD. Not anchored.
static DOMAIN_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9a-z-]+\.)?[0-9a-z-]+\.[a-z]{2,7}").expect("DOMAIN_SHAPE is a valid regex pattern")
});

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$",
    )
    .expect("EMAIL_REGEX is a valid regex pattern")
});

/// RFC1918 blocks plus loopback, as inclusive numeric ranges
const PRIVATE_RANGES: [(Ipv4Addr, Ipv4Addr); 4] = [
    (Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(10, 255, 255, 255)),
    (Ipv4Addr::new(172, 16, 0, 0), Ipv4Addr::new(172, 31, 255, 255)),
    (Ipv4Addr::new(192, 168, 0, 0), Ipv4Addr::new(192, 168, 255, 255)),
    (Ipv4Addr::new(127, 0, 0, 0), Ipv4Addr::new(127, 255, 255, 255)),
];

/// Parsed firewall port expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSpec {
    Single(u16),
    Range { low: u16, high: u16 },
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(port) => write!(f, "{port}"),
            Self::Range { low, high } => write!(f, "{low}:{high}"),
        }
    }
}

fn parse_port(digits: &str, message: &str) -> Result<u16> {
    // Anything that overflows u64 is out of range as well
    digits
        .parse::<u64>()
        .ok()
        .and_then(|port| u16::try_from(port).ok())
        .ok_or_else(|| VultrError::invalid(message))
}

/// Parse a firewall port expression
///
/// `"80"` is a single port, `"80-"` or `"80:"` opens the range up to 65535,
/// `"80:443"` / `"80-443"` is a range whose bounds must be ordered, and
/// `"443:443"` collapses to a single port.
pub fn parse_port_expression(expr: &str) -> Result<PortSpec> {
    let caps = PORT_EXPRESSION
        .captures(expr)
        .ok_or_else(|| VultrError::invalid("Port Value Invalid"))?;

    let Some(high) = caps.get(3) else {
        let port = parse_port(&caps[1], "Invalid Port - Must be between 0 and 65535")?;
        let open_ended = !caps[2].is_empty();
        return Ok(if open_ended && port < MAX_PORT {
            PortSpec::Range {
                low: port,
                high: MAX_PORT,
            }
        } else {
            PortSpec::Single(port)
        });
    };

    let low = parse_port(&caps[1], "Port values must be between 0 and 65535")?;
    let high = parse_port(high.as_str(), "Port values must be between 0 and 65535")?;

    if low > high {
        return Err(VultrError::invalid(
            "The first port can't be greater than the second port",
        ));
    }

    Ok(if low == high {
        PortSpec::Single(low)
    } else {
        PortSpec::Range { low, high }
    })
}

/// Structural check of an OpenSSH public key line (`<algorithm> <base64> [comment]`)
///
/// The key body must decode, and the algorithm name embedded in its first
/// 16 base64 characters must equal the declared algorithm.
pub fn validate_ssh_key(value: &str) -> Result<()> {
    let mut parts = value.splitn(3, ' ');
    let algorithm = parts.next().unwrap_or_default();
    let Some(key) = parts.next() else {
        return Err(VultrError::invalid(
            "Key is not a valid SSH Key: expected '<algorithm> <key> [comment]'",
        ));
    };

    if !SSH_ALGORITHMS.contains(&algorithm) {
        return Err(VultrError::invalid(format!(
            "Key is not a valid SSH Key: unsupported algorithm '{algorithm}'"
        )));
    }

    if STANDARD.decode(key).is_err() {
        return Err(VultrError::invalid(
            "Key is not a valid SSH Key: key body is not base64",
        ));
    }

    let prefix: String = key.chars().take(16).collect();
    let embedded: String = STANDARD
        .decode(prefix.as_bytes())
        .unwrap_or_default()
        .into_iter()
        .filter(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-')
        .map(char::from)
        .collect();

    if embedded != algorithm {
        return Err(VultrError::invalid(
            "Key is not a valid SSH Key: key body does not match its algorithm",
        ));
    }

    Ok(())
}

/// True when `ip` is an IPv4 literal inside an RFC1918 block or loopback
pub fn is_private_ipv4(ip: &str) -> bool {
    let Ok(addr) = ip.parse::<Ipv4Addr>() else {
        return false;
    };
    let value = u32::from(addr);

    PRIVATE_RANGES
        .iter()
        .any(|(start, end)| value >= u32::from(*start) && value <= u32::from(*end))
}

pub fn is_ipv4(ip: &str) -> bool {
    ip.parse::<Ipv4Addr>().is_ok()
}

pub fn is_ipv6(ip: &str) -> bool {
    ip.parse::<Ipv6Addr>().is_ok()
}

pub fn is_ip(ip: &str) -> bool {
    ip.parse::<IpAddr>().is_ok()
}

/// Loose domain check used for DNS zone names
pub fn validate_domain(domain: &str) -> Result<()> {
    if DOMAIN_SHAPE.is_match(domain) {
        Ok(())
    } else {
        Err(VultrError::invalid("Domain is not valid"))
    }
}

/// Structural domain check: at most 253 characters, labels of 1 to 63
pub fn is_valid_hostname(name: &str) -> bool {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() || name.len() > 253 {
        return false;
    }
    name.split('.').all(|label| !label.is_empty() && label.len() <= 63)
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Enum membership
pub fn require_one_of(value: &str, allowed: &[&str], message: &str) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(VultrError::invalid(message))
    }
}

/// Numeric range, bounds inclusive
pub fn require_range(value: i64, range: RangeInclusive<i64>, message: &str) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(VultrError::invalid(message))
    }
}

/// Minimum length in characters
pub fn require_min_len(value: &str, min: usize, message: &str) -> Result<()> {
    if value.chars().count() >= min {
        Ok(())
    } else {
        Err(VultrError::invalid(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_line(algorithm: &str) -> String {
        let mut blob = Vec::new();
        blob.extend_from_slice(&(algorithm.len() as u32).to_be_bytes());
        blob.extend_from_slice(algorithm.as_bytes());
        blob.extend_from_slice(&[0, 0, 0, 3, 1, 0, 1, 0, 0, 1, 1, 0, 0xc3, 0x5a]);
        format!("{} {} user@host", algorithm, STANDARD.encode(blob))
    }

    #[test]
    fn test_single_port() {
        assert_eq!(parse_port_expression("80").unwrap(), PortSpec::Single(80));
        assert_eq!(parse_port_expression("80").unwrap().to_string(), "80");
    }

    #[test]
    fn test_open_ended_port() {
        assert_eq!(parse_port_expression("80-").unwrap().to_string(), "80:65535");
        assert_eq!(parse_port_expression("8000:").unwrap().to_string(), "8000:65535");
        assert_eq!(parse_port_expression("65535-").unwrap(), PortSpec::Single(65535));
    }

    #[test]
    fn test_port_range() {
        assert_eq!(parse_port_expression("80:443").unwrap().to_string(), "80:443");
        assert_eq!(parse_port_expression("80-443").unwrap().to_string(), "80:443");
        assert_eq!(parse_port_expression("443:443").unwrap(), PortSpec::Single(443));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = parse_port_expression("443:80").unwrap_err();
        assert!(err.to_string().contains("first port"));
    }

    #[test]
    fn test_out_of_range_ports_rejected() {
        assert!(parse_port_expression("70000").is_err());
        assert!(parse_port_expression("80:70000").is_err());
        assert!(parse_port_expression("99999999999999999999999").is_err());
    }

    #[test]
    fn test_malformed_port_rejected() {
        for expr in ["", "http", "80,443", "-80", "80::443", " 80"] {
            let err = parse_port_expression(expr).unwrap_err();
            assert_eq!(err.to_string(), "invalid parameter: Port Value Invalid", "{expr}");
        }
    }

    #[test]
    fn test_rsa_and_dss_keys_pass() {
        assert!(validate_ssh_key(&key_line("ssh-rsa")).is_ok());
        assert!(validate_ssh_key(&key_line("ssh-dss")).is_ok());
    }

    #[test]
    fn test_key_without_comment_passes() {
        let line = key_line("ssh-rsa");
        let without_comment = line.rsplit_once(' ').unwrap().0;
        assert!(validate_ssh_key(without_comment).is_ok());
    }

    #[test]
    fn test_ed25519_rejected() {
        let err = validate_ssh_key(&key_line("ssh-ed25519")).unwrap_err();
        assert!(err.to_string().contains("unsupported algorithm"));
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let rsa = key_line("ssh-rsa");
        let body = rsa.split(' ').nth(1).unwrap();
        let forged = format!("ssh-dss {body}");
        assert!(validate_ssh_key(&forged).is_err());
    }

    #[test]
    fn test_bad_base64_rejected() {
        assert!(validate_ssh_key("ssh-rsa not*base64").is_err());
        assert!(validate_ssh_key("ssh-rsa").is_err());
    }

    #[test]
    fn test_private_ipv4() {
        assert!(is_private_ipv4("10.0.0.5"));
        assert!(is_private_ipv4("192.168.1.1"));
        assert!(is_private_ipv4("172.16.0.1"));
        assert!(is_private_ipv4("172.31.255.255"));
        assert!(is_private_ipv4("127.0.0.1"));
        assert!(!is_private_ipv4("8.8.8.8"));
        assert!(!is_private_ipv4("172.32.0.1"));
        assert!(!is_private_ipv4("172.15.255.255"));
        assert!(!is_private_ipv4("fd00::1"));
        assert!(!is_private_ipv4("10.0.0"));
    }

    #[test]
    fn test_domain_shape_is_loose() {
        assert!(validate_domain("example.com").is_ok());
        assert!(validate_domain("www.example.co.uk").is_ok());
        assert!(validate_domain("localhost").is_err());
        assert!(validate_domain("EXAMPLE.COM").is_err());
    }

    #[test]
    fn test_hostname_structure() {
        assert!(is_valid_hostname("host.example.com"));
        assert!(is_valid_hostname("host.example.com."));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("a..b"));
        assert!(!is_valid_hostname(&format!("{}.com", "a".repeat(64))));
    }

    #[test]
    fn test_ip_families() {
        assert!(is_ipv4("203.0.113.7"));
        assert!(!is_ipv4("2001:db8::1"));
        assert!(is_ipv6("2001:db8::1"));
        assert!(is_ip("2001:db8::1"));
        assert!(!is_ip("300.1.1.1"));
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("ops@example.com"));
        assert!(!is_valid_email("ops@"));
        assert!(!is_valid_email("not-an-email"));
    }

    #[test]
    fn test_range_and_enum_helpers() {
        assert!(require_range(24, 0..=24, "Hour is invalid").is_ok());
        assert!(require_range(25, 0..=24, "Hour is invalid").is_err());
        assert!(require_one_of("v4", &["v4", "v6"], "Invalid IP Type").is_ok());
        assert!(require_one_of("v5", &["v4", "v6"], "Invalid IP Type").is_err());
        assert!(require_min_len("abcd", 4, "too short").is_ok());
        assert!(require_min_len("abc", 4, "too short").is_err());
    }
}
