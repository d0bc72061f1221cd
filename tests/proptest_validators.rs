//! Property-based tests using proptest
//!
//! These tests check the field validators and a few request builders
//! against randomized inputs.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::net::Ipv4Addr;
use vultr_client::resources::block_storage::CreateBlock;
use vultr_client::resources::private_networks::CreatePrivateNetwork;
use vultr_client::resources::{random_hostname, Catalogs, HOSTNAME_LENGTH};
use vultr_client::validate::{self, PortSpec};
use vultr_client::Catalog;

fn catalogs() -> Catalogs {
    Catalogs {
        regions: Catalog::from_records(vec![
            json!({"id": "ewr", "options": ["block_storage"]}),
            json!({"id": "ams", "options": []}),
        ])
        .unwrap(),
        ..Catalogs::default()
    }
}

fn expected_private(addr: Ipv4Addr) -> bool {
    let [a, b, ..] = addr.octets();
    a == 10 || a == 127 || (a == 172 && (16..=31).contains(&b)) || (a == 192 && b == 168)
}

proptest! {
    /// Any single port in range parses to itself
    #[test]
    fn single_port_roundtrips(port in any::<u16>()) {
        prop_assert_eq!(
            validate::parse_port_expression(&port.to_string()).unwrap(),
            PortSpec::Single(port)
        );
    }

    /// Ordered ranges are accepted with either separator
    #[test]
    fn ordered_ranges_accepted(a in any::<u16>(), b in any::<u16>(), colon in any::<bool>()) {
        let (low, high) = (a.min(b), a.max(b));
        let sep = if colon { ':' } else { '-' };
        let spec = validate::parse_port_expression(&format!("{low}{sep}{high}")).unwrap();

        if low == high {
            prop_assert_eq!(spec, PortSpec::Single(low));
        } else {
            prop_assert_eq!(spec, PortSpec::Range { low, high });
            let shown = format!("{low}:{high}");
            prop_assert_eq!(spec.to_string(), shown);
        }
    }

    /// Inverted ranges are always rejected
    #[test]
    fn inverted_ranges_rejected(a in any::<u16>(), b in any::<u16>()) {
        prop_assume!(a != b);
        let (low, high) = (a.min(b), a.max(b));
        let expr = format!("{high}:{low}");
        prop_assert!(validate::parse_port_expression(&expr).is_err());
    }

    /// Ports past 65535 are rejected
    #[test]
    fn oversized_ports_rejected(port in 65536u64..10_000_000) {
        prop_assert!(validate::parse_port_expression(&port.to_string()).is_err());
        let range = format!("1:{port}");
        prop_assert!(validate::parse_port_expression(&range).is_err());
    }

    /// Parsing the display form yields the same port expression
    #[test]
    fn display_form_reparses(a in any::<u16>(), b in any::<u16>()) {
        let spec = validate::parse_port_expression(&format!("{}:{}", a.min(b), a.max(b))).unwrap();
        prop_assert_eq!(validate::parse_port_expression(&spec.to_string()).unwrap(), spec);
    }

    /// Private detection agrees with the RFC1918 and loopback octet rules
    #[test]
    fn private_ipv4_matches_octets(raw in any::<u32>()) {
        let addr = Ipv4Addr::from(raw);
        prop_assert_eq!(validate::is_private_ipv4(&addr.to_string()), expected_private(addr));
    }

    /// Non-address strings are never private
    #[test]
    fn garbage_is_not_private(s in "[a-z .]{0,20}") {
        prop_assert!(!validate::is_private_ipv4(&s));
    }

    /// Generated hostnames have a fixed length and charset
    #[test]
    fn hostnames_are_lowercase_alphanumeric(seed in any::<u64>()) {
        let name = random_hostname(&mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(name.len(), HOSTNAME_LENGTH);
        prop_assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    /// Block sizes are accepted exactly within 10..=10000
    #[test]
    fn block_size_bounds(size in -100i64..20_000) {
        let opts = CreateBlock { size: Some(size), ..CreateBlock::default() };
        prop_assert_eq!(opts.build(&catalogs()).is_ok(), (10..=10_000).contains(&size));
    }

    /// Building twice from the same inputs yields the same body
    #[test]
    fn private_network_build_is_deterministic(c in any::<u8>(), mask in 0u8..40) {
        let opts = CreatePrivateNetwork {
            region: "ewr".to_string(),
            subnet: format!("10.{c}.0.0"),
            mask: Some(mask),
            description: None,
        };
        let first = opts.build(&catalogs());
        let second = opts.build(&catalogs());

        prop_assert_eq!(first.is_ok(), (1..=31).contains(&mask));
        if let (Ok(a), Ok(b)) = (first, second) {
            prop_assert_eq!(a, b);
        }
    }
}
