//! Resource Catalog
//!
//! An immutable snapshot of one resource family's listing: the identifiers in
//! server order plus the full record behind each one. Request builders consult
//! catalogs for cross-resource existence checks.

use crate::api::client::VultrClient;
use crate::error::{Result, VultrError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Identifier types a catalog can be keyed by (string ids, integer ids)
pub trait CatalogKey: DeserializeOwned + Eq + Hash + Clone + Display + Debug {}

impl<T> CatalogKey for T where T: DeserializeOwned + Eq + Hash + Clone + Display + Debug {}

/// Cached listing of one resource family
#[derive(Debug, Clone)]
pub struct Catalog<K> {
    ids: Vec<K>,
    records: HashMap<K, Value>,
    reported_total: Option<u64>,
}

impl<K> Default for Catalog<K> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            records: HashMap::new(),
            reported_total: None,
        }
    }
}

/// One decoded page of a list endpoint
struct Page {
    items: Vec<Value>,
    total: Option<u64>,
    next_cursor: Option<String>,
}

fn decode_page(body: &str, key: &str) -> Result<Page> {
    let envelope: Value = serde_json::from_str(body)?;

    let items = envelope
        .get(key)
        .and_then(|v| v.as_array())
        .cloned()
        .ok_or_else(|| VultrError::MalformedResponse(format!("missing `{key}` array")))?;

    let total = envelope.pointer("/meta/total").and_then(|v| v.as_u64());

    let next_cursor = envelope
        .pointer("/meta/links/next")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    Ok(Page {
        items,
        total,
        next_cursor,
    })
}

impl<K: CatalogKey> Catalog<K> {
    /// List `path` and key every record of the `key` array by its `id`
    ///
    /// Follows `meta.links.next` cursors until the last page. Any failed page
    /// fails the whole load, and so does a cursor the server already handed out.
    pub async fn load(client: &VultrClient, path: &str, key: &str) -> Result<Self> {
        let mut items = Vec::new();
        let mut reported_total = None;
        let mut cursor: Option<String> = None;
        let mut visited: HashSet<String> = HashSet::new();

        loop {
            let body = client.get_page(path, cursor.as_deref()).await?;
            let page = decode_page(&body, key)?;

            if cursor.is_none() {
                reported_total = page.total;
            }
            items.extend(page.items);

            let Some(next) = page.next_cursor else {
                break;
            };
            if !visited.insert(next.clone()) {
                return Err(VultrError::MalformedResponse(format!(
                    "{key}: pagination cursor `{next}` repeated"
                )));
            }
            cursor = Some(next);
        }

        let mut catalog = Self::from_records(items)?;
        catalog.reported_total = reported_total;

        tracing::debug!("Loaded {} {} (reported total: {:?})", catalog.len(), key, reported_total);
        if !catalog.total_agrees() {
            tracing::warn!(
                "{}: loaded {} records but server reported {:?}",
                key,
                catalog.len(),
                reported_total
            );
        }

        Ok(catalog)
    }

    /// Build a catalog from already-decoded records
    pub fn from_records(records: impl IntoIterator<Item = Value>) -> Result<Self> {
        let mut catalog = Self::default();

        for record in records {
            let id = record
                .get("id")
                .cloned()
                .ok_or_else(|| VultrError::MalformedResponse("record without `id`".to_string()))?;
            let id: K = serde_json::from_value(id)
                .map_err(|e| VultrError::MalformedResponse(format!("unexpected `id`: {e}")))?;

            if catalog.records.insert(id.clone(), record).is_none() {
                catalog.ids.push(id);
            }
        }

        Ok(catalog)
    }

    /// Identifiers in server order
    pub fn ids(&self) -> &[K] {
        &self.ids
    }

    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.records.contains_key(id)
    }

    pub fn get<Q>(&self, id: &Q) -> Option<&Value>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.records.get(id)
    }

    /// Records in server order
    pub fn records(&self) -> impl Iterator<Item = &Value> {
        self.ids.iter().filter_map(|id| self.records.get(id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `meta.total` as reported by the server on the first page
    pub fn reported_total(&self) -> Option<u64> {
        self.reported_total
    }

    /// True when the server did not report a total or it matches the record count
    pub fn total_agrees(&self) -> bool {
        self.reported_total
            .map_or(true, |total| total == self.ids.len() as u64)
    }

    /// Existence check: fail with `message` when `id` is not cached
    pub fn require<Q>(&self, id: &Q, message: &str) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.contains(id) {
            Ok(())
        } else {
            Err(VultrError::invalid(message))
        }
    }

    /// String attribute of a cached record
    pub fn attr_str<Q>(&self, id: &Q, field: &str) -> Option<&str>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(id).and_then(|r| r.get(field)).and_then(|v| v.as_str())
    }

    /// Integer attribute of a cached record
    pub fn attr_u64<Q>(&self, id: &Q, field: &str) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(id).and_then(|r| r.get(field)).and_then(|v| v.as_u64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_records_keeps_server_order() {
        let catalog: Catalog<String> = Catalog::from_records(vec![
            json!({"id": "ewr", "city": "New Jersey"}),
            json!({"id": "ams", "city": "Amsterdam"}),
        ])
        .unwrap();

        assert_eq!(catalog.ids(), &["ewr".to_string(), "ams".to_string()]);
        assert_eq!(catalog.attr_str("ams", "city"), Some("Amsterdam"));
        assert!(catalog.total_agrees());
    }

    #[test]
    fn test_integer_ids() {
        let catalog: Catalog<u64> =
            Catalog::from_records(vec![json!({"id": 215, "name": "Ubuntu"})]).unwrap();
        assert!(catalog.contains(&215u64));
        assert!(!catalog.contains(&216u64));
    }

    #[test]
    fn test_record_without_id_is_rejected() {
        let result: Result<Catalog<String>> = Catalog::from_records(vec![json!({"name": "x"})]);
        assert!(matches!(result, Err(VultrError::MalformedResponse(_))));
    }

    #[test]
    fn test_id_type_mismatch_is_rejected() {
        let result: Result<Catalog<u64>> = Catalog::from_records(vec![json!({"id": "abc"})]);
        assert!(matches!(result, Err(VultrError::MalformedResponse(_))));
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let catalog: Catalog<String> =
            Catalog::from_records(vec![json!({"id": "a", "v": 1}), json!({"id": "a", "v": 2})])
                .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.attr_u64("a", "v"), Some(2));
    }

    #[test]
    fn test_require_reports_message() {
        let catalog: Catalog<String> = Catalog::default();
        let err = catalog.require("nope", "Invalid Region").unwrap_err();
        assert_eq!(err.to_string(), "invalid parameter: Invalid Region");
    }

    #[test]
    fn test_decode_page_reads_meta() {
        let body = r#"{"plans":[{"id":"vc2-1c-1gb"}],"meta":{"total":12,"links":{"next":"bmV4dA==","prev":""}}}"#;
        let page = decode_page(body, "plans").unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, Some(12));
        assert_eq!(page.next_cursor.as_deref(), Some("bmV4dA=="));
    }

    #[test]
    fn test_decode_page_empty_next_means_last() {
        let body = r#"{"os":[],"meta":{"total":0,"links":{"next":"","prev":""}}}"#;
        let page = decode_page(body, "os").unwrap();
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_decode_page_missing_key() {
        let body = r#"{"meta":{"total":0}}"#;
        assert!(matches!(
            decode_page(body, "regions"),
            Err(VultrError::MalformedResponse(_))
        ));
    }
}
