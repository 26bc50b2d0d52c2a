//! Best-effort client for the external block-explorer API.
//!
//! Two read-only endpoints are consumed: internal transactions of the
//! factory (token-creation discovery) and per-address metadata (catalog
//! enrichment). Both are strictly best-effort: non-success responses and
//! malformed payloads degrade to empty results, never propagate.

use alloy::primitives::Address;
use itertools::Itertools;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Attempts per explorer read before degrading to an empty result.
pub const DEFAULT_RETRIES: u32 = 2;

/// Internal transaction as reported by the explorer.
#[derive(Clone, Debug, Deserialize)]
pub struct InternalTransaction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub created_contract: Option<AddressParam>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AddressParam {
    pub hash: String,
}

#[derive(Debug, Default, Deserialize)]
struct InternalTransactionPage {
    #[serde(default)]
    items: Vec<InternalTransaction>,
}

/// Metadata the explorer holds for an address.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AddressInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub creator_address_hash: Option<String>,
    #[serde(default)]
    pub creation_timestamp: Option<u64>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
}

/// HTTP client for the explorer API.
#[derive(Clone, Debug)]
pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl ExplorerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http: reqwest::Client::new(), base_url, retries: DEFAULT_RETRIES }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    /// Internal transactions of `address`. Empty on any failure.
    pub async fn internal_transactions(&self, address: Address) -> Vec<InternalTransaction> {
        let url = format!("{}/addresses/{address}/internal-transactions", self.base_url);
        self.get_json::<InternalTransactionPage>(&url)
            .await
            .map(|page| page.items)
            .unwrap_or_default()
    }

    /// Metadata for `address`. `None` on any failure.
    pub async fn address_info(&self, address: Address) -> Option<AddressInfo> {
        let url = format!("{}/addresses/{address}", self.base_url);
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        for attempt in 0..=self.retries {
            match self.http.get(url).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.json::<T>().await {
                        Ok(value) => return Some(value),
                        Err(err) => {
                            // Malformed payloads are not retried: the next
                            // poll re-reads anyway.
                            tracing::warn!(url, %err, "malformed explorer response");
                            return None;
                        },
                    }
                },
                Ok(response) => {
                    tracing::debug!(url, status = %response.status(), attempt, "explorer returned non-success");
                },
                Err(err) => {
                    tracing::debug!(url, %err, attempt, "explorer request failed");
                },
            }
        }
        None
    }
}

/// Token addresses created by the factory according to explorer-observed
/// internal transactions.
///
/// Keeps `create`-typed entries only, drops the factory's own deployment,
/// and deduplicates: a replayed creation event is idempotent.
pub fn creation_candidates(items: &[InternalTransaction], factory: Address) -> Vec<Address> {
    items
        .iter()
        .filter(|tx| tx.kind == "create")
        .filter_map(|tx| tx.created_contract.as_ref())
        .filter_map(|created| created.hash.parse::<Address>().ok())
        .filter(|address| *address != factory)
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_tx(hash: &str) -> InternalTransaction {
        InternalTransaction {
            kind: "create".to_string(),
            created_contract: Some(AddressParam { hash: hash.to_string() }),
        }
    }

    #[test]
    fn discovery_drops_the_factory_itself() {
        let factory: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
        let items = vec![
            create_tx("0x0000000000000000000000000000000000000001"),
            create_tx("0x00000000000000000000000000000000000000aa"),
            create_tx("0x0000000000000000000000000000000000000002"),
        ];
        let candidates = creation_candidates(&items, factory);
        assert_eq!(candidates.len(), 2);
        assert!(!candidates.contains(&factory));
    }

    #[test]
    fn replayed_events_are_idempotent() {
        let items = vec![
            create_tx("0x0000000000000000000000000000000000000001"),
            create_tx("0x0000000000000000000000000000000000000001"),
        ];
        assert_eq!(creation_candidates(&items, Address::ZERO).len(), 1);
    }

    #[test]
    fn non_create_and_malformed_entries_are_skipped() {
        let items = vec![
            InternalTransaction { kind: "call".to_string(), created_contract: None },
            InternalTransaction {
                kind: "create".to_string(),
                created_contract: Some(AddressParam { hash: "not-an-address".to_string() }),
            },
            InternalTransaction { kind: "create".to_string(), created_contract: None },
        ];
        assert!(creation_candidates(&items, Address::ZERO).is_empty());
    }

    #[test]
    fn pages_tolerate_missing_fields() {
        let page: InternalTransactionPage = serde_json::from_str(r#"{}"#).unwrap();
        assert!(page.items.is_empty());

        let page: InternalTransactionPage = serde_json::from_str(
            r#"{"items":[{"type":"create","created_contract":{"hash":"0x0000000000000000000000000000000000000003"}},{"type":"call"}]}"#,
        )
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(creation_candidates(&page.items, Address::ZERO).len(), 1);
    }

    #[test]
    fn address_info_tolerates_partial_payloads() {
        let info: AddressInfo = serde_json::from_str(r#"{"name":"Wormcoin"}"#).unwrap();
        assert_eq!(info.name.as_deref(), Some("Wormcoin"));
        assert!(info.creator_address_hash.is_none());
        assert!(info.website.is_none());
    }
}
