use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Extraction payload as produced by the upstream wallet extractor.
///
/// Every collection is optional: a payload without `transfers` is valid and
/// simply produces an empty graph.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub transfers: Option<Vec<TransferRecord>>,
    #[serde(default)]
    pub token_metadata: Option<BTreeMap<String, TokenMetadataEntry>>,
    #[serde(default)]
    pub token_balances: Option<TokenBalances>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TransferRecord {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "rawContract")]
    pub raw_contract: Option<RawContract>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawContract {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TokenMetadataEntry {
    #[serde(default)]
    pub metadata: Option<TokenMetadata>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TokenBalances {
    #[serde(default, rename = "tokenBalances")]
    pub token_balances: Option<Vec<TokenBalance>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TokenBalance {
    #[serde(default, rename = "contractAddress")]
    pub contract_address: Option<String>,
    #[serde(default, rename = "tokenBalance")]
    pub token_balance: Value,
}

impl Payload {
    pub fn seed(&self) -> String {
        self.address
            .as_deref()
            .map(normalize_address)
            .unwrap_or_default()
    }

    pub fn balances(&self) -> &[TokenBalance] {
        self.token_balances
            .as_ref()
            .and_then(|balances| balances.token_balances.as_deref())
            .unwrap_or_default()
    }

    /// Token metadata keyed by normalized contract address.
    ///
    /// Keys that normalize to the same address are visited in sorted order;
    /// the first entry carrying a label wins.
    pub fn metadata_by_address(&self) -> HashMap<String, &TokenMetadata> {
        let mut by_address = HashMap::<String, &TokenMetadata>::new();
        for (address, entry) in self.token_metadata.iter().flatten() {
            let address = normalize_address(address);
            let Some(metadata) = entry.metadata.as_ref() else {
                continue;
            };
            if address.is_empty() {
                continue;
            }

            let slot = by_address.entry(address).or_insert(metadata);
            if slot.label().is_none() && metadata.label().is_some() {
                *slot = metadata;
            }
        }
        by_address
    }
}

impl TokenMetadata {
    /// Trimmed symbol, falling back to the name.
    pub fn label(&self) -> Option<&str> {
        [self.symbol.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
    }
}

impl TransferRecord {
    pub fn contract_address(&self) -> Option<String> {
        self.raw_contract
            .as_ref()
            .and_then(|contract| contract.address.as_deref())
            .map(normalize_address)
            .filter(|address| !address.is_empty())
    }

    /// A movement of the chain's native asset: either categorised as such or
    /// carrying a `rawContract` block without a contract address.
    pub fn is_native_movement(&self) -> bool {
        if self.contract_address().is_some() {
            return false;
        }

        let native_category = self
            .category
            .as_deref()
            .is_some_and(|category| matches!(category.trim(), "external" | "internal"));
        native_category || self.raw_contract.is_some()
    }
}

pub fn normalize_address(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

pub fn parse_payload(raw: &str) -> Result<Payload> {
    serde_json::from_str(raw).context("invalid payload JSON")
}

pub fn load_payload(path: &Path) -> Result<Payload> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read payload file {}", path.display()))?;
    parse_payload(&raw).with_context(|| format!("failed to parse payload file {}", path.display()))
}
