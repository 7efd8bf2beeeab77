//! Cross-block duplicate-resource scan over a fetched chain.
//!
//! A resource is expected to appear in at most one transaction across the
//! chain; a repeat appearance is the write-side symptom the relay's
//! conflict handling exists to prevent, so the read-side audit surfaces it.

use crate::domain::entities::Block;
use serde::Serialize;
use std::collections::HashMap;

/// One duplicated resource observed in the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChainAuditFinding {
    /// The duplicated resource.
    pub resource_id: String,
    /// Block index of the first appearance.
    pub first_seen_block: u64,
    /// Block index of the repeat appearance.
    pub duplicate_block: u64,
}

/// Scans a chain for resources appearing more than once.
///
/// Both block-level resource tags and per-transaction resources count as
/// appearances. The first appearance wins; every later one is a finding.
pub fn scan_duplicate_resources(blocks: &[Block]) -> Vec<ChainAuditFinding> {
    let mut first_seen: HashMap<String, u64> = HashMap::new();
    let mut findings = Vec::new();

    for block in blocks {
        let block_level = block.container_id.as_deref();
        let tx_level = block.transactions.iter().map(|tx| tx.container_id.as_str());

        for resource in block_level.into_iter().chain(tx_level) {
            match first_seen.get(resource) {
                Some(&first) => findings.push(ChainAuditFinding {
                    resource_id: resource.to_string(),
                    first_seen_block: first,
                    duplicate_block: block.index,
                }),
                None => {
                    first_seen.insert(resource.to_string(), block.index);
                }
            }
        }
    }

    findings
}
