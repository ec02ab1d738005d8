//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Chain**: `BlockHeader`, identifiers
//! - **Accounts**: `Address`

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, DisplayFromStr};

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// Block identifier: SHA-256 of the header encoded without its id.
pub type BlockId = Hash;

/// Transaction identifier: SHA-256 of the encoded transaction.
pub type TransactionId = Hash;

/// A 20-byte account address.
pub type Address = [u8; 20];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Length of an Ed25519 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// The header of a block.
///
/// Heights are `u32` to match the wire schema; the chain never reaches
/// `u32::MAX` blocks within the lifetime of a network.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// Block identifier.
    #[serde_as(as = "Hex")]
    pub id: BlockId,
    /// Block format version.
    pub version: u32,
    /// Seconds since the network epoch.
    pub timestamp: u32,
    /// Height in the chain. Strictly increasing by one per block.
    pub height: u32,
    /// Identifier of the parent block.
    #[serde_as(as = "Hex")]
    pub previous_block_id: BlockId,
    /// Hash over the payload transaction ids.
    #[serde_as(as = "Hex")]
    pub transaction_root: Hash,
    /// Forger of this block.
    #[serde_as(as = "Hex")]
    pub generator_public_key: PublicKey,
    /// Forging reward in base units.
    #[serde_as(as = "DisplayFromStr")]
    pub reward: u64,
    /// Sum of transferred amounts in the payload.
    #[serde_as(as = "DisplayFromStr")]
    pub total_amount: u64,
    /// Sum of fees in the payload.
    #[serde_as(as = "DisplayFromStr")]
    pub total_fee: u64,
    /// Generator signature over the unsigned header.
    #[serde_as(as = "Hex")]
    pub signature: Vec<u8>,
}

impl BlockHeader {
    /// Short hex prefix of the id, for log lines.
    pub fn short_id(&self) -> String {
        hex::encode(&self.id[..4])
    }

    /// Whether `self` directly extends `parent` (height and linkage).
    pub fn extends(&self, parent: &BlockHeader) -> bool {
        self.height == parent.height.wrapping_add(1) && self.previous_block_id == parent.id
    }
}
