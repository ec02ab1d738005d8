//! # Block Serde (kc-04)
//!
//! Typed blocks, transactions and accounts on top of the kc-01 codec.
//!
//! Two representations are supported:
//!
//! - **Binary**: canonical codec bytes. Asset bytes nest inside the
//!   transaction, transaction bytes inside the block. Block and transaction
//!   ids are SHA-256 hashes of these bytes.
//! - **JSON-safe**: 64-bit integers as decimal strings, bytes as lowercase
//!   hex, assets as nested objects.
//!
//! In both directions the transaction `type` selects the asset schema, and
//! an unregistered type fails with `SerdeError::UnknownTransactionType`.
//!
//! ## Crate Structure
//!
//! - `domain/` - Entities, asset kinds, schemas, errors
//! - `service/` - Binary and JSON conversions, id derivation
//!
//! ## Usage
//!
//! ```rust
//! use kc_04_block_serde::{
//!     decode_transaction, encode_transaction, serialize_transaction, Transaction,
//!     TransferAsset,
//! };
//!
//! let tx = Transaction {
//!     nonce: 0,
//!     fee: 100_000,
//!     sender_public_key: [7u8; 32],
//!     asset: TransferAsset {
//!         amount: 18_446_744_073_709_551_615,
//!         recipient_address: [1u8; 20],
//!         data: String::new(),
//!     }
//!     .into(),
//!     signatures: vec![vec![9u8; 64]],
//! };
//!
//! let bytes = encode_transaction(&tx).unwrap();
//! assert_eq!(decode_transaction(&bytes).unwrap(), tx);
//!
//! let json = serialize_transaction(&tx).unwrap();
//! assert_eq!(json["asset"]["amount"], "18446744073709551615");
//! ```

pub mod domain;
pub mod service;

pub use domain::{
    Account, AssetKind, Block, DelegateRegistrationAsset, SerdeError, Transaction,
    TransactionAsset, TransferAsset, UnlockAsset, UnlockingObject, Vote, VoteAsset,
    REGISTERED_TRANSACTION_TYPES,
};
pub use service::{
    block_id, decode_account, decode_block, decode_block_header, decode_transaction,
    deserialize_account, deserialize_block, deserialize_transaction, encode_account,
    encode_block, encode_block_header, encode_transaction, seal_header, serialize_account,
    serialize_block, serialize_transaction, transaction_id, transaction_root,
};
