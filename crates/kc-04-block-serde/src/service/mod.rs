//! # Block Serde Service
//!
//! - `binary` - canonical bytes and derived ids
//! - `json` - JSON-safe representation

mod binary;
mod json;


pub use binary::{
    block_id, decode_account, decode_block, decode_block_header, decode_transaction,
    encode_account, encode_block, encode_block_header, encode_transaction, seal_header,
    transaction_id, transaction_root,
};
pub use json::{
    deserialize_account, deserialize_block, deserialize_transaction, serialize_account,
    serialize_block, serialize_transaction,
};
