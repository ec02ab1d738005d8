//! Codec schemas of the typed model.
//!
//! The header schema omits the id: a block id is the hash of the encoded
//! header, so it is recomputed on decode rather than carried on the wire.

use std::sync::LazyLock;

use kc_01_codec::{CodecError, DataType, FieldType, Schema, SchemaField};

pub(crate) type SchemaSlot = LazyLock<Result<Schema, CodecError>>;

/// The schema held by `slot`, or the error it was rejected with.
pub(crate) fn cached(slot: &'static SchemaSlot) -> Result<&'static Schema, CodecError> {
    slot.as_ref().map_err(Clone::clone)
}

static BLOCK_HEADER_SCHEMA: SchemaSlot = LazyLock::new(|| {
    Ok(Schema::new(vec![
        SchemaField::scalar("version", 1, DataType::Uint32),
        SchemaField::scalar("timestamp", 2, DataType::Uint32),
        SchemaField::scalar("height", 3, DataType::Uint32),
        SchemaField::scalar("previousBlockID", 4, DataType::Bytes),
        SchemaField::scalar("transactionRoot", 5, DataType::Bytes),
        SchemaField::scalar("generatorPublicKey", 6, DataType::Bytes),
        SchemaField::scalar("reward", 7, DataType::Uint64),
        SchemaField::scalar("totalAmount", 8, DataType::Uint64),
        SchemaField::scalar("totalFee", 9, DataType::Uint64),
        SchemaField::scalar("signature", 10, DataType::Bytes),
    ])?
    .with_id("/block/header"))
});

pub fn block_header_schema() -> Result<&'static Schema, CodecError> {
    cached(&BLOCK_HEADER_SCHEMA)
}

static BLOCK_SCHEMA: SchemaSlot = LazyLock::new(|| {
    Ok(Schema::new(vec![
        SchemaField::scalar("header", 1, DataType::Bytes),
        SchemaField::array("payload", 2, FieldType::Scalar(DataType::Bytes)),
    ])?
    .with_id("/block"))
});

pub fn block_schema() -> Result<&'static Schema, CodecError> {
    cached(&BLOCK_SCHEMA)
}

static TRANSACTION_SCHEMA: SchemaSlot = LazyLock::new(|| {
    Ok(Schema::new(vec![
        SchemaField::scalar("type", 1, DataType::Uint32),
        SchemaField::scalar("nonce", 2, DataType::Uint64),
        SchemaField::scalar("fee", 3, DataType::Uint64),
        SchemaField::scalar("senderPublicKey", 4, DataType::Bytes),
        SchemaField::scalar("asset", 5, DataType::Bytes),
        SchemaField::array("signatures", 6, FieldType::Scalar(DataType::Bytes)),
    ])?
    .with_id("/transaction"))
});

pub fn transaction_schema() -> Result<&'static Schema, CodecError> {
    cached(&TRANSACTION_SCHEMA)
}

static ACCOUNT_SCHEMA: SchemaSlot = LazyLock::new(|| {
    Ok(Schema::new(vec![
        SchemaField::scalar("address", 1, DataType::Bytes),
        SchemaField::scalar("balance", 2, DataType::Uint64),
        SchemaField::scalar("nonce", 3, DataType::Uint64),
        SchemaField::scalar("username", 4, DataType::String),
        SchemaField::scalar("publicKey", 5, DataType::Bytes),
    ])?
    .with_id("/account"))
});

pub fn account_schema() -> Result<&'static Schema, CodecError> {
    cached(&ACCOUNT_SCHEMA)
}
