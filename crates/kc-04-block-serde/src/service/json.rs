//! JSON-safe view of the typed model.
//!
//! 64-bit integers travel as decimal strings and bytes as lowercase hex.
//! Transactions carry their asset as a nested object selected by `type`,
//! plus their derived `id`. A supplied `id` must match the recomputed one.

use kc_01_codec as codec;
use serde_json::{json, Map, Value as Json};
use shared_types::{BlockHeader, Hash};
use tracing::debug;

use super::binary::{
    account_from_object, account_object, block_id, finish_transaction, transaction_id,
    transaction_object,
};
use crate::domain::fields::Fields;
use crate::domain::schemas::{account_schema, transaction_schema};
use crate::domain::{Account, Block, SerdeError, Transaction, TransactionAsset};

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn expect_object<'a>(json: &'a Json, what: &str) -> Result<&'a Map<String, Json>, SerdeError> {
    json.as_object().ok_or_else(|| {
        SerdeError::InvalidJson(format!("{what} must be an object, got {}", json_kind(json)))
    })
}

fn check_id(field: &str, claimed: &Json, actual: &Hash) -> Result<(), SerdeError> {
    let matches = claimed
        .as_str()
        .and_then(|s| hex::decode(s).ok())
        .is_some_and(|bytes| bytes == actual.as_slice());
    if !matches {
        debug!("[kc-04] Rejected {} {}: expected {}", field, claimed, hex::encode(actual));
        return Err(SerdeError::invalid(
            field,
            format!("does not match computed id {}", hex::encode(actual)),
        ));
    }
    Ok(())
}

// =============================================================================
// Transactions
// =============================================================================

pub fn serialize_transaction(tx: &Transaction) -> Result<Json, SerdeError> {
    let schema = transaction_schema()?;
    let object = transaction_object(tx)?;
    let id = transaction_id(tx)?;

    let mut json = codec::to_json(schema, &object)?;
    if let Json::Object(map) = &mut json {
        map.insert("asset".to_string(), tx.asset.to_json()?);
        map.insert("id".to_string(), Json::String(hex::encode(id)));
    }
    Ok(json)
}

pub fn deserialize_transaction(json: &Json) -> Result<Transaction, SerdeError> {
    let map = expect_object(json, "transaction")?;

    let tx_type = map
        .get("type")
        .and_then(Json::as_u64)
        .and_then(|t| u32::try_from(t).ok())
        .ok_or_else(|| SerdeError::invalid("type", "expected an unsigned 32-bit integer"))?;
    let asset_json = map
        .get("asset")
        .ok_or_else(|| SerdeError::invalid("asset", "missing"))?;
    let asset = TransactionAsset::from_json(tx_type, asset_json)?;

    // The envelope is checked against the transaction schema with the asset
    // slot emptied; the parsed asset replaces it afterwards.
    let mut envelope = map.clone();
    let claimed_id = envelope.remove("id");
    envelope.insert("asset".to_string(), Json::String(String::new()));
    let object = codec::from_json(transaction_schema()?, &Json::Object(envelope))?;

    let mut fields = Fields::new(object, "");
    fields.u32("type")?;
    fields.bytes("asset")?;
    let tx = finish_transaction(fields, asset)?;

    if let Some(claimed) = claimed_id {
        check_id("id", &claimed, &transaction_id(&tx)?)?;
    }
    Ok(tx)
}

// =============================================================================
// Blocks
// =============================================================================

pub fn serialize_block(block: &Block) -> Result<Json, SerdeError> {
    let header = serde_json::to_value(&block.header)
        .map_err(|e| SerdeError::InvalidJson(format!("header: {e}")))?;
    let payload = block
        .payload
        .iter()
        .map(serialize_transaction)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({ "header": header, "payload": payload }))
}

pub fn deserialize_block(json: &Json) -> Result<Block, SerdeError> {
    let map = expect_object(json, "block")?;
    if let Some(unknown) = map.keys().find(|k| !matches!(k.as_str(), "header" | "payload")) {
        return Err(SerdeError::invalid(unknown.as_str(), "unknown property"));
    }

    let header_json = map
        .get("header")
        .cloned()
        .ok_or_else(|| SerdeError::invalid("header", "missing"))?;
    let header: BlockHeader = serde_json::from_value(header_json)
        .map_err(|e| SerdeError::InvalidJson(format!("header: {e}")))?;
    check_id("header.id", &Json::String(hex::encode(header.id)), &block_id(&header)?)?;

    let payload = match map.get("payload") {
        Some(Json::Array(items)) => items
            .iter()
            .map(deserialize_transaction)
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(SerdeError::InvalidJson(format!(
                "payload must be an array, got {}",
                json_kind(other)
            )))
        }
        None => return Err(SerdeError::invalid("payload", "missing")),
    };

    Ok(Block { header, payload })
}

// =============================================================================
// Accounts
// =============================================================================

pub fn serialize_account(account: &Account) -> Result<Json, SerdeError> {
    Ok(codec::to_json(account_schema()?, &account_object(account))?)
}

pub fn deserialize_account(json: &Json) -> Result<Account, SerdeError> {
    account_from_object(codec::from_json(account_schema()?, json)?)
}
