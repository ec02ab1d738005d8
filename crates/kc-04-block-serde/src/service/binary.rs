//! Canonical binary encoding of the typed model, and the ids derived from it.

use kc_01_codec::{self as codec, Object, Value};
use sha2::{Digest, Sha256};
use shared_types::{BlockHeader, BlockId, Hash, TransactionId};
use tracing::debug;

use crate::domain::fields::Fields;
use crate::domain::schemas::{account_schema, block_header_schema, block_schema, transaction_schema};
use crate::domain::{Account, Block, SerdeError, Transaction, TransactionAsset};

fn sha256(bytes: &[u8]) -> Hash {
    Sha256::digest(bytes).into()
}

// =============================================================================
// Headers
// =============================================================================

fn header_object(header: &BlockHeader) -> Object {
    Object::from([
        ("version".to_string(), Value::from(header.version)),
        ("timestamp".to_string(), Value::from(header.timestamp)),
        ("height".to_string(), Value::from(header.height)),
        (
            "previousBlockID".to_string(),
            Value::from(header.previous_block_id.to_vec()),
        ),
        (
            "transactionRoot".to_string(),
            Value::from(header.transaction_root.to_vec()),
        ),
        (
            "generatorPublicKey".to_string(),
            Value::from(header.generator_public_key.to_vec()),
        ),
        ("reward".to_string(), Value::from(header.reward)),
        ("totalAmount".to_string(), Value::from(header.total_amount)),
        ("totalFee".to_string(), Value::from(header.total_fee)),
        ("signature".to_string(), Value::from(header.signature.clone())),
    ])
}

/// Encode every header field except the id.
pub fn encode_block_header(header: &BlockHeader) -> Result<Vec<u8>, SerdeError> {
    Ok(codec::encode(block_header_schema()?, &header_object(header))?)
}

/// Decode a header and derive its id from `bytes`.
pub fn decode_block_header(bytes: &[u8]) -> Result<BlockHeader, SerdeError> {
    let object = codec::decode(block_header_schema()?, bytes)?;
    let mut fields = Fields::new(object, "header");
    Ok(BlockHeader {
        id: sha256(bytes),
        version: fields.u32("version")?,
        timestamp: fields.u32("timestamp")?,
        height: fields.u32("height")?,
        previous_block_id: fields.fixed("previousBlockID")?,
        transaction_root: fields.fixed("transactionRoot")?,
        generator_public_key: fields.fixed("generatorPublicKey")?,
        reward: fields.u64("reward")?,
        total_amount: fields.u64("totalAmount")?,
        total_fee: fields.u64("totalFee")?,
        signature: fields.bytes("signature")?,
    })
}

/// Hash of the encoded header.
pub fn block_id(header: &BlockHeader) -> Result<BlockId, SerdeError> {
    Ok(sha256(&encode_block_header(header)?))
}

/// `header` with its id set to `block_id(header)`.
pub fn seal_header(mut header: BlockHeader) -> Result<BlockHeader, SerdeError> {
    header.id = block_id(&header)?;
    Ok(header)
}

// =============================================================================
// Transactions
// =============================================================================

pub(crate) fn transaction_object(tx: &Transaction) -> Result<Object, SerdeError> {
    tx.validate()?;
    let signatures = tx
        .signatures
        .iter()
        .map(|sig| Value::from(sig.clone()))
        .collect::<Vec<_>>();
    Ok(Object::from([
        ("type".to_string(), Value::from(tx.tx_type())),
        ("nonce".to_string(), Value::from(tx.nonce)),
        ("fee".to_string(), Value::from(tx.fee)),
        (
            "senderPublicKey".to_string(),
            Value::from(tx.sender_public_key.to_vec()),
        ),
        ("asset".to_string(), Value::from(tx.asset.encode()?)),
        ("signatures".to_string(), Value::Array(signatures)),
    ]))
}

/// Build a transaction from its remaining envelope fields and an already
/// parsed asset.
pub(crate) fn finish_transaction(
    mut fields: Fields,
    asset: TransactionAsset,
) -> Result<Transaction, SerdeError> {
    let tx = Transaction {
        nonce: fields.u64("nonce")?,
        fee: fields.u64("fee")?,
        sender_public_key: fields.fixed("senderPublicKey")?,
        asset,
        signatures: fields.byte_items("signatures")?,
    };
    tx.validate()?;
    Ok(tx)
}

pub fn encode_transaction(tx: &Transaction) -> Result<Vec<u8>, SerdeError> {
    Ok(codec::encode(transaction_schema()?, &transaction_object(tx)?)?)
}

/// Decode a transaction, dispatching its asset on the `type` field.
pub fn decode_transaction(bytes: &[u8]) -> Result<Transaction, SerdeError> {
    let object = codec::decode(transaction_schema()?, bytes)?;
    let mut fields = Fields::new(object, "");
    let tx_type = fields.u32("type")?;
    let asset = TransactionAsset::decode(tx_type, &fields.bytes("asset")?)?;
    finish_transaction(fields, asset)
}

/// Hash of the encoded transaction.
pub fn transaction_id(tx: &Transaction) -> Result<TransactionId, SerdeError> {
    Ok(sha256(&encode_transaction(tx)?))
}

/// Hash of the concatenated transaction ids, in payload order.
pub fn transaction_root(payload: &[Transaction]) -> Result<Hash, SerdeError> {
    let mut hasher = Sha256::new();
    for tx in payload {
        hasher.update(transaction_id(tx)?);
    }
    Ok(hasher.finalize().into())
}

// =============================================================================
// Blocks
// =============================================================================

pub fn encode_block(block: &Block) -> Result<Vec<u8>, SerdeError> {
    let payload = block
        .payload
        .iter()
        .map(|tx| encode_transaction(tx).map(Value::from))
        .collect::<Result<Vec<_>, _>>()?;
    let object = Object::from([
        (
            "header".to_string(),
            Value::from(encode_block_header(&block.header)?),
        ),
        ("payload".to_string(), Value::Array(payload)),
    ]);
    Ok(codec::encode(block_schema()?, &object)?)
}

/// Decode a block. The header id is recomputed from the header bytes.
pub fn decode_block(bytes: &[u8]) -> Result<Block, SerdeError> {
    let object = codec::decode(block_schema()?, bytes)?;
    let mut fields = Fields::new(object, "block");
    let header = decode_block_header(&fields.bytes("header")?)?;
    let payload = fields
        .byte_items("payload")?
        .iter()
        .map(|tx| decode_transaction(tx))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        id = %header.short_id(),
        height = header.height,
        transactions = payload.len(),
        "[kc-04] Decoded block"
    );
    Ok(Block { header, payload })
}

// =============================================================================
// Accounts
// =============================================================================

pub(crate) fn account_object(account: &Account) -> Object {
    let public_key = account
        .public_key
        .map(|key| key.to_vec())
        .unwrap_or_default();
    Object::from([
        ("address".to_string(), Value::from(account.address.to_vec())),
        ("balance".to_string(), Value::from(account.balance)),
        ("nonce".to_string(), Value::from(account.nonce)),
        ("username".to_string(), Value::from(account.username.as_str())),
        ("publicKey".to_string(), Value::from(public_key)),
    ])
}

pub(crate) fn account_from_object(object: Object) -> Result<Account, SerdeError> {
    let mut fields = Fields::new(object, "account");
    let address = fields.fixed("address")?;
    let balance = fields.u64("balance")?;
    let nonce = fields.u64("nonce")?;
    let username = fields.string("username")?;
    let public_key = match fields.bytes("publicKey")? {
        key if key.is_empty() => None,
        key => {
            let len = key.len();
            Some(key.try_into().map_err(|_| {
                SerdeError::invalid(
                    "account.publicKey",
                    format!("expected 0 or 32 bytes, got {len}"),
                )
            })?)
        }
    };
    Ok(Account {
        address,
        balance,
        nonce,
        username,
        public_key,
    })
}

pub fn encode_account(account: &Account) -> Result<Vec<u8>, SerdeError> {
    Ok(codec::encode(account_schema()?, &account_object(account))?)
}

pub fn decode_account(bytes: &[u8]) -> Result<Account, SerdeError> {
    account_from_object(codec::decode(account_schema()?, bytes)?)
}
