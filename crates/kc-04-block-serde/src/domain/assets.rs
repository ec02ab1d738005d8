//! # Transaction Assets
//!
//! Each transaction type carries a type-specific payload ("asset") encoded
//! with its own schema into the transaction's `asset` bytes. The type
//! number selects the schema; unregistered types are rejected.
//!
//! | Type | Kind | Rules |
//! |------|------|-------|
//! | 8 | Transfer | `data` at most 64 bytes |
//! | 10 | Delegate registration | username of 1-20 chars from `[a-z0-9!@$&_.]` |
//! | 13 | Vote | 1-20 votes, amount non-zero |
//! | 14 | Unlock | 1-20 unlocking objects |

use kc_01_codec::{
    self as codec, CodecError, DataType, FieldType, Object, Schema, SchemaField, Value,
};
use std::sync::LazyLock;

use serde_json::Value as Json;
use shared_types::Address;

use super::errors::SerdeError;
use super::fields::Fields;
use super::schemas::{cached, SchemaSlot};

pub const TRANSFER_TYPE: u32 = 8;
pub const DELEGATE_REGISTRATION_TYPE: u32 = 10;
pub const VOTE_TYPE: u32 = 13;
pub const UNLOCK_TYPE: u32 = 14;

/// Transaction types with a registered asset schema.
pub const REGISTERED_TRANSACTION_TYPES: [u32; 4] = [
    TRANSFER_TYPE,
    DELEGATE_REGISTRATION_TYPE,
    VOTE_TYPE,
    UNLOCK_TYPE,
];

pub const MAX_TRANSFER_DATA_LENGTH: usize = 64;
pub const MAX_USERNAME_LENGTH: usize = 20;
pub const MAX_VOTES_PER_TRANSACTION: usize = 20;
pub const MAX_UNLOCKS_PER_TRANSACTION: usize = 20;

/// A concrete asset kind bound to one transaction type.
pub trait AssetKind: Sized {
    const TYPE: u32;
    const NAME: &'static str;

    /// Asset schema, built once.
    fn schema() -> Result<&'static Schema, CodecError>;
    fn to_object(&self) -> Object;
    fn from_object(object: Object) -> Result<Self, SerdeError>;
    fn validate(&self) -> Result<(), SerdeError>;

    fn encode(&self) -> Result<Vec<u8>, SerdeError> {
        self.validate()?;
        Ok(codec::encode(Self::schema()?, &self.to_object())?)
    }

    fn decode(bytes: &[u8]) -> Result<Self, SerdeError> {
        let asset = Self::from_object(codec::decode(Self::schema()?, bytes)?)?;
        asset.validate()?;
        Ok(asset)
    }

    fn to_json(&self) -> Result<Json, SerdeError> {
        Ok(codec::to_json(Self::schema()?, &self.to_object())?)
    }

    fn from_json(json: &Json) -> Result<Self, SerdeError> {
        let asset = Self::from_object(codec::from_json(Self::schema()?, json)?)?;
        asset.validate()?;
        Ok(asset)
    }
}

// =============================================================================
// Transfer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferAsset {
    pub amount: u64,
    pub recipient_address: Address,
    pub data: String,
}

impl AssetKind for TransferAsset {
    const TYPE: u32 = TRANSFER_TYPE;
    const NAME: &'static str = "transfer";

    fn schema() -> Result<&'static Schema, CodecError> {
        static SCHEMA: SchemaSlot = LazyLock::new(|| {
            Ok(Schema::new(vec![
                SchemaField::scalar("amount", 1, DataType::Uint64),
                SchemaField::scalar("recipientAddress", 2, DataType::Bytes),
                SchemaField::scalar("data", 3, DataType::String),
            ])?
            .with_id("/asset/transfer"))
        });
        cached(&SCHEMA)
    }

    fn to_object(&self) -> Object {
        Object::from([
            ("amount".to_string(), Value::from(self.amount)),
            (
                "recipientAddress".to_string(),
                Value::from(self.recipient_address.to_vec()),
            ),
            ("data".to_string(), Value::from(self.data.as_str())),
        ])
    }

    fn from_object(object: Object) -> Result<Self, SerdeError> {
        let mut fields = Fields::new(object, "asset");
        Ok(Self {
            amount: fields.u64("amount")?,
            recipient_address: fields.fixed("recipientAddress")?,
            data: fields.string("data")?,
        })
    }

    fn validate(&self) -> Result<(), SerdeError> {
        if self.data.len() > MAX_TRANSFER_DATA_LENGTH {
            return Err(SerdeError::invalid(
                "asset.data",
                format!(
                    "{} bytes exceeds the {} byte limit",
                    self.data.len(),
                    MAX_TRANSFER_DATA_LENGTH
                ),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Delegate registration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateRegistrationAsset {
    pub username: String,
}

fn is_username_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || "!@$&_.".contains(c)
}

impl AssetKind for DelegateRegistrationAsset {
    const TYPE: u32 = DELEGATE_REGISTRATION_TYPE;
    const NAME: &'static str = "delegate registration";

    fn schema() -> Result<&'static Schema, CodecError> {
        static SCHEMA: SchemaSlot = LazyLock::new(|| {
            Ok(Schema::new(vec![SchemaField::scalar(
                "username",
                1,
                DataType::String,
            )])?
            .with_id("/asset/delegate-registration"))
        });
        cached(&SCHEMA)
    }

    fn to_object(&self) -> Object {
        Object::from([("username".to_string(), Value::from(self.username.as_str()))])
    }

    fn from_object(object: Object) -> Result<Self, SerdeError> {
        let mut fields = Fields::new(object, "asset");
        Ok(Self {
            username: fields.string("username")?,
        })
    }

    fn validate(&self) -> Result<(), SerdeError> {
        let chars = self.username.chars().count();
        if chars == 0 || chars > MAX_USERNAME_LENGTH {
            return Err(SerdeError::invalid(
                "asset.username",
                format!("length {chars} is outside 1..={MAX_USERNAME_LENGTH}"),
            ));
        }
        if let Some(bad) = self.username.chars().find(|c| !is_username_char(*c)) {
            return Err(SerdeError::invalid(
                "asset.username",
                format!("character {bad:?} is not allowed"),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Vote
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub delegate_address: Address,
    /// Positive to vote, negative to unvote.
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteAsset {
    pub votes: Vec<Vote>,
}

impl AssetKind for VoteAsset {
    const TYPE: u32 = VOTE_TYPE;
    const NAME: &'static str = "vote";

    fn schema() -> Result<&'static Schema, CodecError> {
        static SCHEMA: SchemaSlot = LazyLock::new(|| {
            let vote = Schema::new(vec![
                SchemaField::scalar("delegateAddress", 1, DataType::Bytes),
                SchemaField::scalar("amount", 2, DataType::Sint64),
            ])?;
            Ok(Schema::new(vec![SchemaField::array(
                "votes",
                1,
                FieldType::Object(vote),
            )])?
            .with_id("/asset/vote"))
        });
        cached(&SCHEMA)
    }

    fn to_object(&self) -> Object {
        let votes = self
            .votes
            .iter()
            .map(|vote| {
                Value::Object(Object::from([
                    (
                        "delegateAddress".to_string(),
                        Value::from(vote.delegate_address.to_vec()),
                    ),
                    ("amount".to_string(), Value::from(vote.amount)),
                ]))
            })
            .collect::<Vec<_>>();
        Object::from([("votes".to_string(), Value::Array(votes))])
    }

    fn from_object(object: Object) -> Result<Self, SerdeError> {
        let mut fields = Fields::new(object, "asset");
        let votes = fields
            .objects("votes", "asset.votes")?
            .into_iter()
            .map(|mut vote| {
                Ok(Vote {
                    delegate_address: vote.fixed("delegateAddress")?,
                    amount: vote.i64("amount")?,
                })
            })
            .collect::<Result<Vec<_>, SerdeError>>()?;
        Ok(Self { votes })
    }

    fn validate(&self) -> Result<(), SerdeError> {
        if self.votes.is_empty() || self.votes.len() > MAX_VOTES_PER_TRANSACTION {
            return Err(SerdeError::invalid(
                "asset.votes",
                format!(
                    "{} votes is outside 1..={}",
                    self.votes.len(),
                    MAX_VOTES_PER_TRANSACTION
                ),
            ));
        }
        if let Some(idx) = self.votes.iter().position(|vote| vote.amount == 0) {
            return Err(SerdeError::invalid(
                format!("asset.votes[{idx}].amount"),
                "must not be zero",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Unlock
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockingObject {
    pub delegate_address: Address,
    pub amount: u64,
    pub unvote_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockAsset {
    pub unlocking_objects: Vec<UnlockingObject>,
}

impl AssetKind for UnlockAsset {
    const TYPE: u32 = UNLOCK_TYPE;
    const NAME: &'static str = "unlock";

    fn schema() -> Result<&'static Schema, CodecError> {
        static SCHEMA: SchemaSlot = LazyLock::new(|| {
            let unlock = Schema::new(vec![
                SchemaField::scalar("delegateAddress", 1, DataType::Bytes),
                SchemaField::scalar("amount", 2, DataType::Uint64),
                SchemaField::scalar("unvoteHeight", 3, DataType::Uint32),
            ])?;
            Ok(Schema::new(vec![SchemaField::array(
                "unlockingObjects",
                1,
                FieldType::Object(unlock),
            )])?
            .with_id("/asset/unlock"))
        });
        cached(&SCHEMA)
    }

    fn to_object(&self) -> Object {
        let items = self
            .unlocking_objects
            .iter()
            .map(|item| {
                Value::Object(Object::from([
                    (
                        "delegateAddress".to_string(),
                        Value::from(item.delegate_address.to_vec()),
                    ),
                    ("amount".to_string(), Value::from(item.amount)),
                    ("unvoteHeight".to_string(), Value::from(item.unvote_height)),
                ]))
            })
            .collect::<Vec<_>>();
        Object::from([("unlockingObjects".to_string(), Value::Array(items))])
    }

    fn from_object(object: Object) -> Result<Self, SerdeError> {
        let mut fields = Fields::new(object, "asset");
        let unlocking_objects = fields
            .objects("unlockingObjects", "asset.unlockingObjects")?
            .into_iter()
            .map(|mut item| {
                Ok(UnlockingObject {
                    delegate_address: item.fixed("delegateAddress")?,
                    amount: item.u64("amount")?,
                    unvote_height: item.u32("unvoteHeight")?,
                })
            })
            .collect::<Result<Vec<_>, SerdeError>>()?;
        Ok(Self { unlocking_objects })
    }

    fn validate(&self) -> Result<(), SerdeError> {
        let count = self.unlocking_objects.len();
        if count == 0 || count > MAX_UNLOCKS_PER_TRANSACTION {
            return Err(SerdeError::invalid(
                "asset.unlockingObjects",
                format!("{count} entries is outside 1..={MAX_UNLOCKS_PER_TRANSACTION}"),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Asset of any registered transaction type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionAsset {
    Transfer(TransferAsset),
    DelegateRegistration(DelegateRegistrationAsset),
    Vote(VoteAsset),
    Unlock(UnlockAsset),
}

impl TransactionAsset {
    pub fn tx_type(&self) -> u32 {
        match self {
            TransactionAsset::Transfer(_) => TransferAsset::TYPE,
            TransactionAsset::DelegateRegistration(_) => DelegateRegistrationAsset::TYPE,
            TransactionAsset::Vote(_) => VoteAsset::TYPE,
            TransactionAsset::Unlock(_) => UnlockAsset::TYPE,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TransactionAsset::Transfer(_) => TransferAsset::NAME,
            TransactionAsset::DelegateRegistration(_) => DelegateRegistrationAsset::NAME,
            TransactionAsset::Vote(_) => VoteAsset::NAME,
            TransactionAsset::Unlock(_) => UnlockAsset::NAME,
        }
    }

    /// Asset schema registered for `tx_type`.
    pub fn schema_for(tx_type: u32) -> Result<&'static Schema, SerdeError> {
        let schema = match tx_type {
            TransferAsset::TYPE => TransferAsset::schema(),
            DelegateRegistrationAsset::TYPE => DelegateRegistrationAsset::schema(),
            VoteAsset::TYPE => VoteAsset::schema(),
            UnlockAsset::TYPE => UnlockAsset::schema(),
            other => return Err(SerdeError::UnknownTransactionType(other)),
        };
        Ok(schema?)
    }

    pub fn validate(&self) -> Result<(), SerdeError> {
        match self {
            TransactionAsset::Transfer(a) => a.validate(),
            TransactionAsset::DelegateRegistration(a) => a.validate(),
            TransactionAsset::Vote(a) => a.validate(),
            TransactionAsset::Unlock(a) => a.validate(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SerdeError> {
        match self {
            TransactionAsset::Transfer(a) => a.encode(),
            TransactionAsset::DelegateRegistration(a) => a.encode(),
            TransactionAsset::Vote(a) => a.encode(),
            TransactionAsset::Unlock(a) => a.encode(),
        }
    }

    pub fn decode(tx_type: u32, bytes: &[u8]) -> Result<Self, SerdeError> {
        match tx_type {
            TransferAsset::TYPE => TransferAsset::decode(bytes).map(Self::Transfer),
            DelegateRegistrationAsset::TYPE => {
                DelegateRegistrationAsset::decode(bytes).map(Self::DelegateRegistration)
            }
            VoteAsset::TYPE => VoteAsset::decode(bytes).map(Self::Vote),
            UnlockAsset::TYPE => UnlockAsset::decode(bytes).map(Self::Unlock),
            other => Err(SerdeError::UnknownTransactionType(other)),
        }
    }

    pub fn to_json(&self) -> Result<Json, SerdeError> {
        match self {
            TransactionAsset::Transfer(a) => a.to_json(),
            TransactionAsset::DelegateRegistration(a) => a.to_json(),
            TransactionAsset::Vote(a) => a.to_json(),
            TransactionAsset::Unlock(a) => a.to_json(),
        }
    }

    pub fn from_json(tx_type: u32, json: &Json) -> Result<Self, SerdeError> {
        match tx_type {
            TransferAsset::TYPE => TransferAsset::from_json(json).map(Self::Transfer),
            DelegateRegistrationAsset::TYPE => {
                DelegateRegistrationAsset::from_json(json).map(Self::DelegateRegistration)
            }
            VoteAsset::TYPE => VoteAsset::from_json(json).map(Self::Vote),
            UnlockAsset::TYPE => UnlockAsset::from_json(json).map(Self::Unlock),
            other => Err(SerdeError::UnknownTransactionType(other)),
        }
    }
}

impl From<TransferAsset> for TransactionAsset {
    fn from(asset: TransferAsset) -> Self {
        TransactionAsset::Transfer(asset)
    }
}

impl From<DelegateRegistrationAsset> for TransactionAsset {
    fn from(asset: DelegateRegistrationAsset) -> Self {
        TransactionAsset::DelegateRegistration(asset)
    }
}

impl From<VoteAsset> for TransactionAsset {
    fn from(asset: VoteAsset) -> Self {
        TransactionAsset::Vote(asset)
    }
}

impl From<UnlockAsset> for TransactionAsset {
    fn from(asset: UnlockAsset) -> Self {
        TransactionAsset::Unlock(asset)
    }
}
