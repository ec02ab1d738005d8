//! # Domain Layer
//!
//! - `entities` - `Block`, `Transaction`, `Account`
//! - `assets` - per-type transaction assets and their dispatch
//! - `schemas` - codec schemas of the typed model
//! - `errors` - `SerdeError`

pub mod assets;
pub mod entities;
pub mod errors;
pub(crate) mod fields;
pub mod schemas;

pub use assets::{
    AssetKind, DelegateRegistrationAsset, TransactionAsset, TransferAsset, UnlockAsset,
    UnlockingObject, Vote, VoteAsset, REGISTERED_TRANSACTION_TYPES,
};
pub use entities::{Account, Block, Transaction};
pub use errors::SerdeError;
