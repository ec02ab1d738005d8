use shared_types::{Address, BlockHeader, PublicKey, SIGNATURE_LENGTH};

use super::assets::TransactionAsset;
use super::errors::SerdeError;

/// A signed transaction. The type number is carried by the asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub fee: u64,
    pub sender_public_key: PublicKey,
    pub asset: TransactionAsset,
    /// One entry per required signer. Missing signatures are empty.
    pub signatures: Vec<Vec<u8>>,
}

impl Transaction {
    pub fn tx_type(&self) -> u32 {
        self.asset.tx_type()
    }

    pub fn validate(&self) -> Result<(), SerdeError> {
        self.asset.validate()?;
        if let Some(idx) = self
            .signatures
            .iter()
            .position(|sig| !sig.is_empty() && sig.len() != SIGNATURE_LENGTH)
        {
            return Err(SerdeError::invalid(
                format!("signatures[{idx}]"),
                format!(
                    "expected {SIGNATURE_LENGTH} bytes, got {}",
                    self.signatures[idx].len()
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub payload: Vec<Transaction>,
}

impl Block {
    pub fn height(&self) -> u32 {
        self.header.height
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Account {
    pub address: Address,
    pub balance: u64,
    pub nonce: u64,
    /// Registered delegate name, empty for ordinary accounts.
    pub username: String,
    /// Known once the account has signed a transaction.
    pub public_key: Option<PublicKey>,
}

impl Account {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    pub fn is_delegate(&self) -> bool {
        !self.username.is_empty()
    }
}
