//! Genesis block creation.

use kc_04_block_serde::{seal_header, transaction_root, Block, SerdeError};
use shared_types::BlockHeader;

/// Genesis timestamp, seconds since the network epoch.
pub const GENESIS_TIMESTAMP: u32 = 0;
pub const GENESIS_VERSION: u32 = 0;

/// Empty sealed block at `height` with no parent.
pub fn genesis_block(height: u32) -> Result<Block, SerdeError> {
    let header = BlockHeader {
        id: [0u8; 32],
        version: GENESIS_VERSION,
        timestamp: GENESIS_TIMESTAMP,
        height,
        previous_block_id: [0u8; 32],
        transaction_root: transaction_root(&[])?,
        generator_public_key: [0u8; 32],
        reward: 0,
        total_amount: 0,
        total_fee: 0,
        signature: Vec::new(),
    };
    Ok(Block {
        header: seal_header(header)?,
        payload: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kc_04_block_serde::block_id;

    #[test]
    fn test_genesis_is_sealed_and_deterministic() {
        let genesis = genesis_block(0).unwrap();
        assert_eq!(genesis.header.id, block_id(&genesis.header).unwrap());
        assert_eq!(genesis, genesis_block(0).unwrap());
        assert_ne!(genesis.header.id, genesis_block(1).unwrap().header.id);
    }
}
