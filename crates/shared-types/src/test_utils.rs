//! Deterministic fixtures for tests.

use crate::entities::{BlockHeader, BlockId};
use sha2::{Digest, Sha256};

/// Deterministic id for the fixture header at `height`.
pub fn test_block_id(height: u32) -> BlockId {
    let mut hasher = Sha256::new();
    hasher.update(b"kc-test-block");
    hasher.update(height.to_be_bytes());
    hasher.finalize().into()
}

/// Header at `height` linked to the fixture header at `height - 1`.
pub fn make_test_header(height: u32) -> BlockHeader {
    BlockHeader {
        id: test_block_id(height),
        version: 2,
        timestamp: 1_600_000_000 + height * 10,
        height,
        previous_block_id: if height == 0 {
            [0u8; 32]
        } else {
            test_block_id(height - 1)
        },
        transaction_root: [0xAA; 32],
        generator_public_key: [0x11; 32],
        reward: 500_000_000,
        total_amount: 0,
        total_fee: 0,
        signature: vec![0x22; 64],
    }
}

/// Contiguous headers for `heights`.
pub fn make_test_chain(heights: std::ops::RangeInclusive<u32>) -> Vec<BlockHeader> {
    heights.map(make_test_header).collect()
}
