//! # Header Cache Configuration

use serde::{Deserialize, Serialize};

use crate::domain::CacheError;

/// Bounds of the cached window.
///
/// The window grows to `max_cached_items`, is trimmed back to
/// `min_cached_items` from the low end, and is refilled from the store when
/// a removal leaves fewer than `min_cached_items`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub min_cached_items: usize,
    pub max_cached_items: usize,
    /// Height of the first block of the chain. Refills never go below it.
    pub genesis_height: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            min_cached_items: 309,
            max_cached_items: 515,
            genesis_height: 0,
        }
    }
}

impl CacheConfig {
    /// Small window so eviction and refill are easy to trigger.
    pub fn for_testing() -> Self {
        Self {
            min_cached_items: 3,
            max_cached_items: 5,
            genesis_height: 0,
        }
    }

    pub fn validate(&self) -> Result<(), CacheError> {
        if self.min_cached_items == 0 {
            return Err(CacheError::InvalidConfig(
                "min_cached_items must be positive".to_string(),
            ));
        }
        if self.min_cached_items > self.max_cached_items {
            return Err(CacheError::InvalidConfig(format!(
                "min_cached_items ({}) exceeds max_cached_items ({})",
                self.min_cached_items, self.max_cached_items
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CacheConfig::default();
        assert!(config.min_cached_items <= config.max_cached_items);
        assert!(config.validate().is_ok());
        assert!(CacheConfig::for_testing().validate().is_ok());
    }

    #[test]
    fn test_invalid_bounds() {
        let inverted = CacheConfig {
            min_cached_items: 10,
            max_cached_items: 5,
            genesis_height: 0,
        };
        assert!(matches!(
            inverted.validate(),
            Err(CacheError::InvalidConfig(_))
        ));

        let zero = CacheConfig {
            min_cached_items: 0,
            ..CacheConfig::for_testing()
        };
        assert!(zero.validate().is_err());
    }
}
