//! # Header Window
//!
//! Contiguous, height-ordered run of block headers with an id index.
//!
//! Every mutator keeps two invariants or fails without changing anything:
//! heights increase by exactly one from front to back, and the id index
//! covers exactly the headers held.

use std::collections::{HashMap, VecDeque};

use shared_types::{BlockHeader, BlockId};

use super::errors::CacheError;

#[derive(Debug, Default)]
pub struct HeaderWindow {
    headers: VecDeque<BlockHeader>,
    heights_by_id: HashMap<BlockId, u32>,
}

/// Fail unless `headers` is ascending by exactly one height per step.
pub fn check_contiguous(headers: &[BlockHeader]) -> Result<(), CacheError> {
    for pair in headers.windows(2) {
        if pair[1].height != pair[0].height.wrapping_add(1) {
            return Err(CacheError::InvariantViolation(format!(
                "headers not contiguous: height {} followed by {}",
                pair[0].height, pair[1].height
            )));
        }
    }
    Ok(())
}

impl HeaderWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn lowest_height(&self) -> Option<u32> {
        self.headers.front().map(|h| h.height)
    }

    pub fn highest_height(&self) -> Option<u32> {
        self.headers.back().map(|h| h.height)
    }

    pub fn tip(&self) -> Option<&BlockHeader> {
        self.headers.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockHeader> {
        self.headers.iter()
    }

    pub fn contains_height(&self, height: u32) -> bool {
        matches!(
            (self.lowest_height(), self.highest_height()),
            (Some(low), Some(high)) if (low..=high).contains(&height)
        )
    }

    pub fn get_by_height(&self, height: u32) -> Option<&BlockHeader> {
        let low = self.lowest_height()?;
        let offset = height.checked_sub(low)? as usize;
        self.headers.get(offset)
    }

    pub fn get_by_id(&self, id: &BlockId) -> Option<&BlockHeader> {
        self.heights_by_id
            .get(id)
            .and_then(|height| self.get_by_height(*height))
    }

    /// Clone of `[from, to]` when the window holds all of it.
    pub fn range(&self, from: u32, to: u32) -> Option<Vec<BlockHeader>> {
        if from > to || !self.contains_height(from) || !self.contains_height(to) {
            return None;
        }
        let low = self.lowest_height()?;
        let start = (from - low) as usize;
        let end = (to - low) as usize;
        Some(self.headers.range(start..=end).cloned().collect())
    }

    /// Append `header` on top of the tip. Any header is accepted into an
    /// empty window.
    pub fn push(&mut self, header: BlockHeader) -> Result<(), CacheError> {
        if let Some(tip) = self.tip() {
            if header.height != tip.height.wrapping_add(1) {
                return Err(CacheError::InvariantViolation(format!(
                    "header {} at height {} does not follow cached tip at height {}",
                    header.short_id(),
                    header.height,
                    tip.height
                )));
            }
            if !header.extends(tip) {
                return Err(CacheError::InvariantViolation(format!(
                    "header {} at height {} does not link to cached tip {}",
                    header.short_id(),
                    header.height,
                    tip.short_id()
                )));
            }
        }
        self.heights_by_id.insert(header.id, header.height);
        self.headers.push_back(header);
        Ok(())
    }

    pub fn pop_tip(&mut self) -> Option<BlockHeader> {
        let header = self.headers.pop_back()?;
        self.heights_by_id.remove(&header.id);
        Some(header)
    }

    /// Drop lowest headers until at most `target` remain. Returns how many
    /// were dropped.
    pub fn evict_to(&mut self, target: usize) -> usize {
        let mut evicted = 0;
        while self.headers.len() > target {
            if let Some(header) = self.headers.pop_front() {
                self.heights_by_id.remove(&header.id);
                evicted += 1;
            }
        }
        evicted
    }

    /// Drop every header above `height`. Returns how many were dropped.
    pub fn truncate_above(&mut self, height: u32) -> usize {
        let mut removed = 0;
        while self.highest_height().is_some_and(|h| h > height) {
            self.pop_tip();
            removed += 1;
        }
        removed
    }

    /// Put `headers` below the current lowest header. They must be
    /// contiguous and end exactly one below it.
    pub fn prepend(&mut self, headers: Vec<BlockHeader>) -> Result<(), CacheError> {
        check_contiguous(&headers)?;
        if let (Some(last), Some(low)) = (headers.last(), self.lowest_height()) {
            if last.height.wrapping_add(1) != low {
                return Err(CacheError::InvariantViolation(format!(
                    "refill ends at height {} but cache starts at {}",
                    last.height, low
                )));
            }
        }
        for header in headers.into_iter().rev() {
            self.heights_by_id.insert(header.id, header.height);
            self.headers.push_front(header);
        }
        Ok(())
    }

    /// Replace the whole window with `headers`.
    pub fn replace(&mut self, headers: Vec<BlockHeader>) -> Result<(), CacheError> {
        check_contiguous(&headers)?;
        self.heights_by_id = headers.iter().map(|h| (h.id, h.height)).collect();
        self.headers = headers.into();
        Ok(())
    }
}
