//! The global staging buffer for freshly generated requests.

use crate::{attendant::Category, types::Tick};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// One pending request. Only its category matters for routing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestToken {
    pub id: u64,
    pub category: Category,
    pub created_at: Tick,
}

/// Raised when a push finds the buffer already at capacity.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("global buffer overflow: capacity {capacity} reached")]
pub struct BufferOverflow {
    pub capacity: usize,
}

/// Bounded FIFO. `len() <= capacity()` always holds.
#[derive(Debug, Clone)]
pub struct GlobalBuffer {
    capacity: usize,
    items: VecDeque<RequestToken>,
}

impl GlobalBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Capacity is checked on every single insertion.
    pub fn push(&mut self, token: RequestToken) -> Result<(), BufferOverflow> {
        if self.is_full() {
            return Err(BufferOverflow { capacity: self.capacity });
        }
        self.items.push_back(token);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<RequestToken> {
        self.items.pop_front()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(id: u64) -> RequestToken {
        RequestToken { id, category: Category::Support, created_at: 0 }
    }

    #[test]
    fn push_past_capacity_overflows() {
        let mut buf = GlobalBuffer::new(2);
        buf.push(token(0)).unwrap();
        buf.push(token(1)).unwrap();
        assert_eq!(buf.push(token(2)), Err(BufferOverflow { capacity: 2 }));
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn zero_capacity_rejects_first_push() {
        let mut buf = GlobalBuffer::new(0);
        assert!(buf.is_full());
        assert!(buf.push(token(0)).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn pops_in_fifo_order() {
        let mut buf = GlobalBuffer::new(3);
        for id in 0..3 {
            buf.push(token(id)).unwrap();
        }
        let ids: Vec<u64> = std::iter::from_fn(|| buf.pop()).map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
