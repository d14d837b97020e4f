//! Move buffering for network synchronization
//!
//! The same FIFO serves both ends of the link. On the controller it holds
//! moves that were sent but not yet acknowledged; on the authority it holds
//! moves that were received but not yet simulated.

use netmove_core::Move;
use std::collections::vec_deque::{self, VecDeque};

/// FIFO of pending moves, oldest first
#[derive(Debug, Clone, Default)]
pub struct MoveBuffer {
    /// Pending moves (oldest first)
    moves: VecDeque<Move>,
    /// Upper bound on queued moves, `None` for unbounded
    capacity: Option<usize>,
}

impl MoveBuffer {
    /// Create an unbounded buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer that refuses moves beyond `capacity`
    ///
    /// The bound is a limit only; storage grows with the moves actually
    /// queued.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            moves: VecDeque::new(),
            capacity: Some(capacity),
        }
    }

    /// Create a buffer with an optional bound
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::new(),
        }
    }

    /// Append a move at the back
    ///
    /// Returns `Err` if the buffer is bounded and full; the move is dropped.
    pub fn push(&mut self, step: Move) -> crate::Result<()> {
        if self.is_full() {
            return Err(crate::Error::MoveBufferFull(self.moves.len()));
        }
        self.moves.push_back(step);
        Ok(())
    }

    /// Discard every move with sequence at or below `sequence`
    ///
    /// Stops at the first move with a higher sequence or when the buffer is
    /// empty, so an acknowledgement for a sequence that was never queued
    /// still terminates. Returns the number of moves discarded.
    pub fn acknowledge(&mut self, sequence: u32) -> usize {
        let mut discarded = 0;
        while self.moves.front().is_some_and(|m| m.sequence <= sequence) {
            self.moves.pop_front();
            discarded += 1;
        }
        discarded
    }

    /// Remove and yield every move in receipt order
    pub fn drain(&mut self) -> vec_deque::Drain<'_, Move> {
        self.moves.drain(..)
    }

    /// Iterate pending moves oldest to newest without removing them
    pub fn iter(&self) -> vec_deque::Iter<'_, Move> {
        self.moves.iter()
    }

    /// Sequence of the oldest pending move
    pub fn oldest_sequence(&self) -> Option<u32> {
        self.moves.front().map(|m| m.sequence)
    }

    /// Sequence of the newest pending move
    pub fn newest_sequence(&self) -> Option<u32> {
        self.moves.back().map(|m| m.sequence)
    }

    /// Get the number of pending moves
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Check if a bounded buffer is full
    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.moves.len() >= cap)
    }

    /// Get the bound, if any
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl<'a> IntoIterator for &'a MoveBuffer {
    type Item = &'a Move;
    type IntoIter = vec_deque::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
