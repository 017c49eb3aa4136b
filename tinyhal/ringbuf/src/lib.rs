#![no_std]
#![forbid(unsafe_code)]

//! # tinyhal ring buffer
//!
//! A fixed-capacity byte queue that never blocks its producer: adding to a
//! full buffer evicts the oldest unread byte.
//!
//! The buffer itself is not synchronised. The serial transport keeps each
//! buffer inside a `critical_section::Mutex`, so one `add` or `remove_oldest`
//! is the unit in which a byte changes hands between interrupt context and
//! caller context.

/// Overwriting circular byte buffer holding up to `N` bytes
///
/// `head` is the next write slot, `tail` the next read slot. Both stay in
/// `0..N`.
#[derive(Clone)]
pub struct RingBuffer<const N: usize> {
    storage: [u8; N],
    head: u8,
    tail: u8,
    len: u8,
}

impl<const N: usize> RingBuffer<N> {
    const CAPACITY_OK: () = assert!(N >= 1 && N <= 255, "ring buffer capacity must be in 1..=255");

    /// Create an empty buffer
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_OK;
        Self {
            storage: [0; N],
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    #[inline]
    const fn advance(index: u8) -> u8 {
        let next = index as usize + 1;
        if next == N {
            0
        } else {
            next as u8
        }
    }

    /// Maximum number of bytes the buffer holds
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Whether there is nothing to read
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the next `add` will evict
    pub fn is_full(&self) -> bool {
        self.len as usize == N
    }

    /// Number of unread bytes, in `0..=N`
    pub fn count(&self) -> usize {
        self.len as usize
    }

    /// Room left before `add` starts evicting
    pub fn free_capacity(&self) -> usize {
        N - self.count()
    }

    /// Oldest unread byte
    ///
    /// The caller must check [`is_empty`](Self::is_empty) first; peeking an
    /// empty buffer is a programming error.
    pub fn peek_oldest(&self) -> u8 {
        debug_assert!(!self.is_empty(), "peek on empty ring buffer");
        self.storage[self.tail as usize]
    }

    /// Oldest unread byte, or `None` when empty
    pub fn peek(&self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.storage[self.tail as usize])
        }
    }

    /// Drop the oldest unread byte; no-op when empty
    pub fn remove_oldest(&mut self) {
        if self.is_empty() {
            return;
        }
        self.tail = Self::advance(self.tail);
        self.len -= 1;
    }

    /// Take the oldest unread byte
    pub fn pop_oldest(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.remove_oldest();
        Some(byte)
    }

    /// Append `byte`, evicting the oldest unread byte when full
    pub fn add(&mut self, byte: u8) {
        self.storage[self.head as usize] = byte;
        self.head = Self::advance(self.head);
        if self.is_full() {
            // Overwrote the oldest byte; the read side moves along with it.
            self.tail = self.head;
        } else {
            self.len += 1;
        }
    }

    /// Discard everything
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Unread bytes, oldest first
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.count()).map(move |i| self.storage[(self.tail as usize + i) % N])
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for RingBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &N)
            .field("count", &self.count())
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for RingBuffer<N> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "RingBuffer({}/{})", self.count(), N);
    }
}
