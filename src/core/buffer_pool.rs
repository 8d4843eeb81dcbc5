//! Reusable scratch buffers
//!
//! Every emitted line is rendered into a [`ScratchBuffer`] drawn from a
//! [`BufferPool`], so steady-state logging does not allocate per call.
//! The free list is a bounded crossbeam channel: acquiring is a
//! `try_recv` and releasing a `try_send`, so neither side ever blocks and
//! a buffer can only be received by one acquirer.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::fmt;
use std::io::{self, Write};
use std::ops::{Deref, DerefMut};
use std::sync::OnceLock;

/// Initial capacity of freshly allocated buffers
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Maximum number of idle buffers kept by a pool
pub const DEFAULT_POOL_SIZE: usize = 256;

/// Buffers that grew beyond this are dropped on release instead of pooled
pub const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Growable byte sequence used as encoding scratch space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScratchBuffer {
    data: Vec<u8>,
}

impl ScratchBuffer {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.data.push(byte);
    }

    #[inline]
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Append `value` in decimal, left-padded with zeros to `width` digits.
    /// Values wider than `width` are written in full.
    pub fn append_int_width(&mut self, value: u64, width: usize) {
        let mut digits = [0u8; 20];
        let mut n = value;
        let mut i = digits.len();
        loop {
            i -= 1;
            digits[i] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        let len = digits.len() - i;
        for _ in len..width {
            self.data.push(b'0');
        }
        self.data.extend_from_slice(&digits[i..]);
    }

    /// Append `value` in lowercase hex, left-padded with zeros to `width`.
    pub fn append_hex_width(&mut self, value: u64, width: usize) {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut digits = [0u8; 16];
        let mut n = value;
        let mut i = digits.len();
        loop {
            i -= 1;
            digits[i] = HEX[(n & 0xf) as usize];
            n >>= 4;
            if n == 0 {
                break;
            }
        }
        let len = digits.len() - i;
        for _ in len..width {
            self.data.push(b'0');
        }
        self.data.extend_from_slice(&digits[i..]);
    }

    /// Reset the logical length to zero, keeping capacity.
    #[inline]
    pub fn reset(&mut self) {
        self.data.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Lossy UTF-8 view, mostly for tests and diagnostics.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

impl Write for ScratchBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for ScratchBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

/// Shared pool of [`ScratchBuffer`]s, safe for concurrent acquire/release.
#[derive(Debug)]
pub struct BufferPool {
    sender: Sender<ScratchBuffer>,
    receiver: Receiver<ScratchBuffer>,
    buffer_capacity: usize,
}

impl BufferPool {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_POOL_SIZE, DEFAULT_BUFFER_CAPACITY)
    }

    /// Create a pool keeping at most `max_idle` buffers, allocating new
    /// buffers with `buffer_capacity` bytes.
    #[must_use]
    pub fn with_config(max_idle: usize, buffer_capacity: usize) -> Self {
        let (sender, receiver) = bounded(max_idle.max(1));
        Self {
            sender,
            receiver,
            buffer_capacity,
        }
    }

    /// Process-wide pool used by the built-in formatters.
    pub fn global() -> &'static BufferPool {
        static POOL: OnceLock<BufferPool> = OnceLock::new();
        POOL.get_or_init(BufferPool::new)
    }

    /// Take an empty buffer, allocating a fresh one if the pool is empty.
    pub fn acquire(&self) -> ScratchBuffer {
        match self.receiver.try_recv() {
            Ok(buf) => buf,
            Err(_) => ScratchBuffer::with_capacity(self.buffer_capacity),
        }
    }

    /// Return a buffer to the pool. Its length is reset first; oversized
    /// buffers and buffers beyond the idle limit are dropped.
    pub fn release(&self, mut buf: ScratchBuffer) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.reset();
        let _ = self.sender.try_send(buf);
    }

    /// Acquire a buffer wrapped in a guard that releases it on drop.
    pub fn get(&self) -> PooledBuffer<'_> {
        PooledBuffer {
            pool: self,
            buf: self.acquire(),
        }
    }

    /// Number of idle buffers currently held.
    pub fn idle(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard over a pooled [`ScratchBuffer`].
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: ScratchBuffer,
}

impl Deref for PooledBuffer<'_> {
    type Target = ScratchBuffer;

    fn deref(&self) -> &ScratchBuffer {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut ScratchBuffer {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
