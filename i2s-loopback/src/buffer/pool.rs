use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

use super::lease::BufferLease;
use super::{Direction, Slot};

/// Storage for one buffer plus its lease flag.
pub(super) struct BufferCell<const N: usize> {
    leased: AtomicBool,
    words: UnsafeCell<[u32; N]>,
}

impl<const N: usize> BufferCell<N> {
    const fn new() -> Self {
        BufferCell {
            leased: AtomicBool::new(false),
            words: UnsafeCell::new([0u32; N]),
        }
    }

    /// Claim exclusive access. Returns `false` if a lease is already out.
    pub(super) fn acquire(&self) -> bool {
        self.leased
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    pub(super) fn release(&self) {
        self.leased.store(false, Ordering::Release);
    }

    pub(super) fn words(&self) -> *mut [u32; N] {
        self.words.get()
    }
}

/// Two ping-pong buffers per direction, each `N` stereo frames long.
///
/// The pool is reserved once (typically as a `static`) and reused for the
/// whole session; nothing is allocated per block. Software access goes
/// through [`lease()`](Self::lease), which hands out at most one
/// [`BufferLease`] per buffer at a time. DMA engines program the address
/// from [`as_mut_ptr()`](Self::as_mut_ptr) instead.
pub struct BufferPool<const N: usize> {
    tx: [BufferCell<N>; 2],
    rx: [BufferCell<N>; 2],
}

// SAFETY: Buffer contents are only reachable through `BufferLease`, and the
// per-buffer atomic lease flag guarantees at most one lease exists at a time.
// Raw pointers handed to DMA are outside the borrow model by nature.
unsafe impl<const N: usize> Sync for BufferPool<N> {}

impl<const N: usize> BufferPool<N> {
    /// Create a pool with all buffers zeroed and unleased.
    pub const fn new() -> Self {
        assert!(N > 0, "transfer buffers must hold at least one frame");
        BufferPool {
            tx: [BufferCell::new(), BufferCell::new()],
            rx: [BufferCell::new(), BufferCell::new()],
        }
    }

    /// Frames per buffer.
    pub const fn frames(&self) -> usize {
        N
    }

    fn cell(&self, direction: Direction, slot: Slot) -> &BufferCell<N> {
        match direction {
            Direction::Transmit => &self.tx[slot.index()],
            Direction::Receive => &self.rx[slot.index()],
        }
    }

    /// Take exclusive access to one buffer.
    ///
    /// Returns `None` if another lease on the same buffer is still alive.
    pub fn lease(&self, direction: Direction, slot: Slot) -> Option<BufferLease<'_, N>> {
        let cell = self.cell(direction, slot);
        if cell.acquire() {
            Some(BufferLease::new(cell, direction, slot))
        } else {
            None
        }
    }

    /// Whether a lease on the buffer is currently held.
    pub fn is_leased(&self, direction: Direction, slot: Slot) -> bool {
        self.cell(direction, slot).leased.load(Ordering::Acquire)
    }

    /// Start address of a buffer, for programming a DMA engine.
    pub fn as_mut_ptr(&self, direction: Direction, slot: Slot) -> *mut u32 {
        self.cell(direction, slot).words().cast::<u32>()
    }
}

impl<const N: usize> Default for BufferPool<N> {
    fn default() -> Self {
        Self::new()
    }
}
