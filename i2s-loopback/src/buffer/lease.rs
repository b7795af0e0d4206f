use core::ops::{Deref, DerefMut};

use super::pool::BufferCell;
use super::{Direction, Slot};

/// Exclusive handle to one pool buffer.
///
/// At most one `BufferLease` exists per buffer. Provides `DerefMut` access
/// to the underlying `[u32; N]` frame words. Dropping the lease hands the
/// buffer back to the pool.
pub struct BufferLease<'a, const N: usize> {
    cell: &'a BufferCell<N>,
    direction: Direction,
    slot: Slot,
}

impl<'a, const N: usize> BufferLease<'a, N> {
    pub(super) fn new(cell: &'a BufferCell<N>, direction: Direction, slot: Slot) -> Self {
        BufferLease {
            cell,
            direction,
            slot,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }
}

impl<const N: usize> Deref for BufferLease<'_, N> {
    type Target = [u32; N];

    fn deref(&self) -> &Self::Target {
        // SAFETY: The lease flag was acquired in `BufferPool::lease`; no other
        // lease on this buffer can exist until we drop.
        unsafe { &*self.cell.words() }
    }
}

impl<const N: usize> DerefMut for BufferLease<'_, N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: As above, access is exclusive for the lifetime of the lease.
        unsafe { &mut *self.cell.words() }
    }
}

impl<const N: usize> Drop for BufferLease<'_, N> {
    fn drop(&mut self) {
        self.cell.release();
    }
}

#[cfg(test)]
mod tests {
    use crate::buffer::{BufferPool, Direction, Slot};

    #[test]
    fn lease_reports_identity() {
        let pool: BufferPool<2> = BufferPool::new();
        let lease = pool.lease(Direction::Receive, Slot::One).unwrap();
        assert_eq!(lease.direction(), Direction::Receive);
        assert_eq!(lease.slot(), Slot::One);
    }

    #[test]
    fn deref_mut_writes_through() {
        let pool: BufferPool<3> = BufferPool::new();
        let mut lease = pool.lease(Direction::Transmit, Slot::Zero).unwrap();
        lease[1] = 0xDEAD_BEEF;
        assert_eq!(lease[1], 0xDEAD_BEEF);
        assert_eq!(lease.len(), 3);
    }
}
