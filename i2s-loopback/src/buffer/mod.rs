//! Ping-pong transfer buffers.
//!
//! Two fixed buffers per direction, indexed by [`Slot`]. While a buffer is
//! armed with the bus the hardware owns it; once the bus releases it the
//! application context refills (transmit) or inspects (receive) it before it
//! is armed again.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`BufferPool`] | Static storage for both pairs |
//! | [`BufferLease`] | Exclusive, auto-releasing access to one buffer |
//! | [`BufferPair`] | The transmit/receive slots handed to the bus per leg |

pub mod lease;
pub mod pool;

pub use lease::BufferLease;
pub use pool::BufferPool;

/// Transfer direction of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Samples sent out on the bus.
    Transmit,
    /// Samples captured from the bus.
    Receive,
}

/// Index into a ping-pong pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Zero = 0,
    One = 1,
}

impl Slot {
    /// The slot armed when a session starts.
    pub const INITIAL: Slot = Slot::Zero;

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The alternate slot of the pair.
    pub const fn other(self) -> Slot {
        match self {
            Slot::Zero => Slot::One,
            Slot::One => Slot::Zero,
        }
    }

    pub const fn from_index(index: usize) -> Option<Slot> {
        match index {
            0 => Some(Slot::Zero),
            1 => Some(Slot::One),
            _ => None,
        }
    }
}

/// One transmit and one receive buffer, committed to the bus together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPair {
    pub tx: Slot,
    pub rx: Slot,
}

impl BufferPair {
    /// The pair using the same slot in both directions.
    pub const fn at(slot: Slot) -> Self {
        BufferPair { tx: slot, rx: slot }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_alternates() {
        assert_eq!(Slot::Zero.other(), Slot::One);
        assert_eq!(Slot::One.other(), Slot::Zero);
        assert_eq!(Slot::Zero.other().other(), Slot::Zero);
    }

    #[test]
    fn index_round_trips() {
        assert_eq!(Slot::from_index(Slot::Zero.index()), Some(Slot::Zero));
        assert_eq!(Slot::from_index(Slot::One.index()), Some(Slot::One));
        assert_eq!(Slot::from_index(2), None);
    }

    #[test]
    fn pair_at_uses_same_slot() {
        let pair = BufferPair::at(Slot::One);
        assert_eq!(pair.tx, Slot::One);
        assert_eq!(pair.rx, Slot::One);
    }
}
