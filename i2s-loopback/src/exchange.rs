//! Hand-off between the bus interrupt and the cooperative test loop.
//!
//! The interrupt context (the [`TransferBridge`](crate::bridge::TransferBridge))
//! is the only producer; the [`StreamController`](crate::stream::StreamController)
//! loop is the only consumer. They share:
//!
//! - two single-slot [`Mailbox`]es: "transmit buffer needs filling" and
//!   "receive buffer needs checking"
//! - one edge-triggered [`Event`] the producer raises on every bus completion
//! - a fault latch for a failed re-arm
//!
//! # Lossy on overwrite
//!
//! A mailbox holds one slot, not a queue. If the producer publishes again
//! before the consumer took the previous value, the previous buffer is lost
//! and nothing reports it. The consumer must drain both mailboxes within one
//! bus leg.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::buffer::Slot;

const EMPTY: u8 = u8::MAX;

/// Single-slot, overwrite-on-publish notification for one buffer slot.
pub struct Mailbox {
    slot: AtomicU8,
}

impl Mailbox {
    pub const fn new() -> Self {
        Mailbox {
            slot: AtomicU8::new(EMPTY),
        }
    }

    /// Store `slot`, replacing whatever was there (producer side).
    pub fn publish(&self, slot: Slot) {
        self.slot.store(slot.index() as u8, Ordering::Release);
    }

    /// Remove and return the pending slot, if any (consumer side).
    pub fn take(&self) -> Option<Slot> {
        let raw = self.slot.swap(EMPTY, Ordering::AcqRel);
        Slot::from_index(raw as usize)
    }

    /// Look at the pending slot without draining it.
    pub fn peek(&self) -> Option<Slot> {
        Slot::from_index(self.slot.load(Ordering::Acquire) as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.peek().is_none()
    }

    pub fn clear(&self) {
        self.slot.store(EMPTY, Ordering::Release);
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Edge-triggered wake-up flag.
///
/// Any number of [`signal()`](Self::signal) calls before the consumer wakes
/// collapse into one wake-up; this is not a counting semaphore.
pub struct Event {
    pending: AtomicBool,
}

impl Event {
    pub const fn new() -> Self {
        Event {
            pending: AtomicBool::new(false),
        }
    }

    /// Raise the event (producer side, never blocks).
    pub fn signal(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Consume a pending event. Returns `false` if none was raised.
    pub fn try_wait(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Suspend until the event is raised, calling `idle` between polls.
    ///
    /// `idle` must return once a [`signal()`](Self::signal) lands after the
    /// last poll, including one that lands before `idle` starts sleeping.
    /// On Cortex-M, `cortex_m::asm::wfe` meets this only if the signalling
    /// interrupt also sets the event register: the ISR ends with
    /// `cortex_m::asm::sev()`, or `SCB.SCR.SEVONPEND` is set. A stale event
    /// makes `wfe` return early; the loop then just polls again.
    pub fn wait(&self, mut idle: impl FnMut()) {
        while !self.try_wait() {
            idle();
        }
    }

    pub fn clear(&self) {
        self.pending.store(false, Ordering::Release);
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the two contexts share. Place it in a `static`.
pub struct Exchange {
    /// Transmit slot released by the bus that must be refilled.
    pub fill: Mailbox,
    /// Receive slot released by the bus that must be checked.
    pub check: Mailbox,
    /// Raised on every bus completion.
    pub event: Event,
    fault: AtomicBool,
}

impl Exchange {
    pub const fn new() -> Self {
        Exchange {
            fill: Mailbox::new(),
            check: Mailbox::new(),
            event: Event::new(),
            fault: AtomicBool::new(false),
        }
    }

    /// Record that the bus refused the next buffer pair.
    pub fn raise_fault(&self) {
        self.fault.store(true, Ordering::Release);
    }

    pub fn has_fault(&self) -> bool {
        self.fault.load(Ordering::Acquire)
    }

    /// Drop any state left from a previous session.
    pub fn reset(&self) {
        self.fill.clear();
        self.check.clear();
        self.event.clear();
        self.fault.store(false, Ordering::Release);
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mailbox_takes_none() {
        let mailbox = Mailbox::new();
        assert!(mailbox.is_empty());
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn take_drains_mailbox() {
        let mailbox = Mailbox::new();
        mailbox.publish(Slot::One);
        assert_eq!(mailbox.peek(), Some(Slot::One));
        assert_eq!(mailbox.take(), Some(Slot::One));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn publish_overwrites_without_queueing() {
        let mailbox = Mailbox::new();
        mailbox.publish(Slot::Zero);
        mailbox.publish(Slot::One);
        // The first notification is gone.
        assert_eq!(mailbox.take(), Some(Slot::One));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn event_is_edge_triggered() {
        let event = Event::new();
        assert!(!event.try_wait());
        event.signal();
        event.signal();
        assert!(event.try_wait());
        assert!(!event.try_wait());
    }

    #[test]
    fn wait_idles_until_signalled() {
        let event = Event::new();
        let mut polls = 0;
        event.wait(|| {
            polls += 1;
            if polls == 3 {
                event.signal();
            }
        });
        assert_eq!(polls, 3);
        assert!(!event.try_wait());
    }

    #[test]
    fn wait_returns_immediately_when_pending() {
        let event = Event::new();
        event.signal();
        event.wait(|| panic!("should not idle"));
    }

    #[test]
    fn reset_clears_all_state() {
        let exchange = Exchange::new();
        exchange.fill.publish(Slot::Zero);
        exchange.check.publish(Slot::One);
        exchange.event.signal();
        exchange.raise_fault();

        exchange.reset();
        assert!(exchange.fill.is_empty());
        assert!(exchange.check.is_empty());
        assert!(!exchange.event.try_wait());
        assert!(!exchange.has_fault());
    }
}
