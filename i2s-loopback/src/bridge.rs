//! Interrupt-side half of the ping-pong exchange.
//!
//! [`TransferBridge::on_transfer`] is called from the bus completion ISR. It
//! commits the next buffer pair to the bus before returning, then tells the
//! cooperative loop which buffers it may now refill and check.
//!
//! ## Usage with RTIC
//!
//! ```ignore
//! static EXCHANGE: Exchange = Exchange::new();
//!
//! #[task(binds = I2S, shared = [bus], priority = 2)]
//! fn i2s_isr(mut cx: i2s_isr::Context) {
//!     let (released, status) = /* read from the driver event */;
//!     let bridge = TransferBridge::new(&EXCHANGE);
//!     cx.shared.bus.lock(|bus| {
//!         let _ = bridge.on_transfer(bus, released, status);
//!     });
//!     cortex_m::asm::sev();
//! }
//! ```
//!
//! The main context takes the same `bus` resource only inside
//! [`BusLock::lock`](crate::bus::BusLock::lock) (see [`stream`](crate::stream)),
//! so this task is never masked while the loop waits.

use log::error;

use crate::buffer::{BufferPair, Slot};
use crate::bus::{AudioBus, TransferStatus};
use crate::exchange::Exchange;

/// What the bridge did for one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeAction {
    /// The bus needs no more buffers (post-stop release). Nothing was armed
    /// or published.
    Idle,
    /// First completion after start: the alternate pair was armed and its
    /// transmit slot published for filling. No receive data exists yet.
    Primed { next: BufferPair },
    /// A pair was released: it was re-armed and published for fill and check.
    Recycled { pair: BufferPair },
}

/// Bus completion handler. Cheap to construct; holds only the shared exchange.
pub struct TransferBridge<'a> {
    exchange: &'a Exchange,
}

impl<'a> TransferBridge<'a> {
    pub const fn new(exchange: &'a Exchange) -> Self {
        TransferBridge { exchange }
    }

    /// Handle one bus completion.
    ///
    /// Re-arms the bus synchronously, before either mailbox is written, and
    /// raises the wake-up event on every call. A re-arm error is latched in
    /// the exchange (the test loop aborts on it) and returned to the ISR.
    pub fn on_transfer<B: AudioBus>(
        &self,
        bus: &mut B,
        released: Option<BufferPair>,
        status: TransferStatus,
    ) -> Result<BridgeAction, B::Error> {
        let action = self.dispatch(bus, released, status);
        self.exchange.event.signal();
        action
    }

    fn dispatch<B: AudioBus>(
        &self,
        bus: &mut B,
        released: Option<BufferPair>,
        status: TransferStatus,
    ) -> Result<BridgeAction, B::Error> {
        if !status.needs_next_buffers() {
            return Ok(BridgeAction::Idle);
        }

        match released {
            None => {
                let next = BufferPair::at(Slot::INITIAL.other());
                self.rearm(bus, next)?;
                self.exchange.fill.publish(next.tx);
                Ok(BridgeAction::Primed { next })
            }
            Some(pair) => {
                // The bus is done with `pair`; it becomes the leg after the
                // one now running.
                self.rearm(bus, pair)?;
                self.exchange.check.publish(pair.rx);
                self.exchange.fill.publish(pair.tx);
                Ok(BridgeAction::Recycled { pair })
            }
        }
    }

    fn rearm<B: AudioBus>(&self, bus: &mut B, pair: BufferPair) -> Result<(), B::Error> {
        bus.set_next_buffers(pair).map_err(|err| {
            error!("next buffers rejected: {:?}", err);
            self.exchange.raise_fault();
            err
        })
    }
}
