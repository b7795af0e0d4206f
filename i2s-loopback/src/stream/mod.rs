//! The cooperative test loop.
//!
//! [`StreamController`] arms the bus, sleeps until the
//! [`TransferBridge`](crate::bridge::TransferBridge) raises the exchange
//! event, refills released transmit buffers, checks released receive buffers
//! and stops after [`StreamConfig::block_target`] checked blocks.
//!
//! The bus is shared with the completion interrupt, so the loop reaches it
//! through a [`BusLock`](crate::bus::BusLock) and holds it only to start and
//! stop the session.
//!
//! ## Usage with RTIC
//!
//! ```ignore
//! static POOL: BufferPool<BLOCK_FRAMES> = BufferPool::new();
//! static EXCHANGE: Exchange = Exchange::new();
//!
//! /// Main-context handle on the shared `bus` resource.
//! struct MainBus<'a, M>(&'a mut M);
//!
//! impl<M: rtic::Mutex<T = I2sBus>> BusLock for MainBus<'_, M> {
//!     type Bus = I2sBus;
//!
//!     fn lock<R>(&mut self, f: impl FnOnce(&mut I2sBus) -> R) -> R {
//!         self.0.lock(f)
//!     }
//! }
//!
//! #[idle(shared = [bus], local = [led, delay])]
//! fn idle(mut cx: idle::Context) -> ! {
//!     let mut controller = StreamController::new(&POOL, &EXCHANGE, StreamConfig::default());
//!     let _ = cx.shared.bus.lock(|bus| controller.init_bus(bus, &BusConfig::default()));
//!     loop {
//!         let passed = controller
//!             .run(MainBus(&mut cx.shared.bus), cortex_m::asm::wfe)
//!             .map_or(false, |report| report.passed());
//!         cx.local.led.set(passed);
//!         cx.local.delay.delay_ms(PAUSE_MS);
//!     }
//! }
//! ```

pub mod controller;

pub use controller::{
    DrainOrder, StreamConfig, StreamController, StreamError, StreamReport, StreamState,
};
