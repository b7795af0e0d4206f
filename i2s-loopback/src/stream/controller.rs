//! Session lifecycle: arm, drain until the block target, stop.
//!
//! ```text
//! Idle ──arm──► Arming ──start ok──► Streaming ──target reached──► Draining ──stop──► Idle
//!                                        │
//!                                        └─ verifier mismatch latches Status::Failed
//! ```

use core::fmt::Debug;

use log::{debug, error, info};
use thiserror::Error;

use crate::buffer::{BufferPair, BufferPool, Direction, Slot};
use crate::bus::{AudioBus, BusConfig, BusLock, ConfigError, StartFlags};
use crate::constants::BLOCKS_TO_TRANSFER;
use crate::exchange::Exchange;
use crate::pattern;
use crate::session::{Mismatch, Session, Status};
use crate::verify;

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Arming,
    Streaming,
    Draining,
}

/// Which mailbox is serviced first after a wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrainOrder {
    #[default]
    FillFirst,
    CheckFirst,
}

/// Per-session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Checked blocks after which the session stops.
    pub block_target: u32,
    pub drain_order: DrainOrder,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            block_target: BLOCKS_TO_TRANSFER,
            drain_order: DrainOrder::default(),
        }
    }
}

/// Errors that end a session early.
#[derive(Debug, Error)]
pub enum StreamError<E: Debug> {
    #[error("invalid bus configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("bus init failed: {0:?}")]
    Init(E),
    #[error("bus start failed: {0:?}")]
    Start(E),
    #[error("bus refused the next buffer pair")]
    Rearm,
    #[error("{direction:?} buffer {slot:?} is still leased")]
    Busy { direction: Direction, slot: Slot },
    #[error("a session is already in progress")]
    NotIdle,
    #[error("no session is streaming")]
    NotStreaming,
}

/// Outcome of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamReport {
    /// Receive blocks drained from the check mailbox.
    pub blocks: u32,
    pub status: Status,
    /// The first bad frame, if any block failed.
    pub first_mismatch: Option<Mismatch>,
}

impl StreamReport {
    pub fn passed(&self) -> bool {
        self.status == Status::Running
    }
}

/// Failure inside one drain pass, before it is tied to a bus error type.
enum DrainFault {
    Busy { direction: Direction, slot: Slot },
}

impl<E: Debug> From<DrainFault> for StreamError<E> {
    fn from(fault: DrainFault) -> Self {
        match fault {
            DrainFault::Busy { direction, slot } => StreamError::Busy { direction, slot },
        }
    }
}

/// Cooperative half of the loopback test.
///
/// Owns the [`Session`]; shares the buffer pool and the [`Exchange`] with
/// the interrupt-side [`TransferBridge`](crate::bridge::TransferBridge).
pub struct StreamController<'a, const N: usize> {
    pool: &'a BufferPool<N>,
    exchange: &'a Exchange,
    config: StreamConfig,
    session: Session,
    state: StreamState,
}

impl<'a, const N: usize> StreamController<'a, N> {
    pub fn new(pool: &'a BufferPool<N>, exchange: &'a Exchange, config: StreamConfig) -> Self {
        StreamController {
            pool,
            exchange,
            config,
            session: Session::new(),
            state: StreamState::Idle,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    fn transition(&mut self, next: StreamState) {
        debug!("stream: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Validate `config` and hand it to the bus driver.
    pub fn init_bus<B: AudioBus>(
        &mut self,
        bus: &mut B,
        config: &BusConfig,
    ) -> Result<(), StreamError<B::Error>> {
        config.validate()?;
        bus.init(config).map_err(|err| {
            error!("bus init failed: {:?}", err);
            StreamError::Init(err)
        })
    }

    /// Reset the session, fill the initial transmit buffer and start the bus.
    ///
    /// Leaves the controller in [`StreamState::Streaming`] on success and
    /// [`StreamState::Idle`] on failure.
    pub fn arm<B: AudioBus>(&mut self, bus: &mut B) -> Result<(), StreamError<B::Error>> {
        if self.state != StreamState::Idle {
            return Err(StreamError::NotIdle);
        }
        self.transition(StreamState::Arming);

        self.session.reset();
        self.exchange.reset();

        let pool = self.pool;
        let Some(mut tx) = pool.lease(Direction::Transmit, Slot::INITIAL) else {
            self.transition(StreamState::Idle);
            return Err(StreamError::Busy {
                direction: Direction::Transmit,
                slot: Slot::INITIAL,
            });
        };
        pattern::fill(&mut tx[..], &mut self.session);
        drop(tx);

        if let Err(err) = bus.start(BufferPair::at(Slot::INITIAL), N, StartFlags::NONE) {
            error!("bus start failed: {:?}", err);
            self.transition(StreamState::Idle);
            return Err(StreamError::Start(err));
        }

        self.transition(StreamState::Streaming);
        Ok(())
    }

    /// Service whatever the bridge has published since the last call.
    ///
    /// Returns `true` once the block target is reached; no further blocks
    /// are taken after that. Call after each wake-up while
    /// [`StreamState::Streaming`]; in any other state nothing is drained and
    /// [`StreamError::NotStreaming`] is returned.
    pub fn drain<E: Debug>(&mut self) -> Result<bool, StreamError<E>> {
        if self.state != StreamState::Streaming {
            return Err(StreamError::NotStreaming);
        }
        if self.exchange.has_fault() {
            return Err(StreamError::Rearm);
        }
        if self.target_reached() {
            return Ok(true);
        }

        match self.config.drain_order {
            DrainOrder::FillFirst => {
                self.drain_fill()?;
                self.drain_check()?;
            }
            DrainOrder::CheckFirst => {
                self.drain_check()?;
                self.drain_fill()?;
            }
        }

        Ok(self.target_reached())
    }

    fn target_reached(&self) -> bool {
        self.session.blocks_transferred >= self.config.block_target
    }

    fn drain_fill(&mut self) -> Result<(), DrainFault> {
        let Some(slot) = self.exchange.fill.take() else {
            return Ok(());
        };
        let pool = self.pool;
        let mut tx = pool.lease(Direction::Transmit, slot).ok_or(DrainFault::Busy {
            direction: Direction::Transmit,
            slot,
        })?;
        pattern::fill(&mut tx[..], &mut self.session);
        Ok(())
    }

    fn drain_check(&mut self) -> Result<(), DrainFault> {
        let Some(slot) = self.exchange.check.take() else {
            return Ok(());
        };

        // Once a block has failed the rest of the session is only counted.
        if self.session.has_failed() {
            self.session.blocks_transferred += 1;
            return Ok(());
        }

        let pool = self.pool;
        let rx = pool.lease(Direction::Receive, slot).ok_or(DrainFault::Busy {
            direction: Direction::Receive,
            slot,
        })?;
        self.session.blocks_transferred += 1;
        if let Err(mismatch) = verify::check_block(&rx[..], &mut self.session) {
            self.session.mark_failed(Some(mismatch));
        }
        Ok(())
    }

    /// Stop the bus and return to [`StreamState::Idle`].
    ///
    /// Completions the driver delivers after this are the bridge's no-op case.
    /// Outside [`StreamState::Streaming`] the bus is left alone and the last
    /// report is returned unchanged.
    pub fn finish<B: AudioBus>(&mut self, bus: &mut B) -> StreamReport {
        if self.state != StreamState::Streaming {
            return self.report();
        }
        self.transition(StreamState::Draining);
        bus.stop();
        self.transition(StreamState::Idle);

        let report = self.report();
        info!("session done: {} blocks, {:?}", report.blocks, report.status);
        report
    }

    pub fn report(&self) -> StreamReport {
        StreamReport {
            blocks: self.session.blocks_transferred,
            status: self.session.status,
            first_mismatch: self.session.first_mismatch,
        }
    }

    fn abort<B: AudioBus>(&mut self, bus: &mut B) {
        error!("stream aborted after {} blocks", self.session.blocks_transferred);
        bus.stop();
        self.transition(StreamState::Idle);
    }

    /// Run one complete session.
    ///
    /// The bus is locked only to start it and to stop it; between those the
    /// completion interrupt owns it. `idle` is called whenever the loop waits
    /// for the bridge (see [`Event::wait`](crate::exchange::Event::wait)).
    pub fn run<L, W>(
        &mut self,
        mut bus: L,
        mut idle: W,
    ) -> Result<StreamReport, StreamError<<L::Bus as AudioBus>::Error>>
    where
        L: BusLock,
        W: FnMut(),
    {
        bus.lock(|bus| self.arm(bus))?;

        let exchange = self.exchange;
        loop {
            exchange.event.wait(&mut idle);

            match self.drain() {
                Ok(true) => break,
                Ok(false) => {}
                Err(err) => {
                    bus.lock(|bus| self.abort(bus));
                    return Err(err);
                }
            }
        }

        Ok(bus.lock(|bus| self.finish(bus)))
    }
}
