//! # i2s-loopback
//!
//! A `no_std`, zero-allocation self-test for a full-duplex I²S link with its
//! data output wired straight back to its data input. A known counting
//! pattern is streamed through two ping-pong buffer pairs and every received
//! block is checked against what was sent.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Memory | [`buffer`] | Two transmit and two receive blocks with exclusive leases |
//! | Data | [`frame`] / [`pattern`] / [`verify`] | Frame packing, sequence generation and checking |
//! | State | [`session`] | Counters and pass/fail status of one run |
//! | Handoff | [`exchange`] / [`bridge`] | ISR-side re-arm and mailbox publication |
//! | Driver | [`bus`] | `AudioBus` trait the board layer implements |
//! | Control | [`stream`] | Arm, drain, stop; the cooperative test loop |
//! | Codec | [`codec`] | ES8374 codec driver (feature-gated) |
//!
//! ## Quick start
//!
//! ```ignore
//! use i2s_loopback::buffer::BufferPool;
//! use i2s_loopback::bus::{BusConfig, BusLock};
//! use i2s_loopback::constants::BLOCK_FRAMES;
//! use i2s_loopback::exchange::Exchange;
//! use i2s_loopback::stream::{StreamConfig, StreamController};
//!
//! static POOL: BufferPool<BLOCK_FRAMES> = BufferPool::new();
//! static EXCHANGE: Exchange = Exchange::new();
//!
//! // In the I2S completion interrupt, with the shared bus locked:
//! //     TransferBridge::new(&EXCHANGE).on_transfer(bus, released, status)
//!
//! // `shared_bus` implements `BusLock`; see the `stream` module for RTIC.
//! let mut test = StreamController::new(&POOL, &EXCHANGE, StreamConfig::default());
//! shared_bus.lock(|bus| test.init_bus(bus, &BusConfig::default()))?;
//! let report = test.run(shared_bus, cortex_m::asm::wfe)?;
//! if !report.passed() {
//!     log::error!("loopback failed: {:?}", report.first_mismatch);
//! }
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `es8374` | yes | ES8374 codec driver (requires `embedded-hal`) |
//!
//! ## Test parameters
//!
//! - **Block size:** 512 frames ([`constants::BLOCK_FRAMES`])
//! - **Blocks per run:** 20 ([`constants::BLOCKS_TO_TRANSFER`])
//! - **Frame format:** left `u16` in the low half-word, right in the high
//! - **Sample rate:** 44 444 Hz with the default [`bus::BusConfig`]

#![cfg_attr(not(test), no_std)]

pub mod constants;
pub mod frame;
pub mod buffer;
pub mod session;
pub mod pattern;
pub mod verify;
pub mod exchange;
pub mod bus;
pub mod bridge;
pub mod stream;
pub mod control;

#[cfg(feature = "es8374")]
pub mod codec;
