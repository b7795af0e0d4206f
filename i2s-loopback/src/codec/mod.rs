//! ES8374 audio codec driver module.
//!
//! Drives the Everest ES8374 mono codec that sits on the far side of the
//! loopback when the test runs through analog audio instead of a bare wire.
//!
//! # Feature gate
//!
//! This module is available when the `es8374` feature is enabled (on by default).

pub(crate) mod registers;
mod es8374;

pub use es8374::{
    BitLength, ClockRole, CodecConfig, CodecError, Es8374, I2sFormat, LclkDiv, MclkDiv, MicGain,
    Module,
};
