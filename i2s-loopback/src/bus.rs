//! Contract for the audio bus (I2S) peripheral driver.
//!
//! The engine never touches peripheral registers. A board support layer
//! implements [`AudioBus`] over its DMA-capable I2S driver and forwards the
//! driver's completion interrupt to
//! [`TransferBridge::on_transfer`](crate::bridge::TransferBridge::on_transfer).
//!
//! ## Double-buffer contract
//!
//! ```text
//! start(P0)            bus runs leg 0 on P0
//! IRQ(None)            "give me the pair after P0"      -> set_next_buffers(P1)
//! IRQ(Some(P0))        P0 released, bus now on P1       -> set_next_buffers(P0)
//! IRQ(Some(P1))        P1 released, bus now on P0       -> set_next_buffers(P1)
//! ...
//! stop()
//! IRQ(Some(Px), none)  final release, no buffers needed -> nothing
//! ```

use core::ops::BitOr;

use thiserror::Error;

use crate::buffer::BufferPair;

/// Source clock feeding the master-clock divider, in Hz.
pub const MCK_SOURCE_HZ: u32 = 32_000_000;

/// Bits per sample on the wire. Fixed for the self-test.
pub const SAMPLE_WIDTH_BITS: u32 = 16;

/// Channels per frame. Fixed for the self-test.
pub const CHANNELS: u32 = 2;

/// Who drives the bit and frame clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Master,
    Slave,
}

/// Frame format on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Philips I2S: data delayed one bit clock after the LRCK edge.
    I2s,
    /// Left- or right-aligned: data starts on the LRCK edge.
    Aligned,
}

/// Invalid bus configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("master clock divider must be non-zero")]
    ZeroDivider,
    #[error("MCK/LRCK ratio {ratio} is below the {minimum} bit clocks one frame needs")]
    RatioTooSmall { ratio: u16, minimum: u16 },
}

/// Peripheral setup for the loopback test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    pub mode: Mode,
    pub format: Format,
    /// `MCK = MCK_SOURCE_HZ / mck_divider`.
    pub mck_divider: u32,
    /// `LRCK = MCK / ratio`.
    pub ratio: u16,
}

impl BusConfig {
    /// Master, I2S format, MCK = 32 MHz / 15, ratio 48: LRCK ≈ 44.44 kHz.
    pub const fn new() -> Self {
        BusConfig {
            mode: Mode::Master,
            format: Format::I2s,
            mck_divider: 15,
            ratio: 48,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mck_divider == 0 {
            return Err(ConfigError::ZeroDivider);
        }
        let minimum = (SAMPLE_WIDTH_BITS * CHANNELS) as u16;
        if self.ratio < minimum {
            return Err(ConfigError::RatioTooSmall {
                ratio: self.ratio,
                minimum,
            });
        }
        Ok(())
    }

    /// Master clock frequency in Hz (0 if the divider is invalid).
    pub const fn mck_hz(&self) -> u32 {
        if self.mck_divider == 0 {
            0
        } else {
            MCK_SOURCE_HZ / self.mck_divider
        }
    }

    /// Frame (LRCK) rate in Hz, i.e. the audio sample rate.
    pub const fn sample_rate_hz(&self) -> u32 {
        if self.ratio == 0 {
            0
        } else {
            self.mck_hz() / self.ratio as u32
        }
    }

    /// Serial bit clock in Hz: `2 × LRCK × sample width`.
    pub const fn sck_hz(&self) -> u32 {
        self.sample_rate_hz() * CHANNELS * SAMPLE_WIDTH_BITS
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Flags passed to [`AudioBus::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartFlags(pub u32);

impl StartFlags {
    pub const NONE: StartFlags = StartFlags(0);
}

/// Status delivered with every completion interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferStatus(u32);

impl TransferStatus {
    /// Nothing requested; the final release after `stop()`.
    pub const NONE: TransferStatus = TransferStatus(0);
    /// The bus needs the next buffer pair before the current leg ends.
    pub const NEXT_BUFFERS_NEEDED: TransferStatus = TransferStatus(1 << 0);

    pub const fn from_bits(bits: u32) -> Self {
        TransferStatus(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: TransferStatus) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn needs_next_buffers(self) -> bool {
        self.contains(Self::NEXT_BUFFERS_NEEDED)
    }
}

impl BitOr for TransferStatus {
    type Output = TransferStatus;

    fn bitor(self, rhs: Self) -> Self {
        TransferStatus(self.0 | rhs.0)
    }
}

/// Double-buffered audio bus driver.
pub trait AudioBus {
    /// Driver error type.
    type Error: core::fmt::Debug;

    /// Configure the peripheral. Called once before the first session.
    fn init(&mut self, config: &BusConfig) -> Result<(), Self::Error>;

    /// Begin transferring `initial`, `block_frames` frames per leg.
    fn start(
        &mut self,
        initial: BufferPair,
        block_frames: usize,
        flags: StartFlags,
    ) -> Result<(), Self::Error>;

    /// Queue the pair for the leg after the current one.
    ///
    /// Must be callable from interrupt context and must not block.
    fn set_next_buffers(&mut self, next: BufferPair) -> Result<(), Self::Error>;

    /// Stop the transfer. The driver may still deliver one final completion
    /// without [`TransferStatus::NEXT_BUFFERS_NEEDED`].
    fn stop(&mut self);
}

/// Short-lived exclusive access to a bus that is shared with its completion
/// interrupt.
///
/// The interrupt needs the bus to re-arm it, so the test loop may only hold
/// it for the duration of `f`. With RTIC, forward to the shared resource's
/// `lock`; a bus owned outright by the caller is its own lock.
pub trait BusLock {
    type Bus: AudioBus;

    fn lock<R>(&mut self, f: impl FnOnce(&mut Self::Bus) -> R) -> R;
}

impl<B: AudioBus> BusLock for &mut B {
    type Bus = B;

    fn lock<R>(&mut self, f: impl FnOnce(&mut B) -> R) -> R {
        f(&mut **self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_rates() {
        let config = BusConfig::default();
        assert_eq!(config.mode, Mode::Master);
        assert_eq!(config.format, Format::I2s);
        assert_eq!(config.mck_hz(), 2_133_333);
        assert_eq!(config.sample_rate_hz(), 44_444);
        assert_eq!(config.sck_hz(), 44_444 * 32);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn zero_divider_rejected() {
        let config = BusConfig {
            mck_divider: 0,
            ..BusConfig::new()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDivider));
        assert_eq!(config.sample_rate_hz(), 0);
    }

    #[test]
    fn ratio_below_frame_width_rejected() {
        let config = BusConfig {
            ratio: 24,
            ..BusConfig::new()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::RatioTooSmall {
                ratio: 24,
                minimum: 32
            })
        );
    }

    #[test]
    fn status_flags() {
        assert!(!TransferStatus::NONE.needs_next_buffers());
        assert!(TransferStatus::NEXT_BUFFERS_NEEDED.needs_next_buffers());

        let combined = TransferStatus::from_bits(1 << 4) | TransferStatus::NEXT_BUFFERS_NEEDED;
        assert!(combined.needs_next_buffers());
        assert_eq!(combined.bits(), 0b1_0001);
    }
}
