//! ES8374 register addresses and bitfield definitions.
//!
//! Register addresses and values are both 8-bit. A write is a two-byte I2C
//! transfer `[register, value]`; a read is a one-byte write of the register
//! address followed by a one-byte read.

// The PLL and timing registers are only written with fixed values during
// init; their fields are listed for reference.
#![allow(dead_code)]

// ── I2C address ────────────────────────────────────────────────────────────

/// 7-bit I2C address (CE pin low).
pub const I2C_ADDR: u8 = 0x10;

// ── Reset and clocking ─────────────────────────────────────────────────────

/// Chip reset / state machine control.
/// - `0x3F` — reset start
/// - `0x03` — reset stop
/// - `0x80` — start the chip
/// - `0x7F` — reset and hold stopped
pub const RESET: u8 = 0x00;

/// Clock manager: per-block clock enables (`0x7F` = all on).
pub const CLK_MANAGER: u8 = 0x01;

/// LRCK divider, high byte.
pub const LRCK_DIV_HI: u8 = 0x06;
/// LRCK divider, low byte.
pub const LRCK_DIV_LO: u8 = 0x07;

/// Class-D clock divider.
pub const CLASS_D_DIV: u8 = 0x08;

/// PLL control 1.
/// - Bit 6 — PLL reset off
/// - Bit 0 — PLL set start
pub const PLL_CTRL1: u8 = 0x09;
/// PLL control 2.
pub const PLL_CTRL2: u8 = 0x0A;
/// PLL N divider.
pub const PLL_N: u8 = 0x0B;
/// PLL K divider, bits 23:16.
pub const PLL_K2: u8 = 0x0C;
/// PLL K divider, bits 15:8.
pub const PLL_K1: u8 = 0x0D;
/// PLL K divider, bits 7:0.
pub const PLL_K0: u8 = 0x0E;

/// Clock mode.
/// - Bit 7   — MSC (0 = slave, 1 = master)
/// - Bits 4:0 — BCLK divider code (see `MclkDiv`)
pub const CLK_MODE: u8 = 0x0F;
pub const CLK_MODE_MASTER: u8 = 1 << 7;
pub const CLK_MODE_DIV_MASK: u8 = 0x1F;

// ── Serial data ports ──────────────────────────────────────────────────────

/// ADC serial data port.
/// - Bits 7:6 — ADC power down
/// - Bits 4:2 — word length (see `BitLength`)
/// - Bits 1:0 — format (see `I2sFormat`)
pub const ADC_SDP: u8 = 0x10;

/// DAC serial data port. Same layout as [`ADC_SDP`].
pub const DAC_SDP: u8 = 0x11;

pub const SDP_POWER_DOWN: u8 = 0xC0;
pub const SDP_WORD_LENGTH_MASK: u8 = 0x1C;
pub const SDP_WORD_LENGTH_SHIFT: u8 = 2;
pub const SDP_FORMAT_MASK: u8 = 0x03;

/// Serial port timing.
pub const SDP_TIMING1: u8 = 0x12;
pub const SDP_TIMING2: u8 = 0x13;

// ── Analog power ───────────────────────────────────────────────────────────

/// Analog reference control.
pub const ANALOG_REF: u8 = 0x14;

/// Analog power.
/// - Bit 5 — DAC power down
pub const ANALOG_POWER: u8 = 0x15;
pub const ANALOG_POWER_DAC_DOWN: u8 = 1 << 5;

// ── Output mixers ──────────────────────────────────────────────────────────

/// Mono-out control.
/// - Bit 6 — mono mixer enable
/// - Bit 5 — mono out enable
/// - Bit 3 — line-out disable
pub const MONO_OUT: u8 = 0x1A;
pub const MONO_MIXER_ON: u8 = 1 << 6;
pub const MONO_OUT_ON: u8 = 1 << 5;
pub const LINE_OUT_OFF: u8 = 1 << 3;

/// Mono-out gain.
pub const MONO_GAIN: u8 = 0x1B;

/// Speaker mixer.
/// - Bit 7 — DAC to speaker mixer
/// - Bit 6 — speaker mixer enable
pub const SPK_MIXER: u8 = 0x1C;
pub const SPK_MIXER_DAC: u8 = 1 << 7;
pub const SPK_MIXER_ON: u8 = 1 << 6;

/// Speaker mute / gain (`0x12` = muted, `0x02` = on).
pub const SPK_CTRL: u8 = 0x1D;
pub const SPK_MUTED: u8 = 0x12;
pub const SPK_ON: u8 = 0x02;

/// Class-D driver (`0x20` = off, `0xA0` = on).
pub const CLASS_D: u8 = 0x1E;
pub const CLASS_D_OFF: u8 = 0x20;
pub const CLASS_D_ON: u8 = 0xA0;

/// Speaker output gain.
pub const SPK_GAIN: u8 = 0x1F;

// ── ADC path ───────────────────────────────────────────────────────────────

/// ADC input select and power.
/// - Bits 7:6 — input power down
/// - Bits 5:4 — input select (`01` = LIN1/RIN1)
/// - Bit 2    — PGA +18 dB boost
pub const ADC_INPUT: u8 = 0x21;
pub const ADC_INPUT_POWER_DOWN: u8 = 0xC0;
pub const ADC_INPUT_SELECT_MASK: u8 = 0x30;
pub const ADC_INPUT_LIN1: u8 = 0x14;

/// Microphone PGA gain: one 4-bit code per channel, 3 dB per step.
pub const MIC_PGA: u8 = 0x22;

/// ADC control.
pub const ADC_CTRL: u8 = 0x24;

/// ADC digital volume: 0.5 dB per step of attenuation, `0x00` = 0 dB.
pub const ADC_VOLUME: u8 = 0x25;

/// ALC control.
pub const ALC_CTRL: u8 = 0x28;

// ── DAC path ───────────────────────────────────────────────────────────────

/// DAC control.
/// - Bit 5 — soft mute
pub const DAC_CTRL: u8 = 0x36;
pub const DAC_MUTE: u8 = 1 << 5;

/// DAC ramp / automute.
pub const DAC_RAMP: u8 = 0x37;

/// DAC digital volume: 0.5 dB per step of attenuation, `0x00` = 0 dB,
/// `0xC0` = −96 dB.
pub const DAC_VOLUME: u8 = 0x38;

// ── GPIO and misc ──────────────────────────────────────────────────────────

/// GPIO1 = DMIC clock out, GPIO2 = PLL clock out.
pub const GPIO_SEL: u8 = 0x6D;
pub const PLL_MODE_ENABLE: u8 = 0x6F;
pub const AUTOMUTE: u8 = 0x71;
pub const PLL_MODE_SET: u8 = 0x72;
pub const ANALOG_MISC: u8 = 0x73;
