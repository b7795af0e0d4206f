//! ES8374 audio codec driver.
//!
//! The driver is generic over any [`embedded_hal::i2c::I2c`] implementation.
//! It performs no delays of its own; the chip accepts the init sequence
//! back-to-back.
//!
//! # Example
//!
//! ```ignore
//! let mut codec = Es8374::new(i2c);
//! codec.init(&CodecConfig::default())?;
//! codec.start(Module::AdcDac)?;
//! codec.set_volume(80)?;
//! ```

use core::fmt::Debug;

use embedded_hal::i2c::I2c;
use log::{debug, warn};
use thiserror::Error;

use super::registers as reg;
use crate::control::AudioControl;

// ── Public enums ───────────────────────────────────────────────────────────

/// Which converter paths an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Adc,
    Dac,
    AdcDac,
    /// Analog line-in straight to the speaker mixer.
    Line,
}

impl Module {
    fn has_adc(self) -> bool {
        matches!(self, Module::Adc | Module::AdcDac)
    }

    fn has_dac(self) -> bool {
        matches!(self, Module::Dac | Module::AdcDac)
    }
}

/// Whether the codec drives the I2S clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockRole {
    Slave = 0,
    Master = 1,
}

/// Serial data format, written to the low two bits of the SDP registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2sFormat {
    Normal = 0,
    Left = 1,
    Right = 2,
    Dsp = 3,
}

/// Word length code for the SDP registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitLength {
    Bits24 = 0x00,
    Bits20 = 0x01,
    Bits18 = 0x02,
    Bits16 = 0x03,
    Bits32 = 0x04,
}

/// BCLK divider from MCLK. The discriminant is the 5-bit code written to the
/// clock mode register; it is not the divider value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MclkDiv {
    Div1 = 1,
    Div2 = 2,
    Div3 = 3,
    Div4 = 4,
    Div5 = 5,
    Div6 = 6,
    Div7 = 7,
    Div8 = 8,
    Div9 = 9,
    Div10 = 10,
    Div11 = 11,
    Div12 = 12,
    Div13 = 13,
    Div14 = 14,
    Div15 = 15,
    Div16 = 16,
    Div17 = 17,
    Div18 = 18,
    Div20 = 19,
    Div22 = 20,
    Div24 = 21,
    Div25 = 22,
    Div30 = 23,
    Div32 = 24,
    Div33 = 25,
    Div34 = 26,
    Div36 = 27,
    Div44 = 28,
    Div48 = 29,
    Div66 = 30,
    Div72 = 31,
}

impl MclkDiv {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// MCLK/LRCK ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum LclkDiv {
    Div48 = 48,
    Div96 = 96,
    Div125 = 125,
    Div128 = 128,
    Div136 = 136,
    Div192 = 192,
    Div250 = 250,
    Div256 = 256,
    Div272 = 272,
    Div375 = 375,
    Div384 = 384,
    Div500 = 500,
    Div512 = 512,
    Div544 = 544,
    Div576 = 576,
    Div750 = 750,
    Div768 = 768,
    Div1000 = 1000,
    Div1024 = 1024,
    Div1088 = 1088,
    Div1152 = 1152,
    Div1408 = 1408,
    Div1496 = 1496,
    Div1500 = 1500,
    Div1536 = 1536,
    Div2112 = 2112,
    Div2304 = 2304,
}

impl LclkDiv {
    pub const fn ratio(self) -> u16 {
        self as u16
    }
}

/// Microphone PGA gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicGain {
    Db0 = 0,
    Db3 = 3,
    Db6 = 6,
    Db9 = 9,
    Db12 = 12,
    Db15 = 15,
    Db18 = 18,
    Db21 = 21,
    /// Listed by the datasheet but rejected by the PGA.
    Db24 = 24,
}

/// Init-time settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub role: ClockRole,
    pub format: I2sFormat,
    pub bits: BitLength,
    pub mclk_div: MclkDiv,
    pub lclk_div: LclkDiv,
    /// Route LIN1/RIN1 to the ADC.
    pub adc_input: bool,
}

impl Default for CodecConfig {
    /// Slave, standard I2S, 16-bit, MCLK/LRCK = 48 to match the bus default.
    fn default() -> Self {
        CodecConfig {
            role: ClockRole::Slave,
            format: I2sFormat::Normal,
            bits: BitLength::Bits16,
            mclk_div: MclkDiv::Div3,
            lclk_div: LclkDiv::Div48,
            adc_input: true,
        }
    }
}

/// Errors beyond a plain bus failure.
#[derive(Debug, Error)]
pub enum CodecError<E: Debug> {
    #[error("i2c transfer failed: {0:?}")]
    I2c(E),
    #[error("codec is already initialized")]
    AlreadyInitialized,
    #[error("microphone gain {0:?} is not supported")]
    InvalidGain(MicGain),
}

// ── Driver struct ──────────────────────────────────────────────────────────

/// ES8374 audio codec driver.
pub struct Es8374<I2C> {
    i2c: I2C,
    address: u8,
    initialized: bool,
}

impl<I2C> Es8374<I2C>
where
    I2C: I2c,
{
    pub const DEFAULT_ADDRESS: u8 = reg::I2C_ADDR;

    pub fn new(i2c: I2C) -> Self {
        Self::new_with_address(i2c, Self::DEFAULT_ADDRESS)
    }

    pub fn new_with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ── Low-level I2C helpers ──────────────────────────────────────────

    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    pub fn read_register(&mut self, register: u8) -> Result<u8, I2C::Error> {
        let mut value = [0u8; 1];
        self.i2c.write_read(self.address, &[register], &mut value)?;
        Ok(value[0])
    }

    /// Read-modify-write: `new = (current & !mask) | value`.
    pub fn modify(&mut self, register: u8, value: u8, mask: u8) -> Result<u8, I2C::Error> {
        let current = self.read_register(register)?;
        let new_val = (current & !mask) | (value & mask);
        self.write_register(register, new_val)?;
        Ok(new_val)
    }

    fn set_bits(&mut self, register: u8, bits: u8) -> Result<u8, I2C::Error> {
        let value = self.read_register(register)? | bits;
        self.write_register(register, value)?;
        Ok(value)
    }

    fn clear_bits(&mut self, register: u8, bits: u8) -> Result<u8, I2C::Error> {
        let value = self.read_register(register)? & !bits;
        self.write_register(register, value)?;
        Ok(value)
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    /// Reset the chip and program clocks, format, routing and levels.
    ///
    /// Both paths are stopped first and the DAC is left at −96 dB; call
    /// [`start`](Self::start) and [`set_volume`](Self::set_volume) after.
    /// A second call without [`deinit`](Self::deinit) is refused.
    pub fn init(&mut self, config: &CodecConfig) -> Result<(), CodecError<I2C::Error>> {
        if self.initialized {
            warn!("es8374: already initialized");
            return Err(CodecError::AlreadyInitialized);
        }
        debug!("es8374: init {:?}", config);

        self.stop(Module::AdcDac).map_err(CodecError::I2c)?;
        self.init_registers(config).map_err(CodecError::I2c)?;
        self.initialized = true;
        Ok(())
    }

    fn init_registers(&mut self, config: &CodecConfig) -> Result<(), I2C::Error> {
        self.write_register(reg::RESET, 0x3F)?;
        self.write_register(reg::RESET, 0x03)?;
        self.write_register(reg::CLK_MANAGER, 0x7F)?;

        let role = (config.role as u8) << 7;
        self.modify(reg::CLK_MODE, role, reg::CLK_MODE_MASTER)?;

        // PLL
        self.write_register(reg::PLL_MODE_ENABLE, 0xA0)?;
        self.write_register(reg::PLL_MODE_SET, 0x41)?;
        self.write_register(reg::PLL_CTRL1, 0x01)?;
        self.write_register(reg::PLL_K2, 0x22)?;
        self.write_register(reg::PLL_K1, 0x2E)?;
        self.write_register(reg::PLL_K0, 0xC6)?;
        self.write_register(reg::PLL_CTRL2, 0x3A)?;
        self.write_register(reg::PLL_N, 0x07)?;
        self.write_register(reg::PLL_CTRL1, 0x41)?;

        self.config_clock(config.mclk_div, config.lclk_div)?;

        self.write_register(reg::ADC_CTRL, 0x08)?;
        self.write_register(reg::DAC_CTRL, 0x00)?;
        self.write_register(reg::SDP_TIMING1, 0x30)?;
        self.write_register(reg::SDP_TIMING2, 0x20)?;

        self.config_format(Module::Adc, config.format, config.bits)?;
        self.config_format(Module::Dac, config.format, config.bits)?;

        // LIN1, PGA 0 dB then +18 dB boost and +15 dB PGA
        self.write_register(reg::ADC_INPUT, 0x50)?;
        self.write_register(reg::MIC_PGA, 0xFF)?;
        self.write_register(reg::ADC_INPUT, 0x14)?;
        self.write_register(reg::MIC_PGA, 0x55)?;
        // Class-D divider 33 keeps its switching tone out of the speaker.
        self.write_register(reg::CLASS_D_DIV, 0x21)?;
        self.write_register(reg::RESET, 0x80)?;

        self.set_adc_dac_volume(Module::Adc, 0, 0)?;
        self.set_adc_dac_volume(Module::Dac, 0, 0)?;

        self.write_register(reg::ANALOG_REF, 0x8A)?;
        self.write_register(reg::ANALOG_POWER, 0x40)?;
        self.write_register(reg::MONO_OUT, 0xA0)?;
        self.write_register(reg::MONO_GAIN, 0x19)?;
        self.write_register(reg::SPK_MIXER, 0x90)?;
        self.write_register(reg::SPK_CTRL, 0x01)?;
        self.write_register(reg::SPK_GAIN, 0x00)?;
        self.write_register(reg::CLASS_D, reg::CLASS_D_OFF)?;
        self.write_register(reg::ALC_CTRL, 0x00)?;
        self.write_register(reg::ADC_VOLUME, 0x00)?;
        self.write_register(reg::DAC_VOLUME, 0x00)?;
        self.write_register(reg::DAC_RAMP, 0x30)?;
        self.write_register(reg::GPIO_SEL, 0x60)?;
        self.write_register(reg::AUTOMUTE, 0x05)?;
        self.write_register(reg::ANALOG_MISC, 0x70)?;

        self.config_dac_output()?;
        if config.adc_input {
            self.config_adc_input()?;
        }
        self.set_volume(0)?;

        self.write_register(reg::DAC_RAMP, 0x00)
    }

    /// Reset and stop the chip. [`init`](Self::init) may be called again.
    pub fn deinit(&mut self) -> Result<(), I2C::Error> {
        self.initialized = false;
        self.write_register(reg::RESET, 0x7F)
    }

    /// Power up the paths of `module` and unmute the DAC.
    pub fn start(&mut self, module: Module) -> Result<(), I2C::Error> {
        debug!("es8374: start {:?}", module);

        if module == Module::Line {
            let mono = self.read_register(reg::MONO_OUT)?;
            let mono = (mono | reg::MONO_MIXER_ON | reg::MONO_OUT_ON) & !reg::LINE_OUT_OFF;
            self.write_register(reg::MONO_OUT, mono)?;
            self.set_bits(reg::SPK_MIXER, reg::SPK_MIXER_ON)?;
            self.write_register(reg::SPK_CTRL, reg::SPK_ON)?;
            self.write_register(reg::SPK_GAIN, 0x00)?;
            self.write_register(reg::CLASS_D, reg::CLASS_D_ON)?;
        }

        if module.has_adc() || module == Module::Line {
            self.clear_bits(reg::ADC_INPUT, reg::ADC_INPUT_POWER_DOWN)?;
            self.clear_bits(reg::ADC_SDP, reg::SDP_POWER_DOWN)?;
        }

        if module.has_dac() || module == Module::Line {
            // Speaker muted and line-out off while the DAC powers up.
            let mono = self.set_bits(reg::MONO_OUT, reg::LINE_OUT_OFF)?;
            self.write_register(reg::MONO_OUT, mono & !reg::MONO_OUT_ON)?;
            self.write_register(reg::SPK_CTRL, reg::SPK_MUTED)?;
            self.write_register(reg::CLASS_D, reg::CLASS_D_OFF)?;
            self.clear_bits(reg::ANALOG_POWER, reg::ANALOG_POWER_DAC_DOWN)?;

            let mono = self.set_bits(reg::MONO_OUT, reg::MONO_OUT_ON)?;
            self.write_register(reg::MONO_OUT, mono & !reg::LINE_OUT_OFF)?;
            self.write_register(reg::SPK_CTRL, reg::SPK_ON)?;
            self.write_register(reg::CLASS_D, reg::CLASS_D_ON)?;

            self.set_mute(false)?;
        }

        Ok(())
    }

    /// Mute and power down the paths of `module`.
    pub fn stop(&mut self, module: Module) -> Result<(), I2C::Error> {
        debug!("es8374: stop {:?}", module);

        if module == Module::Line {
            let mono = self.set_bits(reg::MONO_OUT, reg::LINE_OUT_OFF)?;
            let mono = mono & !(reg::MONO_MIXER_ON | reg::MONO_OUT_ON);
            self.write_register(reg::MONO_OUT, mono)?;
            self.write_register(reg::SPK_CTRL, reg::SPK_MUTED)?;
            self.write_register(reg::CLASS_D, reg::CLASS_D_OFF)?;
            self.clear_bits(reg::SPK_MIXER, reg::SPK_MIXER_ON)?;
            self.write_register(reg::SPK_GAIN, 0x00)?;
        }

        if module.has_dac() {
            self.set_mute(true)?;

            let mono = self.set_bits(reg::MONO_OUT, reg::LINE_OUT_OFF)?;
            self.write_register(reg::MONO_OUT, mono & !reg::MONO_OUT_ON)?;
            self.write_register(reg::SPK_CTRL, reg::SPK_MUTED)?;
            self.write_register(reg::CLASS_D, reg::CLASS_D_OFF)?;
            self.set_bits(reg::ANALOG_POWER, reg::ANALOG_POWER_DAC_DOWN)?;
        }

        if module.has_adc() {
            self.set_bits(reg::ADC_SDP, reg::SDP_POWER_DOWN)?;
            self.set_bits(reg::ADC_INPUT, reg::ADC_INPUT_POWER_DOWN)?;
        }

        Ok(())
    }

    // ── Mute and volume ────────────────────────────────────────────────

    /// Soft-mute the DAC.
    pub fn set_mute(&mut self, mute: bool) -> Result<(), I2C::Error> {
        let value = if mute { reg::DAC_MUTE } else { 0 };
        self.modify(reg::DAC_CTRL, value, reg::DAC_MUTE)?;
        Ok(())
    }

    pub fn is_muted(&mut self) -> Result<bool, I2C::Error> {
        Ok(self.read_register(reg::DAC_CTRL)? & reg::DAC_MUTE != 0)
    }

    /// Set the DAC volume on a 0..=96 scale (one step = 1 dB).
    ///
    /// `0` is −96 dB; anything above 96 is full scale (0 dB).
    pub fn set_volume(&mut self, volume: u8) -> Result<(), I2C::Error> {
        let value = if volume > 96 { 0 } else { 192 - 2 * volume };
        self.write_register(reg::DAC_VOLUME, value)
    }

    /// Read back the DAC volume on the [`set_volume`](Self::set_volume) scale.
    pub fn volume(&mut self) -> Result<u8, I2C::Error> {
        let value = self.read_register(reg::DAC_VOLUME)?;
        Ok((192u8.saturating_sub(value)) / 2)
    }

    /// Set ADC and/or DAC digital attenuation.
    ///
    /// `db` is clamped to −96..=0; `tenths >= 5` adds a half-dB step.
    pub fn set_adc_dac_volume(
        &mut self,
        module: Module,
        db: i8,
        tenths: u8,
    ) -> Result<(), I2C::Error> {
        let db = if (-96..=0).contains(&db) {
            db
        } else {
            warn!("es8374: volume {} dB outside -96..=0, clamped", db);
            db.clamp(-96, 0)
        };
        let value = (db.unsigned_abs() << 1) + u8::from(tenths >= 5);

        if module.has_adc() {
            self.write_register(reg::ADC_VOLUME, value)?;
        }
        if module.has_dac() {
            self.write_register(reg::DAC_VOLUME, value)?;
        }
        Ok(())
    }

    // ── Serial port format ─────────────────────────────────────────────

    pub fn set_bits_per_sample(&mut self, module: Module, bits: BitLength) -> Result<(), I2C::Error> {
        let value = (bits as u8) << reg::SDP_WORD_LENGTH_SHIFT;
        if module.has_adc() {
            self.modify(reg::ADC_SDP, value, reg::SDP_WORD_LENGTH_MASK)?;
        }
        if module.has_dac() {
            self.modify(reg::DAC_SDP, value, reg::SDP_WORD_LENGTH_MASK)?;
        }
        Ok(())
    }

    /// Set the serial format and word length of the `module` ports.
    pub fn config_format(
        &mut self,
        module: Module,
        format: I2sFormat,
        bits: BitLength,
    ) -> Result<(), I2C::Error> {
        if module.has_adc() {
            self.modify(reg::ADC_SDP, format as u8, reg::SDP_FORMAT_MASK)?;
        }
        if module.has_dac() {
            self.modify(reg::DAC_SDP, format as u8, reg::SDP_FORMAT_MASK)?;
        }
        self.set_bits_per_sample(module, bits)
    }

    /// Program the BCLK divider and the MCLK/LRCK ratio.
    pub fn config_clock(&mut self, mclk_div: MclkDiv, lclk_div: LclkDiv) -> Result<(), I2C::Error> {
        self.modify(reg::CLK_MODE, mclk_div.code(), reg::CLK_MODE_DIV_MASK)?;

        let [hi, lo] = lclk_div.ratio().to_be_bytes();
        self.write_register(reg::LRCK_DIV_HI, hi)?;
        self.write_register(reg::LRCK_DIV_LO, lo)
    }

    // ── Routing ────────────────────────────────────────────────────────

    /// Route the DAC to the speaker mixer and enable the speaker driver.
    pub fn config_dac_output(&mut self) -> Result<(), I2C::Error> {
        self.write_register(reg::SPK_CTRL, reg::SPK_ON)?;
        self.set_bits(reg::SPK_MIXER, reg::SPK_MIXER_DAC)?;
        self.write_register(reg::SPK_CTRL, reg::SPK_ON)?;
        self.write_register(reg::SPK_GAIN, 0x00)?;
        self.write_register(reg::CLASS_D, reg::CLASS_D_ON)
    }

    /// Select LIN1/RIN1 as the ADC input with the +18 dB boost.
    pub fn config_adc_input(&mut self) -> Result<(), I2C::Error> {
        let value = self.read_register(reg::ADC_INPUT)?;
        let value = (value & !reg::ADC_INPUT_SELECT_MASK) | reg::ADC_INPUT_LIN1;
        self.write_register(reg::ADC_INPUT, value)
    }

    /// Set both microphone PGA channels.
    pub fn set_mic_gain(&mut self, gain: MicGain) -> Result<(), CodecError<I2C::Error>> {
        if gain == MicGain::Db24 {
            warn!("es8374: invalid microphone gain {:?}", gain);
            return Err(CodecError::InvalidGain(gain));
        }
        let step = gain as u8 / 3;
        self.write_register(reg::MIC_PGA, step | (step << 4))
            .map_err(CodecError::I2c)
    }

    /// Release the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

// ── AudioControl trait implementation ──────────────────────────────────────

impl<I2C> AudioControl for Es8374<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn enable(&mut self) -> Result<(), Self::Error> {
        self.start(Module::AdcDac)
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.stop(Module::AdcDac)
    }

    fn volume(&mut self, level: f32) -> Result<(), Self::Error> {
        let steps = libm::roundf(level.clamp(0.0, 1.0) * 96.0) as u8;
        self.set_volume(steps)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{self, ErrorType, I2c, Operation};

    // ── Mock I2C with register file ───────────────────────────────────

    #[derive(Debug)]
    struct MockError;

    impl i2c::Error for MockError {
        fn kind(&self) -> i2c::ErrorKind {
            i2c::ErrorKind::Other
        }
    }

    /// Mock I2C that maintains a register file and records writes.
    struct MockI2c {
        regs: [u8; 256],
        /// Write log in chronological order.
        log: [(u8, u8); 256],
        log_count: usize,
        fail: bool,
    }

    impl MockI2c {
        fn new() -> Self {
            Self {
                regs: [0; 256],
                log: [(0, 0); 256],
                log_count: 0,
                fail: false,
            }
        }

        fn read_reg(&self, addr: u8) -> u8 {
            self.regs[addr as usize]
        }

        fn writes(&self) -> &[(u8, u8)] {
            &self.log[..self.log_count]
        }
    }

    impl ErrorType for MockI2c {
        type Error = MockError;
    }

    impl I2c for MockI2c {
        fn read(&mut self, _addr: u8, _buf: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn write(&mut self, _addr: u8, bytes: &[u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(MockError);
            }
            if bytes.len() == 2 {
                self.regs[bytes[0] as usize] = bytes[1];
                self.log[self.log_count] = (bytes[0], bytes[1]);
                self.log_count += 1;
            }
            Ok(())
        }

        fn write_read(
            &mut self,
            _addr: u8,
            wr: &[u8],
            rd: &mut [u8],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(MockError);
            }
            if wr.len() == 1 && rd.len() == 1 {
                rd[0] = self.read_reg(wr[0]);
            }
            Ok(())
        }

        fn transaction(
            &mut self,
            _addr: u8,
            _ops: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────

    fn make_codec() -> Es8374<MockI2c> {
        Es8374::new(MockI2c::new())
    }

    fn initialized_codec() -> Es8374<MockI2c> {
        let mut c = make_codec();
        c.init(&CodecConfig::default()).unwrap();
        c
    }

    // ── Init tests ────────────────────────────────────────────────────

    #[test]
    fn init_resets_then_starts_chip() {
        let codec = initialized_codec();
        assert!(codec.is_initialized());
        let i2c = codec.release();
        let writes = i2c.writes();

        // Stopping both paths comes first: DAC mute.
        assert_eq!(writes[0], (reg::DAC_CTRL, reg::DAC_MUTE));

        let reset = writes
            .iter()
            .position(|&w| w == (reg::RESET, 0x3F))
            .unwrap();
        assert_eq!(writes[reset + 1], (reg::RESET, 0x03));
        assert_eq!(writes[reset + 2], (reg::CLK_MANAGER, 0x7F));
        assert!(writes[reset..].contains(&(reg::RESET, 0x80)));

        assert_eq!(*writes.last().unwrap(), (reg::DAC_RAMP, 0x00));
    }

    #[test]
    fn init_programs_default_config() {
        let i2c = initialized_codec().release();

        assert_eq!(i2c.read_reg(reg::RESET), 0x80);
        // Slave, BCLK divider code 3.
        assert_eq!(i2c.read_reg(reg::CLK_MODE), 0x03);
        assert_eq!(i2c.read_reg(reg::LRCK_DIV_HI), 0x00);
        assert_eq!(i2c.read_reg(reg::LRCK_DIV_LO), 48);
        // Powered down by the initial stop, 16-bit, I2S.
        assert_eq!(i2c.read_reg(reg::ADC_SDP), 0xCC);
        assert_eq!(i2c.read_reg(reg::DAC_SDP), 0x0C);
        assert_eq!(i2c.read_reg(reg::ADC_INPUT), 0x14);
        assert_eq!(i2c.read_reg(reg::MIC_PGA), 0x55);
        assert_eq!(i2c.read_reg(reg::SPK_MIXER), 0x90);
        assert_eq!(i2c.read_reg(reg::CLASS_D), reg::CLASS_D_ON);
        // Left at −96 dB.
        assert_eq!(i2c.read_reg(reg::DAC_VOLUME), 0xC0);
    }

    #[test]
    fn init_as_master_sets_role_bit() {
        let mut codec = make_codec();
        let config = CodecConfig {
            role: ClockRole::Master,
            ..CodecConfig::default()
        };
        codec.init(&config).unwrap();

        let i2c = codec.release();
        assert_eq!(i2c.read_reg(reg::CLK_MODE), 0x83);
    }

    #[test]
    fn second_init_is_refused_until_deinit() {
        let mut codec = initialized_codec();
        assert!(matches!(
            codec.init(&CodecConfig::default()),
            Err(CodecError::AlreadyInitialized)
        ));

        codec.deinit().unwrap();
        assert!(!codec.is_initialized());
        assert_eq!(codec.read_register(reg::RESET).unwrap(), 0x7F);

        codec.init(&CodecConfig::default()).unwrap();
        assert!(codec.is_initialized());
    }

    #[test]
    fn bus_failure_leaves_codec_uninitialized() {
        let mut i2c = MockI2c::new();
        i2c.fail = true;
        let mut codec = Es8374::new(i2c);

        assert!(matches!(
            codec.init(&CodecConfig::default()),
            Err(CodecError::I2c(MockError))
        ));
        assert!(!codec.is_initialized());
    }

    // ── Start / stop tests ────────────────────────────────────────────

    #[test]
    fn start_powers_up_and_unmutes() {
        let mut codec = initialized_codec();
        codec.start(Module::AdcDac).unwrap();

        assert!(!codec.is_muted().unwrap());
        let i2c = codec.release();
        assert_eq!(i2c.read_reg(reg::ADC_SDP), 0x0C);
        assert_eq!(i2c.read_reg(reg::ADC_INPUT), 0x14);
        assert_eq!(i2c.read_reg(reg::MONO_OUT), 0xA0);
        assert_eq!(i2c.read_reg(reg::ANALOG_POWER), 0x40);
        assert_eq!(i2c.read_reg(reg::SPK_CTRL), reg::SPK_ON);
    }

    #[test]
    fn stop_mutes_and_powers_down() {
        let mut codec = initialized_codec();
        codec.start(Module::AdcDac).unwrap();
        codec.stop(Module::AdcDac).unwrap();

        assert!(codec.is_muted().unwrap());
        let i2c = codec.release();
        assert_eq!(i2c.read_reg(reg::MONO_OUT), 0x88);
        assert_eq!(i2c.read_reg(reg::ANALOG_POWER), 0x60);
        assert_eq!(i2c.read_reg(reg::ADC_SDP), 0xCC);
        assert_eq!(i2c.read_reg(reg::ADC_INPUT), 0xD4);
        assert_eq!(i2c.read_reg(reg::CLASS_D), reg::CLASS_D_OFF);
    }

    #[test]
    fn adc_only_leaves_dac_alone() {
        let mut codec = initialized_codec();
        let before = codec.i2c.log_count;
        codec.start(Module::Adc).unwrap();

        let i2c = codec.release();
        assert_eq!(i2c.read_reg(reg::ADC_SDP), 0x0C);
        assert!(i2c.writes()[before..]
            .iter()
            .all(|&(r, _)| r == reg::ADC_INPUT || r == reg::ADC_SDP));
    }

    #[test]
    fn line_start_and_stop_toggle_speaker_mixer() {
        let mut codec = initialized_codec();
        codec.start(Module::Line).unwrap();
        assert_eq!(
            codec.read_register(reg::SPK_MIXER).unwrap() & reg::SPK_MIXER_ON,
            reg::SPK_MIXER_ON
        );

        codec.stop(Module::Line).unwrap();
        let mono = codec.read_register(reg::MONO_OUT).unwrap();
        assert_eq!(mono & (reg::MONO_MIXER_ON | reg::MONO_OUT_ON), 0);
        assert_eq!(codec.read_register(reg::SPK_MIXER).unwrap() & reg::SPK_MIXER_ON, 0);
    }

    // ── Mute and volume tests ─────────────────────────────────────────

    #[test]
    fn mute_preserves_other_bits() {
        let mut codec = make_codec();
        codec.write_register(reg::DAC_CTRL, 0x81).unwrap();

        codec.set_mute(true).unwrap();
        assert_eq!(codec.read_register(reg::DAC_CTRL).unwrap(), 0xA1);
        assert!(codec.is_muted().unwrap());

        codec.set_mute(false).unwrap();
        assert_eq!(codec.read_register(reg::DAC_CTRL).unwrap(), 0x81);
        assert!(!codec.is_muted().unwrap());
    }

    #[test]
    fn volume_scale() {
        let mut codec = make_codec();

        codec.set_volume(50).unwrap();
        assert_eq!(codec.read_register(reg::DAC_VOLUME).unwrap(), 92);
        assert_eq!(codec.volume().unwrap(), 50);

        codec.set_volume(0).unwrap();
        assert_eq!(codec.read_register(reg::DAC_VOLUME).unwrap(), 192);
        assert_eq!(codec.volume().unwrap(), 0);

        codec.set_volume(100).unwrap();
        assert_eq!(codec.read_register(reg::DAC_VOLUME).unwrap(), 0);
        assert_eq!(codec.volume().unwrap(), 96);
    }

    #[test]
    fn adc_dac_volume_half_steps_and_clamp() {
        let mut codec = make_codec();

        codec.set_adc_dac_volume(Module::Dac, -10, 5).unwrap();
        assert_eq!(codec.read_register(reg::DAC_VOLUME).unwrap(), 21);
        assert_eq!(codec.read_register(reg::ADC_VOLUME).unwrap(), 0);

        codec.set_adc_dac_volume(Module::AdcDac, -120, 0).unwrap();
        assert_eq!(codec.read_register(reg::DAC_VOLUME).unwrap(), 192);
        assert_eq!(codec.read_register(reg::ADC_VOLUME).unwrap(), 192);

        codec.set_adc_dac_volume(Module::Adc, 6, 9).unwrap();
        assert_eq!(codec.read_register(reg::ADC_VOLUME).unwrap(), 1);
    }

    // ── Format and clock tests ────────────────────────────────────────

    #[test]
    fn format_and_word_length_share_register() {
        let mut codec = make_codec();
        codec.write_register(reg::DAC_SDP, 0xC0).unwrap();

        codec
            .config_format(Module::Dac, I2sFormat::Dsp, BitLength::Bits24)
            .unwrap();
        assert_eq!(codec.read_register(reg::DAC_SDP).unwrap(), 0xC3);

        codec.set_bits_per_sample(Module::Dac, BitLength::Bits32).unwrap();
        assert_eq!(codec.read_register(reg::DAC_SDP).unwrap(), 0xD3);
        assert_eq!(codec.read_register(reg::ADC_SDP).unwrap(), 0x00);
    }

    #[test]
    fn clock_dividers() {
        let mut codec = make_codec();
        codec.write_register(reg::CLK_MODE, 0x80).unwrap();

        codec.config_clock(MclkDiv::Div72, LclkDiv::Div1500).unwrap();

        assert_eq!(codec.read_register(reg::CLK_MODE).unwrap(), 0x9F);
        assert_eq!(codec.read_register(reg::LRCK_DIV_HI).unwrap(), 0x05);
        assert_eq!(codec.read_register(reg::LRCK_DIV_LO).unwrap(), 0xDC);
    }

    #[test]
    fn divider_codes_skip_missing_ratios() {
        assert_eq!(MclkDiv::Div18.code(), 18);
        assert_eq!(MclkDiv::Div20.code(), 19);
        assert_eq!(MclkDiv::Div72.code(), 31);
        assert_eq!(LclkDiv::Div2304.ratio(), 2304);
    }

    // ── Routing tests ─────────────────────────────────────────────────

    #[test]
    fn adc_input_keeps_power_bits() {
        let mut codec = make_codec();
        codec.write_register(reg::ADC_INPUT, 0xF0).unwrap();

        codec.config_adc_input().unwrap();
        assert_eq!(codec.read_register(reg::ADC_INPUT).unwrap(), 0xD4);
    }

    #[test]
    fn mic_gain_writes_both_channels() {
        let mut codec = make_codec();

        codec.set_mic_gain(MicGain::Db15).unwrap();
        assert_eq!(codec.read_register(reg::MIC_PGA).unwrap(), 0x55);

        codec.set_mic_gain(MicGain::Db21).unwrap();
        assert_eq!(codec.read_register(reg::MIC_PGA).unwrap(), 0x77);
    }

    #[test]
    fn mic_gain_24db_rejected() {
        let mut codec = make_codec();
        assert!(matches!(
            codec.set_mic_gain(MicGain::Db24),
            Err(CodecError::InvalidGain(MicGain::Db24))
        ));
        assert_eq!(codec.release().log_count, 0);
    }

    // ── AudioControl trait test ───────────────────────────────────────

    #[test]
    fn audio_control_trait_delegation() {
        let mut codec = initialized_codec();

        AudioControl::enable(&mut codec).unwrap();
        assert!(!codec.is_muted().unwrap());

        AudioControl::volume(&mut codec, 0.5).unwrap();
        assert_eq!(codec.volume().unwrap(), 48);

        AudioControl::volume(&mut codec, 2.0).unwrap();
        assert_eq!(codec.read_register(reg::DAC_VOLUME).unwrap(), 0);

        AudioControl::disable(&mut codec).unwrap();
        assert!(codec.is_muted().unwrap());
    }

    #[test]
    fn custom_address() {
        let codec = Es8374::new_with_address(MockI2c::new(), 0x11);
        assert_eq!(codec.address, 0x11);
        assert_eq!(Es8374::<MockI2c>::DEFAULT_ADDRESS, 0x10);
    }
}
