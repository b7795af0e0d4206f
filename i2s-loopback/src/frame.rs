//! Stereo frame packing.
//!
//! Each `u32` word in a transfer buffer carries one stereo frame:
//! - Lower 16 bits (bits 0–15): left channel sample
//! - Upper 16 bits (bits 16–31): right channel sample
//!
//! On a little-endian core this is `[left, right]` as consecutive `u16`
//! values in memory, which is the layout the I2S peripheral moves on the wire.

/// One left/right pair of raw 16-bit samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    pub left: u16,
    pub right: u16,
}

impl Frame {
    /// The frame the bus emits before real data reaches the output.
    pub const SILENT: Frame = Frame { left: 0, right: 0 };

    pub const fn new(left: u16, right: u16) -> Self {
        Frame { left, right }
    }

    /// Test-pattern frame for sequence counter `value`: `(value - 1, value + 1)`.
    ///
    /// Both channels wrap at the 16-bit boundary.
    pub const fn from_counter(value: u16) -> Self {
        Frame {
            left: value.wrapping_sub(1),
            right: value.wrapping_add(1),
        }
    }

    /// Pack into a bus word: `(right << 16) | left`.
    pub const fn pack(self) -> u32 {
        (self.left as u32) | ((self.right as u32) << 16)
    }

    /// Unpack a bus word produced by [`pack`](Self::pack).
    pub const fn unpack(word: u32) -> Self {
        Frame {
            left: word as u16,
            right: (word >> 16) as u16,
        }
    }

    pub const fn is_silent(self) -> bool {
        self.left == 0 && self.right == 0
    }
}

impl From<u32> for Frame {
    fn from(word: u32) -> Self {
        Frame::unpack(word)
    }
}

impl From<Frame> for u32 {
    fn from(frame: Frame) -> Self {
        frame.pack()
    }
}
