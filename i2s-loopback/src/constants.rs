/// Number of stereo frames (one `u32` word each) per transfer block.
pub const BLOCK_FRAMES: usize = 512;

/// Number of received blocks after which a self-test session stops.
pub const BLOCKS_TO_TRANSFER: u32 = 20;

/// Sequence counter value of the first transmitted frame in a session.
pub const SEQUENCE_SEED: u16 = 0xCAFE;

/// Leading all-zero frames tolerated at stream start.
///
/// The bus starts clocking before the first transmit buffer is fetched, so
/// the receiver sees a couple of empty frames before real data.
pub const STARTUP_ZERO_FRAMES: u8 = 2;

/// Pause between consecutive self-test runs, in milliseconds.
///
/// For the board's outer loop; a session never waits on its own.
pub const PAUSE_MS: u32 = 500;
