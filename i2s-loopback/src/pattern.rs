//! Deterministic transmit pattern.
//!
//! Frame `i` of the stream carries `(v - 1, v + 1)` where `v` is the session's
//! transmit counter, which starts at [`SEQUENCE_SEED`] and advances by one
//! per frame. The bracketing values make swapped channels and stuck bits
//! show up as mismatches.

use crate::constants::{SEQUENCE_SEED, STARTUP_ZERO_FRAMES};
use crate::frame::Frame;
use crate::session::Session;

/// Write the next `block.len()` frames of the sequence into `block`.
///
/// The first call on an unseeded session (nothing generated or checked yet)
/// seeds both counters, arms the startup zero-frame tolerance and clears the
/// failed flag. That happens once per session, not once per buffer.
pub fn fill(block: &mut [u32], session: &mut Session) {
    if session.is_unseeded() {
        seed(session);
    }

    for word in block.iter_mut() {
        *word = Frame::from_counter(session.value_to_send).pack();
        session.value_to_send = session.value_to_send.wrapping_add(1);
    }
}

fn seed(session: &mut Session) {
    session.zero_frames_to_ignore = STARTUP_ZERO_FRAMES;
    session.value_to_send = SEQUENCE_SEED;
    session.value_expected = SEQUENCE_SEED;
    session.status = Default::default();
    session.first_mismatch = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frames_follow_seed() {
        let mut session = Session::new();
        let mut block = [0u32; 4];
        fill(&mut block, &mut session);

        assert_eq!(Frame::unpack(block[0]), Frame::new(0xCAFD, 0xCAFF));
        assert_eq!(Frame::unpack(block[1]), Frame::new(0xCAFE, 0xCB00));
        assert_eq!(Frame::unpack(block[3]), Frame::new(0xCB00, 0xCB02));
    }

    #[test]
    fn first_fill_seeds_session() {
        let mut session = Session::new();
        let mut block = [0u32; 8];
        fill(&mut block, &mut session);

        assert_eq!(session.zero_frames_to_ignore(), STARTUP_ZERO_FRAMES);
        assert_eq!(session.value_expected(), SEQUENCE_SEED);
        assert_eq!(session.value_to_send(), SEQUENCE_SEED + 8);
    }

    #[test]
    fn later_fills_continue_sequence() {
        let mut session = Session::new();
        let mut first = [0u32; 8];
        let mut second = [0u32; 8];
        fill(&mut first, &mut session);
        fill(&mut second, &mut session);

        // Tolerance is still armed, so the second call must not re-seed.
        assert_eq!(Frame::unpack(second[0]), Frame::from_counter(SEQUENCE_SEED + 8));
        assert_eq!(session.value_to_send(), SEQUENCE_SEED + 16);
    }

    #[test]
    fn no_reseed_once_blocks_counted() {
        let mut session = Session::new();
        let mut block = [0u32; 2];
        fill(&mut block, &mut session);
        session.zero_frames_to_ignore = 0;
        session.blocks_transferred = 1;
        session.value_to_send = 0x0100;

        fill(&mut block, &mut session);
        assert_eq!(Frame::unpack(block[0]), Frame::from_counter(0x0100));
    }

    #[test]
    fn counter_wraps_at_16_bits() {
        let mut session = Session::new();
        let mut block = [0u32; 1];
        fill(&mut block, &mut session);
        session.value_to_send = 0xFFFF;

        let mut block = [0u32; 2];
        fill(&mut block, &mut session);
        assert_eq!(Frame::unpack(block[0]), Frame::new(0xFFFE, 0x0000));
        assert_eq!(Frame::unpack(block[1]), Frame::new(0xFFFF, 0x0001));
        assert_eq!(session.value_to_send(), 1);
    }

    #[test]
    fn seeding_clears_failed_flag() {
        let mut session = Session::new();
        session.mark_failed(None);
        let mut block = [0u32; 1];
        fill(&mut block, &mut session);
        assert!(!session.has_failed());
        assert_eq!(session.first_mismatch(), None);
    }
}
