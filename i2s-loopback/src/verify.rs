//! Receive-side sequence check.
//!
//! Every received frame must equal [`Frame::from_counter`] of the session's
//! expected counter, which advances by one per compared frame. The only
//! exception is the startup transient: while the session still tolerates
//! zero frames, an all-zero frame is skipped without advancing the counter.
//! The first frame that is not skipped ends the tolerance for the session.

use log::{info, warn};

use crate::frame::Frame;
use crate::session::{Mismatch, Session};

/// Check one received block, reporting the first bad frame.
///
/// Stops at the first mismatch; frames after it are left unchecked and the
/// expected counter is left one past the failing frame.
pub fn check_block(block: &[u32], session: &mut Session) -> Result<(), Mismatch> {
    for (index, &word) in block.iter().enumerate() {
        let actual = Frame::unpack(word);

        if session.zero_frames_to_ignore > 0 && actual.is_silent() {
            session.zero_frames_to_ignore -= 1;
            continue;
        }
        session.zero_frames_to_ignore = 0;

        let expected = Frame::from_counter(session.value_expected);
        session.value_expected = session.value_expected.wrapping_add(1);

        if actual != expected {
            warn!(
                "{:3}: {:04x}/{:04x}, expected: {:04x}/{:04x} (i: {})",
                session.blocks_transferred,
                actual.left,
                actual.right,
                expected.left,
                expected.right,
                index
            );
            return Err(Mismatch {
                block: session.blocks_transferred,
                index,
                actual,
                expected,
            });
        }
    }

    info!("{:3}: OK", session.blocks_transferred);
    Ok(())
}

/// `true` if every frame of `block` past the startup transient matched.
pub fn check(block: &[u32], session: &mut Session) -> bool {
    check_block(block, session).is_ok()
}
