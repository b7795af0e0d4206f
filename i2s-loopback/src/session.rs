//! Running state of one self-test session.

use crate::frame::Frame;

/// Sticky verification outcome.
///
/// Moves from `Running` to `Failed` at most once per session and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Running,
    Failed,
}

/// The first sequence mismatch observed in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Value of the blocks-transferred counter when the bad block was checked.
    pub block: u32,
    /// Frame index inside the block.
    pub index: usize,
    pub actual: Frame,
    pub expected: Frame,
}

/// Counters and flags for one run of the loopback test.
///
/// Owned by the stream controller and lent to the pattern generator and the
/// sequence verifier. A zeroed session (the `Default`) is the "not yet
/// seeded" state; the first [`fill`](crate::pattern::fill) seeds it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub(crate) blocks_transferred: u32,
    pub(crate) zero_frames_to_ignore: u8,
    pub(crate) value_to_send: u16,
    pub(crate) value_expected: u16,
    pub(crate) status: Status,
    pub(crate) first_mismatch: Option<Mismatch>,
}

impl Session {
    pub const fn new() -> Self {
        Session {
            blocks_transferred: 0,
            zero_frames_to_ignore: 0,
            value_to_send: 0,
            value_expected: 0,
            status: Status::Running,
            first_mismatch: None,
        }
    }

    /// Return to the unseeded state.
    pub fn reset(&mut self) {
        *self = Session::new();
    }

    /// Whether no block has been generated or checked yet.
    pub fn is_unseeded(&self) -> bool {
        self.blocks_transferred == 0 && self.zero_frames_to_ignore == 0
    }

    pub fn blocks_transferred(&self) -> u32 {
        self.blocks_transferred
    }

    pub fn zero_frames_to_ignore(&self) -> u8 {
        self.zero_frames_to_ignore
    }

    /// Counter of the next frame the generator will write.
    pub fn value_to_send(&self) -> u16 {
        self.value_to_send
    }

    /// Counter of the next frame the verifier expects.
    pub fn value_expected(&self) -> u16 {
        self.value_expected
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn has_failed(&self) -> bool {
        self.status == Status::Failed
    }

    pub fn first_mismatch(&self) -> Option<Mismatch> {
        self.first_mismatch
    }

    /// Latch the failed state. Later calls keep the first mismatch.
    pub(crate) fn mark_failed(&mut self, mismatch: Option<Mismatch>) {
        self.status = Status::Failed;
        if self.first_mismatch.is_none() {
            self.first_mismatch = mismatch;
        }
    }
}
