//! Errors produced by the DATA cutter.

use crate::splitter::Status;

/// Reasons a DATA frame could not be transcoded.
///
/// Only [`CutterError::MalformedPadding`] is attacker-controlled and carries
/// a diagnostic. The consistency variants point at frame-length accounting
/// bugs upstream; they stop translation for the flow instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CutterError {
    /// Declared padding leaves no room for the padding-length byte itself.
    #[error("invalid padding length {padding_len} for {data_len} byte DATA payload")]
    MalformedPadding { data_len: u32, padding_len: u8 },

    /// Frame carries no actual data, only padding (or nothing at all).
    #[error("DATA frame without payload bytes is not supported")]
    PaddingOnly,

    #[error("frame type {0:#x} is not DATA")]
    NotDataFrame(u8),

    #[error("DATA frame too large ({length} bytes, max {max})")]
    FrameTooLarge { length: u32, max: u32 },

    #[error("invalid max frame size {0}")]
    InvalidMaxFrameSize(u32),

    /// Downstream inspector answered with an unexpected status.
    #[error("downstream inspector returned {actual:?}, expected {expected:?}")]
    UnexpectedStatus { expected: Status, actual: Status },

    /// Downstream inspector did not take every byte handed to reassembly.
    #[error("downstream inspector copied {copied} of {expected} bytes")]
    ShortCopy { expected: usize, copied: usize },

    #[error("downstream inspector returned no buffer at end of message")]
    MissingBuffer,

    #[error("frame ended before reassembly completed")]
    IncompleteFrame,

    /// Frame ended before the flushed length said it would.
    #[error("frame ended at {end}, flushed length is {total}")]
    FrameLengthMismatch { total: u32, end: u64 },

    #[error("{0} bytes left over after end of frame")]
    TrailingBytes(usize),

    #[error("frame already reassembled")]
    AlreadyComplete,
}
