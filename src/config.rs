//! Cutter limits.

use crate::error::CutterError;

/// Initial SETTINGS_MAX_FRAME_SIZE value (RFC 7540 Section 6.5.2).
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 16_384;

/// Largest value SETTINGS_MAX_FRAME_SIZE may advertise (2^24 - 1).
pub const MAX_ALLOWED_FRAME_SIZE: u32 = 16_777_215;

/// Limits applied when a DATA frame header is handed to the cutter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutterConfig {
    /// Largest DATA payload accepted, normally the peer's SETTINGS_MAX_FRAME_SIZE.
    pub max_frame_size: u32,
}

impl Default for CutterConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl CutterConfig {
    pub fn with_max_frame_size(max_frame_size: u32) -> Result<Self, CutterError> {
        let config = Self { max_frame_size };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CutterError> {
        if (DEFAULT_MAX_FRAME_SIZE..=MAX_ALLOWED_FRAME_SIZE).contains(&self.max_frame_size) {
            Ok(())
        } else {
            Err(CutterError::InvalidMaxFrameSize(self.max_frame_size))
        }
    }
}
