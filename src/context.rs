//! Per-frame byte accounting for one DATA frame in one direction.
//!
//! The scanner here only classifies bytes: it walks the frame header, the
//! optional padding-length byte, the payload and the padding across any
//! number of calls and reports which part of each call's input is payload.
//! Nothing is forwarded from here, see [`crate::cutter`] for that.

use tracing::trace;

use crate::error::CutterError;
use crate::flow::SourceId;
use crate::frame::FRAME_HEADER_LENGTH;

/// Scan-side position inside the frame payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    PaddingLength,
    Data,
    Padding,
    FullFrame,
}

/// Whether the synthetic chunk header went downstream yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapState {
    NoneSent,
    HeaderSent,
}

/// Reassembly-side position inside the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassembleState {
    SkipFrameHdr,
    SkipPaddingLen,
    SendChunkHdr,
    SendData,
    SkipPadding,
    SendCrlf,
    /// Terminator delivered and buffer handed to the flow.
    Done,
}

/// How one scan call's input splits up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    /// Input bytes accounted for in this call, header and padding included.
    pub flush_offset: u32,
    /// Start of the payload bytes within the input.
    pub data_offset: usize,
    /// Payload bytes found in this call.
    pub data: u32,
    /// Padding bytes found in this call.
    pub padding: u32,
    /// The frame was completed by this call.
    pub frame_complete: bool,
}

impl Classified {
    /// Payload subrange of `input`.
    pub fn payload<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.data_offset..self.data_offset + self.data as usize]
    }
}

/// Counters and state tags for one DATA frame.
///
/// Scan and reassembly are two independent passes over the same bytes.
/// The read counters are shared: [`FrameContext::reset_read_counters`]
/// rewinds them when reassembly starts again at offset zero.
#[derive(Debug, Clone)]
pub struct FrameContext {
    source_id: SourceId,
    frame_length: u32,
    data_len: u32,
    padding_len: u8,
    padded: bool,
    pub(crate) frame_bytes_seen: u32,
    pub(crate) data_bytes_read: u32,
    pub(crate) padding_read: u32,
    pub(crate) hdr_bytes_read: u32,
    pub(crate) bytes_sent_downstream: u32,
    pub(crate) bytes_reassembled: u32,
    pub(crate) scan_state: ScanState,
    pub(crate) wrap_state: WrapState,
    pub(crate) reassemble_state: ReassembleState,
}

impl FrameContext {
    /// `payload_len` is the length field of the frame header. HTTP/2 caps it
    /// at 24 bits; anything near `u32::MAX` saturates the frame length.
    pub fn new(source_id: SourceId, payload_len: u32, is_padded: bool) -> Self {
        Self {
            source_id,
            frame_length: payload_len.saturating_add(FRAME_HEADER_LENGTH),
            data_len: payload_len,
            padding_len: 0,
            padded: is_padded,
            frame_bytes_seen: 0,
            data_bytes_read: 0,
            padding_read: 0,
            hdr_bytes_read: 0,
            bytes_sent_downstream: 0,
            bytes_reassembled: 0,
            scan_state: if is_padded { ScanState::PaddingLength } else { ScanState::Data },
            wrap_state: WrapState::NoneSent,
            reassemble_state: ReassembleState::SkipFrameHdr,
        }
    }

    pub fn source_id(&self) -> SourceId {
        self.source_id
    }

    /// Declared frame size, header included.
    pub fn frame_length(&self) -> u32 {
        self.frame_length
    }

    /// Payload length. Only final once the padding-length byte was read.
    pub fn data_len(&self) -> u32 {
        self.data_len
    }

    pub fn padding_len(&self) -> u8 {
        self.padding_len
    }

    /// PADDED flag was set, so a padding-length byte precedes the payload.
    pub fn is_padded(&self) -> bool {
        self.padded
    }

    pub fn frame_bytes_seen(&self) -> u32 {
        self.frame_bytes_seen
    }

    pub fn data_bytes_read(&self) -> u32 {
        self.data_bytes_read
    }

    pub fn padding_read(&self) -> u32 {
        self.padding_read
    }

    pub fn bytes_sent_downstream(&self) -> u32 {
        self.bytes_sent_downstream
    }

    pub fn remaining_frame_octets(&self) -> u32 {
        self.frame_length.saturating_sub(self.frame_bytes_seen)
    }

    pub fn scan_state(&self) -> ScanState {
        self.scan_state
    }

    pub fn wrap_state(&self) -> WrapState {
        self.wrap_state
    }

    pub fn reassemble_state(&self) -> ReassembleState {
        self.reassemble_state
    }

    /// Rewind the per-frame read counters for a new reassembly pass.
    pub fn reset_read_counters(&mut self) {
        self.hdr_bytes_read = 0;
        self.data_bytes_read = 0;
        self.padding_read = 0;
        self.bytes_reassembled = 0;
    }

    /// Classify the next segment of the frame.
    ///
    /// Never looks past `input` and resumes exactly where the previous call
    /// stopped. Several states may be passed in one call.
    pub fn classify(&mut self, input: &[u8]) -> Result<Classified, CutterError> {
        // An unpadded empty frame has no data to wrap, same as padding-only
        if self.scan_state == ScanState::Data && self.data_len == 0 {
            return Err(CutterError::PaddingOnly);
        }

        let mut out = Classified::default();
        let mut pos = 0usize;

        if self.frame_bytes_seen < FRAME_HEADER_LENGTH {
            let hdr = (FRAME_HEADER_LENGTH - self.frame_bytes_seen).min(input.len() as u32);
            self.frame_bytes_seen += hdr;
            pos += hdr as usize;
        }

        while pos < input.len() && self.scan_state != ScanState::FullFrame {
            let rest = &input[pos..];
            let consumed = match self.scan_state {
                ScanState::PaddingLength => self.scan_padding_length(rest[0])?,
                ScanState::Data => {
                    out.data_offset = pos;
                    let data = self.scan_data(rest.len());
                    out.data += data;
                    data
                }
                ScanState::Padding => {
                    let padding = self.scan_padding(rest.len());
                    out.padding += padding;
                    padding
                }
                ScanState::FullFrame => 0,
            };
            pos += consumed as usize;
            self.frame_bytes_seen += consumed;
        }

        out.flush_offset = pos as u32;
        out.frame_complete = self.scan_state == ScanState::FullFrame && out.flush_offset > 0;

        trace!(
            source = ?self.source_id,
            input = input.len(),
            flush_offset = out.flush_offset,
            data = out.data,
            padding = out.padding,
            state = ?self.scan_state,
            "classified DATA frame segment"
        );
        Ok(out)
    }

    fn scan_padding_length(&mut self, padding_len: u8) -> Result<u32, CutterError> {
        // data_len still counts the padding-length byte itself here
        if self.data_len <= u32::from(padding_len) {
            return Err(CutterError::MalformedPadding {
                data_len: self.data_len,
                padding_len,
            });
        }
        // TODO: accept padding-only frames once bodies spanning several
        // DATA frames are handed downstream as one message
        if self.data_len == u32::from(padding_len) + 1 {
            return Err(CutterError::PaddingOnly);
        }
        self.data_len -= u32::from(padding_len) + 1;
        self.padding_len = padding_len;
        self.scan_state = ScanState::Data;
        Ok(1)
    }

    fn scan_data(&mut self, available: usize) -> u32 {
        let data = (self.data_len - self.data_bytes_read).min(available as u32);
        self.data_bytes_read += data;
        if self.data_bytes_read == self.data_len {
            self.scan_state = if self.padding_len > 0 {
                ScanState::Padding
            } else {
                ScanState::FullFrame
            };
        }
        data
    }

    fn scan_padding(&mut self, available: usize) -> u32 {
        let padding = (u32::from(self.padding_len) - self.padding_read).min(available as u32);
        self.padding_read += padding;
        if self.padding_read == u32::from(self.padding_len) {
            self.scan_state = ScanState::FullFrame;
        }
        padding
    }
}
