//! HTTP/2 DATA frame to HTTP/1.x chunked body transcoder.
//!
//! A [`DataCutter`] lives for one DATA frame in one direction. The transport
//! layer feeds it segments through [`DataCutter::scan`]; payload bytes are
//! wrapped in a single chunk and pushed into the downstream inspector's scan.
//! Once the terminator makes the inspector flush, the same bytes come back
//! through [`DataCutter::reassemble`], which builds the real HTTP/1.x buffer
//! and hands it to the flow.
//!
//! ```text
//! 9 byte header | [pad len] | payload ......... | [padding]
//!                             v
//!         "<hex len>\r\n" payload ......... "\r\n0\r\n"
//! ```

use tracing::{debug, error, trace, warn};

use crate::chunk::{chunk_header, CHUNK_TERMINATOR};
use crate::config::CutterConfig;
use crate::context::{Classified, FrameContext, ReassembleState, WrapState};
use crate::error::CutterError;
use crate::flow::{Direction, Event, FlowData, Infraction, SourceId};
use crate::frame::{H2FrameHeader, FRAME_HEADER_LENGTH};
use crate::splitter::{ScanResult, Status, StreamSplitter};

/// Transcoder for a single DATA frame.
#[derive(Debug, Clone)]
pub struct DataCutter {
    ctx: FrameContext,
    last_error: Option<CutterError>,
}

impl DataCutter {
    /// `payload_len` is the frame header's length field, a 24-bit value.
    /// Larger values are clamped so the frame size never wraps.
    pub fn new(payload_len: u32, source_id: SourceId, is_padded: bool) -> Self {
        Self {
            ctx: FrameContext::new(source_id, payload_len, is_padded),
            last_error: None,
        }
    }

    /// Build a cutter from a parsed frame header, checking it against `config`.
    pub fn from_header(
        header: &H2FrameHeader,
        source_id: SourceId,
        config: &CutterConfig,
    ) -> Result<Self, CutterError> {
        if !header.is_data() {
            return Err(CutterError::NotDataFrame(header.frame_type));
        }
        if header.length > config.max_frame_size {
            return Err(CutterError::FrameTooLarge {
                length: header.length,
                max: config.max_frame_size,
            });
        }
        debug!(
            source = ?source_id,
            stream_id = header.stream_id,
            length = header.length,
            padded = header.is_padded(),
            "new DATA frame"
        );
        Ok(Self::new(header.length, source_id, header.is_padded()))
    }

    pub fn source_id(&self) -> SourceId {
        self.ctx.source_id()
    }

    pub fn context(&self) -> &FrameContext {
        &self.ctx
    }

    /// Why the last [`Status::Abort`] was returned.
    pub fn last_error(&self) -> Option<&CutterError> {
        self.last_error.as_ref()
    }

    /// The finished buffer was handed to the flow.
    pub fn is_complete(&self) -> bool {
        self.ctx.reassemble_state == ReassembleState::Done
    }

    /// Scan the next segment of the frame.
    ///
    /// Returns [`Status::Flush`] with the frame's flush offset once the whole
    /// frame went downstream, [`Status::NeedMore`] before that. Any failure
    /// is an [`Status::Abort`]; the reason stays in [`DataCutter::last_error`].
    pub fn scan<S: StreamSplitter>(&mut self, flow: &mut FlowData<S>, data: &[u8]) -> ScanResult {
        let dir = flow.direction_mut(self.ctx.source_id());
        match self.try_scan(dir, data) {
            Ok(result) => result,
            Err(err) => {
                match &err {
                    CutterError::MalformedPadding { data_len, padding_len } => {
                        warn!(
                            source = ?self.ctx.source_id(),
                            data_len,
                            padding_len,
                            "malformed DATA padding"
                        );
                        dir.diagnostics.register_infraction(Infraction::PaddingLength);
                        dir.diagnostics.create_event(Event::PaddingLength);
                    }
                    CutterError::PaddingOnly
                    | CutterError::UnexpectedStatus { actual: Status::Abort, .. } => {
                        debug!(source = ?self.ctx.source_id(), %err, "DATA frame scan aborted");
                    }
                    _ => error!(source = ?self.ctx.source_id(), %err, "DATA frame scan failed"),
                }
                self.last_error = Some(err);
                ScanResult::abort()
            }
        }
    }

    fn try_scan<S: StreamSplitter>(
        &mut self,
        dir: &mut Direction<S>,
        data: &[u8],
    ) -> Result<ScanResult, CutterError> {
        let classified = self.ctx.classify(data)?;
        dir.scan_remaining_frame_octets = self.ctx.remaining_frame_octets();

        if self.wrap(dir, data, &classified)? {
            debug!(
                source = ?self.ctx.source_id(),
                data_len = self.ctx.data_len(),
                sent = self.ctx.bytes_sent_downstream(),
                "DATA frame fully scanned"
            );
            Ok(ScanResult::flush(classified.flush_offset))
        } else {
            Ok(ScanResult::need_more())
        }
    }

    /// Push this call's payload downstream, framed as one chunk.
    /// Returns true once the terminator made the inspector flush.
    fn wrap<S: StreamSplitter>(
        &mut self,
        dir: &mut Direction<S>,
        data: &[u8],
        classified: &Classified,
    ) -> Result<bool, CutterError> {
        let payload = classified.payload(data);

        if self.ctx.wrap_state == WrapState::NoneSent && !payload.is_empty() {
            let hdr = chunk_header(self.ctx.data_len());
            self.forward(dir, hdr.as_bytes(), Status::NeedMore)?;
            self.ctx.wrap_state = WrapState::HeaderSent;
        }

        if self.ctx.wrap_state != WrapState::HeaderSent {
            return Ok(false);
        }
        if !payload.is_empty() {
            self.forward(dir, payload, Status::NeedMore)?;
        }
        if !classified.frame_complete {
            return Ok(false);
        }

        self.forward(dir, CHUNK_TERMINATOR, Status::Flush)?;
        dir.scan_octets_seen = 0;
        dir.scan_remaining_frame_octets = 0;
        Ok(true)
    }

    fn forward<S: StreamSplitter>(
        &mut self,
        dir: &mut Direction<S>,
        bytes: &[u8],
        expected: Status,
    ) -> Result<(), CutterError> {
        let result = dir.splitter.scan(bytes);
        self.ctx.bytes_sent_downstream += bytes.len() as u32;
        if result.status != expected {
            return Err(CutterError::UnexpectedStatus {
                expected,
                actual: result.status,
            });
        }
        Ok(())
    }

    /// Replay a flushed segment of the frame into the downstream inspector.
    ///
    /// `total` is the flushed frame size and `offset` the position of `data`
    /// within it. Returns the finished HTTP/1.x buffer, now owned by the
    /// flow, once the last segment arrived.
    pub fn reassemble<'f, S: StreamSplitter>(
        &mut self,
        flow: &'f mut FlowData<S>,
        total: u32,
        offset: u32,
        data: &[u8],
    ) -> Result<Option<&'f [u8]>, CutterError> {
        let source = self.ctx.source_id();
        let result = self.try_reassemble(flow.direction_mut(source), total, offset, data);
        if let Err(err) = &result {
            error!(
                source = ?source,
                total,
                offset,
                len = data.len(),
                %err,
                "DATA frame reassembly failed"
            );
        }
        result
    }

    fn try_reassemble<'f, S: StreamSplitter>(
        &mut self,
        dir: &'f mut Direction<S>,
        total: u32,
        offset: u32,
        data: &[u8],
    ) -> Result<Option<&'f [u8]>, CutterError> {
        if self.ctx.reassemble_state == ReassembleState::Done {
            return Err(CutterError::AlreadyComplete);
        }
        if offset == 0 {
            self.ctx.reset_read_counters();
        }

        let mut pos = 0usize;
        while pos < data.len() {
            let rest = &data[pos..];
            pos += match self.ctx.reassemble_state {
                ReassembleState::SkipFrameHdr => self.skip_frame_header(dir, rest),
                ReassembleState::SkipPaddingLen => self.skip_padding_length(),
                ReassembleState::SendChunkHdr => self.send_chunk_header(dir)?,
                ReassembleState::SendData => self.send_data(dir, rest)?,
                ReassembleState::SkipPadding => self.skip_padding(rest),
                ReassembleState::SendCrlf | ReassembleState::Done => {
                    return Err(CutterError::TrailingBytes(rest.len()));
                }
            };
        }

        let end = u64::from(offset) + data.len() as u64;
        let frame_end = end == u64::from(total);
        let at_crlf = self.ctx.reassemble_state == ReassembleState::SendCrlf;
        if frame_end && !at_crlf {
            return Err(CutterError::IncompleteFrame);
        }
        if at_crlf && !frame_end {
            return Err(CutterError::FrameLengthMismatch { total, end });
        }
        if !at_crlf {
            trace!(
                source = ?self.ctx.source_id(),
                offset,
                len = data.len(),
                "DATA frame partially reassembled"
            );
            return Ok(None);
        }

        let buffer = self.send_terminator(dir)?;
        self.ctx.reassemble_state = ReassembleState::Done;
        debug!(source = ?self.ctx.source_id(), len = buffer.len(), "DATA frame transcoded");
        Ok(Some(dir.adopt_frame_data(buffer)))
    }

    fn skip_frame_header<S>(&mut self, dir: &mut Direction<S>, rest: &[u8]) -> usize {
        let header = dir.frame_header_slot(self.ctx.hdr_bytes_read == 0);
        let n = (FRAME_HEADER_LENGTH - self.ctx.hdr_bytes_read).min(rest.len() as u32);
        header.extend_from_slice(&rest[..n as usize]);
        self.ctx.hdr_bytes_read += n;

        if self.ctx.hdr_bytes_read == FRAME_HEADER_LENGTH {
            self.ctx.reassemble_state = if self.ctx.is_padded() {
                ReassembleState::SkipPaddingLen
            } else {
                ReassembleState::SendChunkHdr
            };
        }
        n as usize
    }

    fn skip_padding_length(&mut self) -> usize {
        self.ctx.reassemble_state = ReassembleState::SendChunkHdr;
        1
    }

    /// Consumes no input, the chunk header is synthetic.
    fn send_chunk_header<S: StreamSplitter>(
        &mut self,
        dir: &mut Direction<S>,
    ) -> Result<usize, CutterError> {
        let hdr = chunk_header(self.ctx.data_len());
        self.reassemble_downstream(dir, hdr.as_bytes(), false)?;
        self.ctx.reassemble_state = ReassembleState::SendData;
        Ok(0)
    }

    fn send_data<S: StreamSplitter>(
        &mut self,
        dir: &mut Direction<S>,
        rest: &[u8],
    ) -> Result<usize, CutterError> {
        let n = (self.ctx.data_len() - self.ctx.data_bytes_read).min(rest.len() as u32);
        self.reassemble_downstream(dir, &rest[..n as usize], false)?;
        self.ctx.data_bytes_read += n;

        if self.ctx.data_bytes_read == self.ctx.data_len() {
            self.ctx.reassemble_state = if self.ctx.padding_len() > 0 {
                ReassembleState::SkipPadding
            } else {
                ReassembleState::SendCrlf
            };
        }
        Ok(n as usize)
    }

    fn skip_padding(&mut self, rest: &[u8]) -> usize {
        let n = (u32::from(self.ctx.padding_len()) - self.ctx.padding_read).min(rest.len() as u32);
        self.ctx.padding_read += n;
        if self.ctx.padding_read == u32::from(self.ctx.padding_len()) {
            self.ctx.reassemble_state = ReassembleState::SendCrlf;
        }
        n as usize
    }

    fn send_terminator<S: StreamSplitter>(
        &mut self,
        dir: &mut Direction<S>,
    ) -> Result<Vec<u8>, CutterError> {
        match self.reassemble_downstream(dir, CHUNK_TERMINATOR, true)? {
            Some(buffer) if !buffer.is_empty() => Ok(buffer),
            _ => Err(CutterError::MissingBuffer),
        }
    }

    fn reassemble_downstream<S: StreamSplitter>(
        &mut self,
        dir: &mut Direction<S>,
        bytes: &[u8],
        end_of_message: bool,
    ) -> Result<Option<Vec<u8>>, CutterError> {
        let out = dir.splitter.reassemble(
            self.ctx.bytes_sent_downstream,
            self.ctx.bytes_reassembled,
            bytes,
            end_of_message,
        );
        if out.copied != bytes.len() {
            return Err(CutterError::ShortCopy {
                expected: bytes.len(),
                copied: out.copied,
            });
        }
        self.ctx.bytes_reassembled += bytes.len() as u32;
        Ok(out.buffer)
    }
}
