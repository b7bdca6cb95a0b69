//! h2-data-cutter: HTTP/2 DATA frames as an HTTP/1.x chunked body
//!
//! This crate lets an existing HTTP/1.x body inspector look at HTTP/2 request
//! and response bodies. Each DATA frame is rewritten, byte-exactly and across
//! arbitrarily split network segments, into a single HTTP/1.x chunk followed
//! by the last-chunk marker.
//!
//! # Features
//!
//! - **Sans-I/O Design**: you feed segments, nothing blocks or allocates threads
//! - **Resumable**: frame header, padding-length byte, payload and padding
//!   may be split anywhere across calls
//! - **Fails closed**: malformed padding raises a diagnostic and aborts
//!
//! # Quick Start
//!
//! ```rust
//! use h2_data_cutter::{
//!     build_data_frame, CutterConfig, DataCutter, FlowData, H2FrameHeader, Reassembled,
//!     ScanResult, SourceId, Status, StreamSplitter,
//! };
//!
//! /// Collects the chunked body and flushes on the last-chunk marker.
//! #[derive(Default)]
//! struct Collect {
//!     scanned: Vec<u8>,
//!     body: Vec<u8>,
//! }
//!
//! impl StreamSplitter for Collect {
//!     fn scan(&mut self, data: &[u8]) -> ScanResult {
//!         self.scanned.extend_from_slice(data);
//!         if self.scanned.ends_with(b"\r\n0\r\n") {
//!             ScanResult::flush(self.scanned.len() as u32)
//!         } else {
//!             ScanResult::need_more()
//!         }
//!     }
//!
//!     fn reassemble(&mut self, _total: u32, _offset: u32, data: &[u8], end: bool) -> Reassembled {
//!         self.body.extend_from_slice(data);
//!         let buffer = end.then(|| std::mem::take(&mut self.body));
//!         Reassembled { copied: data.len(), buffer }
//!     }
//! }
//!
//! let mut flow = FlowData::new(Collect::default(), Collect::default());
//! let frame = build_data_frame(1, b"hello", Some(3), true);
//!
//! let header = H2FrameHeader::parse(&frame).unwrap();
//! let config = CutterConfig::default();
//! let mut cutter = DataCutter::from_header(&header, SourceId::Client, &config).unwrap();
//!
//! let first = cutter.scan(&mut flow, &frame[..12]);
//! assert_eq!(first.status, Status::NeedMore);
//! let second = cutter.scan(&mut flow, &frame[12..]);
//! assert_eq!(second.status, Status::Flush);
//!
//! let total = frame.len() as u32;
//! let body = cutter.reassemble(&mut flow, total, 0, &frame).unwrap();
//! assert_eq!(body, Some(&b"5\r\nhello\r\n0\r\n"[..]));
//! ```
//!
//! # Architecture
//!
//! - [`FrameContext`] classifies bytes (pure byte accounting)
//! - [`DataCutter::scan`] wraps payload into a chunk for the downstream scan
//! - [`DataCutter::reassemble`] replays the frame to build the final buffer
//!
//! It does NOT provide:
//! - HTTP/2 connection state, HPACK or flow control
//! - TCP segment reassembly (you provide the bytes)
//! - Bodies spanning several DATA frames

pub mod chunk;
pub mod config;
pub mod context;
pub mod cutter;
pub mod error;
pub mod flow;
pub mod frame;
pub mod splitter;

pub use chunk::{chunk_header, CHUNK_TERMINATOR};
pub use config::CutterConfig;
pub use context::{Classified, FrameContext, ReassembleState, ScanState, WrapState};
pub use cutter::DataCutter;
pub use error::CutterError;
pub use flow::{Diagnostics, Direction, Event, FlowData, Infraction, SourceId};
pub use frame::{build_data_frame, flags, frame_type, H2FrameHeader, FRAME_HEADER_LENGTH};
pub use splitter::{Reassembled, ScanResult, Status, StreamSplitter};
