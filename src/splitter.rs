//! Contract of the downstream HTTP/1.x byte-stream inspector.
//!
//! The cutter never looks inside the inspector. It hands over synthetic and
//! classified bytes through [`StreamSplitter::scan`], watches the returned
//! [`Status`], and later replays the same bytes through
//! [`StreamSplitter::reassemble`] once a flush is confirmed.

/// Byte-stream status shared by the cutter and the downstream inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Need more input before a boundary can be found.
    NeedMore,
    /// Boundary found, reassemble now.
    Flush,
    /// Protocol violation, abandon the stream.
    Abort,
}

/// Result of a scan call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanResult {
    pub status: Status,
    /// Bytes of this call's input forming a unit to reassemble. Zero unless
    /// `status` is [`Status::Flush`].
    pub flush_offset: u32,
}

impl ScanResult {
    pub fn need_more() -> Self {
        Self {
            status: Status::NeedMore,
            flush_offset: 0,
        }
    }

    pub fn flush(flush_offset: u32) -> Self {
        Self { status: Status::Flush, flush_offset }
    }

    pub fn abort() -> Self {
        Self {
            status: Status::Abort,
            flush_offset: 0,
        }
    }
}

/// Result of a reassemble call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reassembled {
    /// Bytes of the supplied input the inspector accepted.
    pub copied: usize,
    /// Finished message, handed over when the inspector completes one.
    pub buffer: Option<Vec<u8>>,
}

/// Downstream HTTP/1.x inspector fed with the synthetic chunked stream.
pub trait StreamSplitter {
    /// Look for a message boundary in `data`.
    fn scan(&mut self, data: &[u8]) -> ScanResult;

    /// Copy `data` into the message being built.
    ///
    /// `total` is the size of the message announced during scan, `offset`
    /// the position of `data` within it. `end_of_message` marks the final
    /// piece, after which the inspector returns the finished buffer.
    fn reassemble(
        &mut self,
        total: u32,
        offset: u32,
        data: &[u8],
        end_of_message: bool,
    ) -> Reassembled;
}

impl<T: StreamSplitter + ?Sized> StreamSplitter for Box<T> {
    fn scan(&mut self, data: &[u8]) -> ScanResult {
        (**self).scan(data)
    }

    fn reassemble(
        &mut self,
        total: u32,
        offset: u32,
        data: &[u8],
        end_of_message: bool,
    ) -> Reassembled {
        (**self).reassemble(total, offset, data, end_of_message)
    }
}
