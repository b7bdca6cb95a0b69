//! HTTP/2 frame header handling for the DATA cutter.
//!
//! Only the pieces the cutter needs from the wire: the fixed 9-byte frame
//! header, the DATA frame type and its PADDED flag, plus an encoder for DATA
//! frames so callers can produce wire bytes without a full codec.
//!
//! Reference: RFC 7540 Section 4.1 and 6.1

/// Size of the fixed HTTP/2 frame header.
pub const FRAME_HEADER_LENGTH: u32 = 9;

/// HTTP/2 frame types (RFC 7540 Section 6)
pub mod frame_type {
    pub const DATA: u8 = 0x0;
    pub const HEADERS: u8 = 0x1;
}

/// HTTP/2 frame flags
pub mod flags {
    pub const END_STREAM: u8 = 0x1;
    pub const PADDED: u8 = 0x8;
}

/// A parsed HTTP/2 frame header (9 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct H2FrameHeader {
    pub length: u32, // 24 bits
    pub frame_type: u8,
    pub flags: u8,
    pub stream_id: u32, // 31 bits (high bit reserved)
}

impl H2FrameHeader {
    /// Parse a 9-byte frame header
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < FRAME_HEADER_LENGTH as usize {
            return None;
        }

        let length = ((data[0] as u32) << 16) | ((data[1] as u32) << 8) | (data[2] as u32);
        let stream_id = u32::from_be_bytes([data[5], data[6], data[7], data[8]]) & 0x7FFF_FFFF;

        Some(Self {
            length,
            frame_type: data[3],
            flags: data[4],
            stream_id,
        })
    }

    /// Total frame size including header
    pub fn total_size(&self) -> u32 {
        FRAME_HEADER_LENGTH + self.length
    }

    pub fn is_data(&self) -> bool {
        self.frame_type == frame_type::DATA
    }

    /// Check if PADDED flag is set
    pub fn is_padded(&self) -> bool {
        self.flags & flags::PADDED != 0
    }

    /// Check if END_STREAM flag is set
    pub fn is_end_stream(&self) -> bool {
        self.flags & flags::END_STREAM != 0
    }
}

/// Create a DATA frame.
///
/// `padding` of `Some(n)` sets the PADDED flag, writes the padding-length
/// byte and appends `n` zero bytes after the payload.
pub fn build_data_frame(
    stream_id: u32,
    data: &[u8],
    padding: Option<u8>,
    end_stream: bool,
) -> Vec<u8> {
    let pad_overhead = padding.map_or(0, |n| 1 + n as usize);
    let length = (data.len() + pad_overhead) as u32;

    let mut flags_byte = 0x0;
    if end_stream {
        flags_byte |= flags::END_STREAM;
    }
    if padding.is_some() {
        flags_byte |= flags::PADDED;
    }

    let mut frame = Vec::with_capacity(FRAME_HEADER_LENGTH as usize + length as usize);
    frame.push((length >> 16) as u8);
    frame.push((length >> 8) as u8);
    frame.push(length as u8);
    frame.push(frame_type::DATA);
    frame.push(flags_byte);
    // Stream ID (31 bits, bit 31 is reserved)
    frame.extend_from_slice(&(stream_id & 0x7FFF_FFFF).to_be_bytes());

    match padding {
        Some(pad_length) => {
            frame.push(pad_length);
            frame.extend_from_slice(data);
            frame.resize(frame.len() + pad_length as usize, 0);
        }
        None => frame.extend_from_slice(data),
    }
    frame
}
