//! Synthetic HTTP/1.x chunked-encoding bytes wrapped around DATA payloads.

/// Closes the single chunk and appends the zero-length last chunk.
pub const CHUNK_TERMINATOR: &[u8] = b"\r\n0\r\n";

/// Chunk header announcing `len` bytes: lowercase hex size plus CRLF.
pub fn chunk_header(len: u32) -> String {
    format!("{len:x}\r\n")
}
