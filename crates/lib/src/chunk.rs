//! # Chunking
//!
//! Groups extracted document lines into overlapping fixed-size windows. The
//! overlap keeps sentences that straddle a window boundary retrievable from
//! both sides.

/// The default number of lines per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 5;
/// The default number of lines shared between consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 2;

/// Slides a window of `chunk_size` lines across `lines` with a step of
/// `max(1, chunk_size - overlap)` and joins each window with line breaks.
///
/// The final window may hold fewer than `chunk_size` lines; windows that are
/// empty after trimming are dropped. A `chunk_size` of zero yields no chunks
/// rather than an error.
pub fn chunk_lines(lines: &[String], chunk_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    if chunk_size == 0 {
        return chunks;
    }
    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut start = 0;
    while start < lines.len() {
        let end = (start + chunk_size).min(lines.len());
        let chunk = lines[start..end].join("\n");
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        start += step;
    }
    chunks
}
