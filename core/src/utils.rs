//! utils.rs
//! Small helpers shared by the codec and the container.

/// Hex dump of at most `max` leading bytes, for log lines.
pub fn hex_preview(data: &[u8], max: usize) -> String {
    let shown = &data[..data.len().min(max)];
    if shown.len() < data.len() {
        format!("{}.. ({} bytes)", hex::encode(shown), data.len())
    } else {
        hex::encode(shown)
    }
}

#[inline]
pub fn is_word_aligned(n: u64) -> bool {
    n % 4 == 0
}
