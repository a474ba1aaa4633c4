//! Text position utilities for byte offset to line:column conversion.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count Unicode scalar values, not bytes

/// Convert a byte offset to 1-indexed line and column (Unicode-aware).
///
/// If `offset` exceeds the content length, returns the position at the end
/// of the content.
pub fn byte_offset_to_position_str(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;

    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}
