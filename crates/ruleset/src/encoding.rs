//! Percent-encoding well-formedness.

use crate::foundation::{Context, ErrorKind, ValidationError};

/// Returns the byte offset of the first `%` not followed by two hex digits.
pub(crate) fn find_invalid_escape(value: &str) -> Option<usize> {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Some(i);
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    None
}

/// Checks that every escape in `value` is well formed.
pub(crate) fn check_escapes(ctx: &Context, value: &str) -> Result<(), ValidationError> {
    match find_invalid_escape(value) {
        None => Ok(()),
        Some(offset) => Err(ctx
            .error(
                ErrorKind::Encoding,
                format!("invalid percent-encoding at offset {offset}"),
            )
            .with_param("offset", offset.to_string())),
    }
}
