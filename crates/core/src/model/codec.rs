use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::error::{ReqlogError, Result};

/// Compact JSON formatter that additionally escapes `<`, `>`, `&`, U+2028
/// and U+2029, so written lines match those produced by existing capture
/// files byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSafeFormatter;

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            let escaped = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..idx].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = idx + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serializes `value` as one log line, newline included.
pub fn encode_line<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(256);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, HtmlSafeFormatter);
    value
        .serialize(&mut ser)
        .map_err(|e| ReqlogError::Internal(format!("failed to encode log line: {e}")))?;
    out.push(b'\n');
    Ok(out)
}
