//! JSON text in the sidecar's wire layout: `", "` / `": "` separators,
//! optionally with every non-printable-ASCII character `\u`-escaped

use serde::Serialize;
use serde_json::ser::Formatter;
use std::io::{self, Write};

/// serde_json formatter producing spaced separators and, when
/// `ensure_ascii` is set, ASCII-only output
#[derive(Debug, Clone, Copy)]
pub struct SpacedFormatter {
    ensure_ascii: bool,
}

impl SpacedFormatter {
    pub fn new(ensure_ascii: bool) -> Self {
        Self { ensure_ascii }
    }
}

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if !self.ensure_ascii {
            return writer.write_all(fragment.as_bytes());
        }
        for c in fragment.chars() {
            // control characters never reach here; serde_json escapes them itself
            if c.is_ascii() && c != '\x7f' {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

fn render<T: Serialize + ?Sized>(value: &T, ensure_ascii: bool) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter::new(ensure_ascii));
    value.serialize(&mut ser)?;
    String::from_utf8(buf)
        .map_err(|e| serde_json::Error::io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Spaced, ASCII-escaped JSON; the form measured and hashed
pub fn to_ascii_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    render(value, true)
}

/// Spaced JSON with non-ASCII text left as is; the form searched
pub fn to_spaced_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    render(value, false)
}
