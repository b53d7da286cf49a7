//! HTML escaping and safe embedding of raw payloads.
//!
//! Escaping uses numeric character references (`&#xHEX;`) for everything
//! that could change document structure: the five HTML specials, C0
//! controls, and the whole 0x80–0xFFFF range. Numeric references decode
//! back to the exact codepoint, so the transformation is structurally
//! reversible for any scalar.

use std::io::{self, Write};

use crate::utf8;

static HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

/// Bytes that cannot be copied through verbatim: specials, C0 controls,
/// and every non-ASCII lead/continuation byte (those are resolved to a
/// codepoint first).
static NEEDS_ESCAPE: [bool; 256] = {
    let mut t = [false; 256];
    let mut i = 0;
    while i < 0x20 {
        t[i] = true;
        i += 1;
    }
    let mut i = 0x80;
    while i < 256 {
        t[i] = true;
        i += 1;
    }
    t[b'<' as usize] = true;
    t[b'>' as usize] = true;
    t[b'&' as usize] = true;
    t[b'"' as usize] = true;
    t[b'\'' as usize] = true;
    t
};

fn push_hex_ref(out: &mut String, point: u32) {
    out.push_str("&#x");
    let mut digits = [0u8; 8];
    let mut top = 0;
    let mut p = point;
    if p == 0 {
        digits[top] = b'0';
        top = 1;
    }
    while p > 0 {
        digits[top] = HEX_CHARS[(p % 16) as usize];
        top += 1;
        p /= 16;
    }
    while top > 0 {
        top -= 1;
        out.push(digits[top] as char);
    }
    out.push(';');
}

fn escape_into(out: &mut String, input: &str, newline_br: bool) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut last = 0;
    let mut i = 0;

    while i < len {
        if !NEEDS_ESCAPE[bytes[i] as usize] {
            i += 1;
            continue;
        }
        if last < i {
            out.push_str(&input[last..i]);
        }
        let b = bytes[i];
        if b < 0x80 {
            if b == b'\n' && newline_br {
                out.push_str("<br>");
            } else {
                push_hex_ref(out, b as u32);
            }
            i += 1;
        } else {
            let (point, size) = utf8::decode(&bytes[i..]);
            if point < 0x10000 {
                push_hex_ref(out, point);
            } else {
                out.push_str(&input[i..i + size]);
            }
            i += size;
        }
        last = i;
    }

    if last < len {
        out.push_str(&input[last..len]);
    }
}

/// Escape `input` for literal placement in element content or a quoted
/// attribute value.
#[inline]
pub(crate) fn escape_html_into(out: &mut String, input: &str) {
    escape_into(out, input, false);
}

/// Like [`escape_html_into`], but a newline becomes `<br>`. Used for inline
/// text, where the only newlines left after parsing are the joins of a
/// comment block.
#[inline]
pub(crate) fn escape_html_text_into(out: &mut String, input: &str) {
    escape_into(out, input, true);
}

#[cfg(test)]
pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    escape_html_into(&mut out, input);
    out
}

/// Streaming filter that neutralizes a literal closing tag inside an
/// embedded payload: `</style>` → `<\/style>`, `</script>` → `<\/script>`.
///
/// The payload may arrive in arbitrary chunks (a line-oriented stream
/// included), so up to `needle.len() - 1` bytes of a partial match are
/// carried between `feed` calls and flushed verbatim by `finish` if the
/// match never completes.
pub(crate) struct CloseTagGuard {
    needle: &'static [u8],
    escaped: &'static [u8],
    held: Vec<u8>,
}

impl CloseTagGuard {
    pub(crate) fn style() -> CloseTagGuard {
        CloseTagGuard::new(b"</style>", b"<\\/style>")
    }

    pub(crate) fn script() -> CloseTagGuard {
        CloseTagGuard::new(b"</script>", b"<\\/script>")
    }

    fn new(needle: &'static [u8], escaped: &'static [u8]) -> CloseTagGuard {
        CloseTagGuard {
            needle,
            escaped,
            held: Vec::with_capacity(needle.len()),
        }
    }

    pub(crate) fn feed(&mut self, chunk: &[u8], out: &mut dyn Write) -> io::Result<()> {
        for &b in chunk {
            self.held.push(b);
            // Shift bytes out the front until what remains is again a
            // prefix of the needle. The needle is short, so the quadratic
            // worst case is bounded.
            while !self.held.is_empty() && !self.needle.starts_with(&self.held) {
                out.write_all(&self.held[..1])?;
                self.held.remove(0);
            }
            if self.held.len() == self.needle.len() {
                out.write_all(self.escaped)?;
                self.held.clear();
            }
        }
        Ok(())
    }

    /// Flush any partial match still held. Call once, after the last chunk.
    pub(crate) fn finish(&mut self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(&self.held)?;
        self.held.clear();
        Ok(())
    }
}
