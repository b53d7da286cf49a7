//! Line sources and byte sinks.
//!
//! The parser pulls complete lines (no trailing newline) from a
//! [`LineSource`]; the renderer writes to any [`std::io::Write`]. Both are
//! constructed and injected by the caller; the core never touches stdin or
//! stdout itself.

use std::io::{self, BufRead};

/// Pull-based line input. `next_line` yields one line at a time without its
/// trailing newline; `None` is the end-of-input signal.
pub trait LineSource {
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Line source over an in-memory string.
pub struct StrSource<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> StrSource<'a> {
    pub fn new(input: &'a str) -> StrSource<'a> {
        StrSource {
            lines: input.lines(),
        }
    }
}

impl LineSource for StrSource<'_> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.next().map(|line| trim_cr(line).to_string()))
    }
}

/// Line source over any buffered reader. Invalid UTF-8 bytes are replaced
/// rather than failing the whole parse.
pub struct LinesFrom<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LinesFrom<R> {
    pub fn new(reader: R) -> LinesFrom<R> {
        LinesFrom {
            reader,
            buf: Vec::with_capacity(80),
        }
    }
}

impl<R: BufRead> LineSource for LinesFrom<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

#[inline]
fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(mut src: impl LineSource) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = src.next_line().unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn str_source_splits_lines_without_newlines() {
        assert_eq!(drain(StrSource::new("a\nb\n\nc")), ["a", "b", "", "c"]);
        assert_eq!(drain(StrSource::new("")), Vec::<String>::new());
    }

    #[test]
    fn str_source_strips_carriage_returns() {
        assert_eq!(drain(StrSource::new("a\r\nb\r\n")), ["a", "b"]);
    }

    #[test]
    fn reader_source_handles_missing_final_newline() {
        let data: &[u8] = b"one\r\ntwo\nlast";
        assert_eq!(drain(LinesFrom::new(data)), ["one", "two", "last"]);
    }
}
