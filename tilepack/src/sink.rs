//! Text and binary sinks over any `io::Write`.

use std::io::{self, Write};

use crate::emit::{PackedRows, Sink};
use crate::range::Section;

/// Format one packed row as an assembler `FCB` statement.
///
/// ```
/// assert_eq!(tilepack::sink::fcb_line(&[0x10, 0xff]), "\tFCB $10,$FF");
/// ```
pub fn fcb_line(bytes: &[u8]) -> String {
    let values: Vec<String> = bytes.iter().map(|b| format!("${b:02X}")).collect();
    format!("\tFCB {}", values.join(","))
}

/// Writes rows as Motorola-style `FCB` statements, one line per row, with a
/// blank line after each section.
#[derive(Debug)]
pub struct FcbSink<W: Write> {
    out: W,
}

impl<W: Write> FcbSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write a block of `;` comment lines followed by a blank line.
    pub fn write_header<S: AsRef<str>>(&mut self, lines: &[S]) -> io::Result<()> {
        for line in lines {
            writeln!(self.out, "; {}", line.as_ref())?;
        }
        writeln!(self.out)
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> Sink for FcbSink<W> {
    fn write_rows(&mut self, _section: Section, rows: &PackedRows) -> io::Result<()> {
        for row in rows.rows() {
            writeln!(self.out, "{}", fcb_line(row))?;
        }
        Ok(())
    }

    fn end_section(&mut self, _section: Section) -> io::Result<()> {
        writeln!(self.out)
    }
}

/// Writes packed rows back to back with no separators.
#[derive(Debug)]
pub struct RawSink<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> RawSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Bytes written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> Sink for RawSink<W> {
    fn write_rows(&mut self, _section: Section, rows: &PackedRows) -> io::Result<()> {
        self.out.write_all(rows.as_bytes())?;
        self.written += rows.as_bytes().len();
        Ok(())
    }
}
