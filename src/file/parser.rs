//! Low-level byte stream parser for class file and bytecode decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data
//! parser for reading JVM class file structures and method bytecode. It offers bounds-checked
//! access to big-endian data, alignment for the padded switch instructions, and decoding of the
//! modified UTF-8 encoding used by `CONSTANT_Utf8` entries.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::seek`] - Move to specific position
//! - [`crate::file::parser::Parser::advance_by`] - Move forward by specified bytes
//! - [`crate::file::parser::Parser::pos`] - Get current position
//! - [`crate::file::parser::Parser::align`] - Align to byte boundaries
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_be`] - Read primitive types (big-endian)
//! - [`crate::file::parser::Parser::read_bytes`] - Borrow a run of raw bytes
//! - [`crate::file::parser::Parser::read_string_mutf8`] - Read modified UTF-8 strings
//!
//! # Usage Examples
//!
//! ```rust
//! use javacg::Parser;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_be::<u32>()?, 0xCAFE_BABE);
//! parser.advance_by(2)?;
//! assert_eq!(parser.read_be::<u16>()?, 52);
//! # Ok::<(), javacg::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, BinaryIO},
    Result,
};

/// A generic binary data parser for reading class file structures.
///
/// `Parser` provides a cursor-based interface for reading big-endian binary data. The parser
/// maintains an internal position cursor and provides bounds checking to prevent buffer overruns
/// when reading malformed or truncated data.
///
/// # Examples
///
/// ```rust
/// use javacg::Parser;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut parser = Parser::new(&data);
///
/// let first = parser.read_be::<u32>()?;
/// assert_eq!(first, 0x01020304);
///
/// parser.seek(6)?;
/// let last_bytes = parser.read_be::<u16>()?;
/// assert_eq!(last_bytes, 0x0708);
/// # Ok::<(), javacg::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the current position to the specified index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        match self.position.checked_add(step) {
            Some(end) if end <= self.data.len() => {
                self.position = end;
                Ok(())
            }
            _ => Err(out_of_bounds_error!()),
        }
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is at or beyond the data length.
    pub fn peek_byte(&self) -> Result<u8> {
        if self.position >= self.data.len() {
            return Err(out_of_bounds_error!());
        }
        Ok(self.data[self.position])
    }

    /// Align the position to a specific boundary.
    ///
    /// `tableswitch` and `lookupswitch` pad their operands so the first one starts at a multiple
    /// of four bytes from the beginning of the method's code; a parser created over the code
    /// array aligns relative to that start.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if aligning would exceed the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use javacg::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
    /// let mut parser = Parser::new(&data);
    ///
    /// parser.advance_by(1)?;
    /// parser.align(4)?;
    /// assert_eq!(parser.pos(), 4);
    /// # Ok::<(), javacg::Error>(())
    /// ```
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let padding = (alignment - (self.position % alignment)) % alignment;
        if self.position + padding > self.data.len() {
            return Err(out_of_bounds_error!());
        }
        self.position += padding;
        Ok(())
    }

    /// Read a type `T` from the current position in big-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_be<T: BinaryIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Borrow the next `len` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let start = self.position;
        self.advance_by(len)?;
        Ok(&self.data[start..self.position])
    }

    /// Read `len` bytes of modified UTF-8 and decode them into a [`String`].
    ///
    /// Class files encode `U+0000` as the two bytes `C0 80` and characters outside the Basic
    /// Multilingual Plane as two separately encoded surrogates. Both forms are decoded here; a
    /// lone surrogate is replaced with `U+FFFD`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `len` bytes remain, or
    /// [`crate::Error::Malformed`] for a truncated or invalid byte sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use javacg::Parser;
    ///
    /// let data = [b'a', 0xC0, 0x80, b'b'];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_string_mutf8(4)?, "a\u{0}b");
    /// # Ok::<(), javacg::Error>(())
    /// ```
    pub fn read_string_mutf8(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;

        // Fast path, plain ASCII is identical in both encodings
        if bytes.iter().all(|b| *b != 0 && *b < 0x80) {
            return Ok(String::from_utf8_lossy(bytes).into_owned());
        }

        let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            let b0 = u16::from(bytes[i]);
            if b0 & 0x80 == 0 {
                units.push(b0);
                i += 1;
            } else if b0 & 0xE0 == 0xC0 {
                let Some(&b1) = bytes.get(i + 1) else {
                    return Err(malformed_error!("Truncated modified UTF-8 sequence at {}", i));
                };
                units.push(((b0 & 0x1F) << 6) | (u16::from(b1) & 0x3F));
                i += 2;
            } else if b0 & 0xF0 == 0xE0 {
                let (Some(&b1), Some(&b2)) = (bytes.get(i + 1), bytes.get(i + 2)) else {
                    return Err(malformed_error!("Truncated modified UTF-8 sequence at {}", i));
                };
                units.push(((b0 & 0x0F) << 12) | ((u16::from(b1) & 0x3F) << 6) | (u16::from(b2) & 0x3F));
                i += 3;
            } else {
                return Err(malformed_error!(
                    "Invalid modified UTF-8 lead byte 0x{:02X} at {}",
                    b0,
                    i
                ));
            }
        }

        Ok(String::from_utf16_lossy(&units))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn parser_navigation() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.len(), 4);
        assert!(!parser.is_empty());
        assert!(parser.has_more_data());

        parser.seek(3).unwrap();
        assert_eq!(parser.peek_byte().unwrap(), 0x04);
        assert!(parser.seek(4).is_err());

        parser.advance_by(1).unwrap();
        assert!(!parser.has_more_data());
        assert!(matches!(parser.peek_byte(), Err(Error::OutOfBounds)));
        assert!(parser.advance_by(1).is_err());
    }

    #[test]
    fn parser_align() {
        let data = [0u8; 8];
        let mut parser = Parser::new(&data);

        parser.align(4).unwrap();
        assert_eq!(parser.pos(), 0);

        parser.advance_by(3).unwrap();
        parser.align(4).unwrap();
        assert_eq!(parser.pos(), 4);

        let mut short = Parser::new(&data[..2]);
        short.advance_by(1).unwrap();
        assert!(short.align(4).is_err());
    }

    #[test]
    fn parser_read_bytes() {
        let data = [0x01, 0x02, 0x03];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_bytes(2).unwrap(), &[0x01, 0x02]);
        assert_eq!(parser.pos(), 2);
        assert!(parser.read_bytes(2).is_err());
        assert_eq!(parser.pos(), 2);
    }

    #[test]
    fn mutf8_ascii() {
        let mut parser = Parser::new(b"java/lang/Object");
        assert_eq!(parser.read_string_mutf8(16).unwrap(), "java/lang/Object");
    }

    #[test]
    fn mutf8_two_and_three_byte() {
        // "é" (C3 A9) and "€" (E2 82 AC)
        let data = [0xC3, 0xA9, 0xE2, 0x82, 0xAC];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_string_mutf8(5).unwrap(), "é€");
    }

    #[test]
    fn mutf8_supplementary_as_surrogates() {
        // U+1F600 encoded as surrogate pair D83D DE00, each as a 3-byte sequence
        let data = [0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_string_mutf8(6).unwrap(), "\u{1F600}");
    }

    #[test]
    fn mutf8_truncated() {
        let data = [0xE2, 0x82];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_string_mutf8(2),
            Err(Error::Malformed { .. })
        ));
    }
}
