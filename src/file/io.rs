//! Endian-aware primitive reads over byte slices.
//!
//! The JVM class file format stores every multi-byte quantity in big-endian order. This module
//! provides the [`crate::file::io::BinaryIO`] trait, implemented for all primitive integer and
//! floating-point types, together with bounds-checked free functions that decode them from a
//! buffer. The [`crate::file::parser::Parser`] cursor is built on top of these functions.
//!
//! # Examples
//!
//! ```rust,ignore
//! use javacg::file::io::read_be_at;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34];
//! let mut offset = 0;
//!
//! let magic: u32 = read_be_at(&data, &mut offset)?;
//! assert_eq!(magic, 0xCAFE_BABE);
//! let major: u16 = read_be_at(&data, &mut offset)?;
//! assert_eq!(major, 52);
//! # Ok::<(), javacg::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait for implementing type-specific safe binary data reading operations.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that particular type (e.g., `[u8; 4]` for `u32`).
///
/// All implementations are thread-safe as they only work with primitive types and perform
/// pure conversion operations.
pub trait BinaryIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
    /// Write T to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_binary_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl BinaryIO for $ty {
                type Bytes = [u8; $len];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_binary_io! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

/// Reads a value of type `T` from the start of `data` in big-endian byte order.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T`.
pub fn read_be<T: BinaryIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_be_at(data, &mut offset)
}

/// Reads a value of type `T` at `offset` in big-endian byte order and advances `offset`.
///
/// The offset is left untouched when the read fails.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_be_at<T: BinaryIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_be_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_be_u8() {
        let result = read_be::<u8>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x01);
    }

    #[test]
    fn read_be_u16() {
        let result = read_be::<u16>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0102);
    }

    #[test]
    fn read_be_i32() {
        let result = read_be::<i32>(&[0xFF, 0xFF, 0xFF, 0xFE]).unwrap();
        assert_eq!(result, -2);
    }

    #[test]
    fn read_be_u64() {
        let result = read_be::<u64>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0102_0304_0506_0708);
    }

    #[test]
    fn read_be_f32() {
        let result = read_be::<f32>(&1.5_f32.to_be_bytes()).unwrap();
        assert!((result - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn read_be_at_advances() {
        let mut offset = 2;
        let value = read_be_at::<u16>(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(value, 0x0304);
        assert_eq!(offset, 4);
    }

    #[test]
    fn read_be_at_out_of_bounds() {
        let mut offset = 6;
        let result = read_be_at::<u32>(&TEST_BUFFER, &mut offset);
        assert!(matches!(result, Err(OutOfBounds)));
        assert_eq!(offset, 6);

        let mut offset = usize::MAX;
        assert!(read_be_at::<u8>(&TEST_BUFFER, &mut offset).is_err());
    }
}
