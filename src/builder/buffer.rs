// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// Marker returned when an append would run past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Truncated;

/// A fixed size byte buffer that refuses writes instead of growing.
///
/// Writes are all-or-nothing: either every byte of the input fits or the
/// buffer is left as it was.
#[derive(Debug, Clone)]
pub(crate) struct DatagramBuffer {
    bytes: Box<[u8]>,
    len: usize,
}

impl DatagramBuffer {
    pub fn new(capacity: usize) -> Self {
        DatagramBuffer {
            bytes: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Move the write offset back to `len`. Has no effect if `len` is
    /// past the current offset.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
        }
    }

    pub fn try_extend(&mut self, slice: &[u8]) -> Result<(), Truncated> {
        let end = self.len + slice.len();
        if end > self.capacity() {
            return Err(Truncated);
        }

        self.bytes[self.len..end].copy_from_slice(slice);
        self.len = end;
        Ok(())
    }

    /// Append all `parts` as a single segment.
    pub fn try_extend_all(&mut self, parts: &[&[u8]]) -> Result<(), Truncated> {
        let required: usize = parts.iter().map(|p| p.len()).sum();
        if self.len + required > self.capacity() {
            return Err(Truncated);
        }

        for part in parts {
            let end = self.len + part.len();
            self.bytes[self.len..end].copy_from_slice(part);
            self.len = end;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DatagramBuffer, Truncated};

    #[test]
    fn test_try_extend_fits_exactly() {
        let mut buf = DatagramBuffer::new(4);
        buf.try_extend(b"ab").unwrap();
        buf.try_extend(b"cd").unwrap();
        assert_eq!(b"abcd", buf.as_bytes());
    }

    #[test]
    fn test_try_extend_overflow_leaves_buffer_unchanged() {
        let mut buf = DatagramBuffer::new(4);
        buf.try_extend(b"abc").unwrap();
        assert_eq!(Err(Truncated), buf.try_extend(b"de"));
        assert_eq!(b"abc", buf.as_bytes());
    }

    #[test]
    fn test_try_extend_all_is_atomic() {
        let mut buf = DatagramBuffer::new(5);
        buf.try_extend(b"ab").unwrap();
        assert_eq!(Err(Truncated), buf.try_extend_all(&[b",", b"cde"]));
        assert_eq!(b"ab", buf.as_bytes());

        buf.try_extend_all(&[b",", b"cd"]).unwrap();
        assert_eq!(b"ab,cd", buf.as_bytes());
    }

    #[test]
    fn test_truncate_only_moves_backwards() {
        let mut buf = DatagramBuffer::new(8);
        buf.try_extend(b"abcdef").unwrap();
        buf.truncate(2);
        assert_eq!(b"ab", buf.as_bytes());
        buf.truncate(6);
        assert_eq!(2, buf.len());
    }
}
