//! Synchronous byte readers consumed by the render engine.
//!
//! [`AssetStream`] is what [`crate::static_files::AssetSource::open`] hands out: a
//! buffered file on the filesystem backend or a borrowed slice on the memory backend.
//! Both are read one byte at a time through [`ByteSource`].

use std::fs::File;
use std::io::{self, BufReader, Read};

/// One-byte-at-a-time reader. `Ok(None)` signals end of input.
pub trait ByteSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl ByteSource for &[u8] {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self.split_first() {
            Some((&byte, rest)) => {
                *self = rest;
                Ok(Some(byte))
            }
            None => Ok(None),
        }
    }
}

impl<R: Read> ByteSource for BufReader<R> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        read_one(self)
    }
}

/// An opened asset.
#[derive(Debug)]
pub enum AssetStream<'a> {
    File(BufReader<File>),
    Memory(&'a [u8]),
}

impl<'a> AssetStream<'a> {
    /// The remaining bytes when the asset is already in memory.
    #[must_use]
    pub fn as_slice(&self) -> Option<&'a [u8]> {
        match self {
            AssetStream::Memory(data) => Some(*data),
            AssetStream::File(_) => None,
        }
    }
}

impl Read for AssetStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            AssetStream::File(reader) => reader.read(buf),
            AssetStream::Memory(data) => data.read(buf),
        }
    }
}

impl ByteSource for AssetStream<'_> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self {
            AssetStream::File(reader) => read_one(reader),
            AssetStream::Memory(data) => data.read_byte(),
        }
    }
}

fn read_one<R: Read + ?Sized>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_reads_to_eof() {
        let mut src: &[u8] = b"ab";
        assert_eq!(src.read_byte().unwrap(), Some(b'a'));
        assert_eq!(src.read_byte().unwrap(), Some(b'b'));
        assert_eq!(src.read_byte().unwrap(), None);
        assert_eq!(src.read_byte().unwrap(), None);
    }

    #[test]
    fn test_memory_stream_exposes_slice() {
        let mut stream = AssetStream::Memory(b"xyz");
        assert_eq!(stream.read_byte().unwrap(), Some(b'x'));
        assert_eq!(stream.as_slice(), Some(&b"yz"[..]));
    }
}
