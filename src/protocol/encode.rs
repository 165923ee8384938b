use std::i16;
use std::io::Write;

use bytes::{BigEndian, BufMut, ByteOrder, BytesMut};

use errors::{ErrorKind, Result};

/// Appends the length-prefixed wire forms of strings, byte strings and
/// arrays to a byte sink.
pub trait WriteExt: BufMut + Sized {
    /// Writes an i16 length followed by the UTF-8 bytes; `None` is the null
    /// marker (length -1).
    fn put_str<T: ByteOrder, S: AsRef<str>>(&mut self, s: Option<S>) -> Result<()> {
        match s {
            Some(ref s) if s.as_ref().len() > i16::MAX as usize => {
                bail!(ErrorKind::CodecError("string exceeds the maximum size"))
            }
            Some(s) => {
                let s = s.as_ref();

                self.put_i16::<T>(s.len() as i16);
                self.put_slice(s.as_bytes());
            }
            None => self.put_i16::<T>(-1),
        }

        Ok(())
    }

    /// Writes an i32 length followed by the bytes; `None` is the null
    /// marker (length -1), which is distinct from empty bytes.
    fn put_bytes<T: ByteOrder, D: AsRef<[u8]>>(&mut self, d: Option<D>) -> Result<()> {
        match d {
            Some(ref d) if d.as_ref().len() > i32::max_value() as usize => {
                bail!(ErrorKind::CodecError("bytes exceed the maximum size"))
            }
            Some(d) => {
                let d = d.as_ref();

                self.put_i32::<T>(d.len() as i32);
                self.put_slice(d);
            }
            None => self.put_i32::<T>(-1),
        }

        Ok(())
    }

    /// Writes the exact i32 element count (never -1) followed by the
    /// elements in order.
    fn put_array<T, E, F>(&mut self, items: &[E], mut f: F) -> Result<()>
        where T: ByteOrder,
              F: FnMut(&mut Self, &E) -> Result<()>
    {
        self.put_i32::<T>(items.len() as i32);

        for item in items {
            f(self, item)?;
        }

        Ok(())
    }
}

impl<B: BufMut + Sized> WriteExt for B {}

/// Appends the header-included body of a request or response frame, without
/// the outer length prefix.
pub trait Encodable {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()>;
}

/// A complete frame: an i32 big-endian length prefix (excluding its own 4
/// bytes) followed by the encoded body.
///
/// The buffer and stream paths produce byte-identical output; `write_to`
/// materializes the frame and hands it to the sink in one piece.
pub trait Frame: Encodable {
    /// Materializes the frame into a byte buffer.
    fn bytes(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(64);

        buf.put_i32::<BigEndian>(0);
        self.encode::<BigEndian>(&mut buf)?;

        let size = (buf.len() - 4) as i32;
        BigEndian::write_i32(&mut buf[..4], size);

        Ok(buf)
    }

    /// Streams the frame to a sink, returning the number of bytes written.
    fn write_to<W: Write>(&self, w: &mut W) -> Result<usize> {
        let buf = self.bytes()?;

        w.write_all(&buf)?;

        Ok(buf.len())
    }
}
