use std::io::prelude::*;

use byteorder::{BigEndian, ByteOrder};

use flate2;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use snap;

use errors::{ErrorKind, Result, ResultExt};

/// Header of the legacy xerial snappy container: 8 magic bytes followed by
/// two i32 version fields, then a sequence of `(i32 length, snappy block)`
/// chunks.
const SNAPPY_MAGIC: &'static [u8] = &[0x82, b'S', b'N', b'A', b'P', b'P', b'Y', 0x00];
const SNAPPY_HEADER_LEN: usize = 16;

/// The compression codec of a message set, carried in the low 3 bits of the
/// message attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Compression {
    None = 0,
    Gzip = 1,
    Snappy = 2,
}

impl Default for Compression {
    fn default() -> Self {
        Compression::None
    }
}

impl Compression {
    /// Resolves a codec number from message attributes.
    pub fn from_codec(codec: i8) -> Option<Compression> {
        match codec {
            0 => Some(Compression::None),
            1 => Some(Compression::Gzip),
            2 => Some(Compression::Snappy),
            _ => None,
        }
    }

    /// Compresses a message-set image.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match *self {
            Compression::None => Ok(data.to_vec()),
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder
                    .write_all(data)
                    .and_then(|_| encoder.finish())
                    .chain_err(|| ErrorKind::CompressionFailed)
            }
            Compression::Snappy => {
                snap::Encoder::new()
                    .compress_vec(data)
                    .chain_err(|| ErrorKind::CompressionFailed)
            }
        }
    }

    /// Restores a message-set image.
    ///
    /// Snappy input may be either the raw block format this codec emits or
    /// the legacy xerial container some producers use; the container is
    /// recognized by its magic prefix and never assumed.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match *self {
            Compression::None => Ok(data.to_vec()),
            Compression::Gzip => {
                let mut decoded = Vec::new();
                GzDecoder::new(data)
                    .read_to_end(&mut decoded)
                    .chain_err(|| ErrorKind::DecompressionFailed)?;
                Ok(decoded)
            }
            Compression::Snappy => {
                if data.starts_with(SNAPPY_MAGIC) {
                    if data.len() < SNAPPY_HEADER_LEN {
                        bail!(ErrorKind::DecompressionFailed);
                    }

                    decompress_snappy_chunked(&data[SNAPPY_HEADER_LEN..])
                } else {
                    snap::Decoder::new()
                        .decompress_vec(data)
                        .chain_err(|| ErrorKind::DecompressionFailed)
                }
            }
        }
    }
}

fn decompress_snappy_chunked(mut chunks: &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::new();

    while !chunks.is_empty() {
        if chunks.len() < 4 {
            bail!(ErrorKind::DecompressionFailed);
        }

        let len = BigEndian::read_i32(chunks);
        chunks = &chunks[4..];

        if len < 0 || chunks.len() < len as usize {
            bail!(ErrorKind::DecompressionFailed);
        }

        let block = snap::Decoder::new()
            .decompress_vec(&chunks[..len as usize])
            .chain_err(|| ErrorKind::DecompressionFailed)?;

        decoded.extend_from_slice(&block);
        chunks = &chunks[len as usize..];
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use bytes::{BigEndian, BufMut};

    use super::*;
    use errors::{Error, ErrorKind};

    const SAMPLE: &'static [u8] = b"a sequence of bytes long enough to be worth deflating, \
                                    a sequence of bytes long enough to be worth deflating";

    #[test]
    fn test_none_is_identity() {
        assert_eq!(Compression::None.compress(SAMPLE).unwrap(), SAMPLE);
        assert_eq!(Compression::None.decompress(SAMPLE).unwrap(), SAMPLE);
    }

    #[test]
    fn test_gzip_round_trip() {
        let compressed = Compression::Gzip.compress(SAMPLE).unwrap();

        assert!(compressed.starts_with(&[0x1f, 0x8b]));
        assert_eq!(Compression::Gzip.decompress(&compressed).unwrap(), SAMPLE);
    }

    #[test]
    fn test_snappy_round_trip() {
        let compressed = Compression::Snappy.compress(SAMPLE).unwrap();

        assert_eq!(Compression::Snappy.decompress(&compressed).unwrap(), SAMPLE);
    }

    #[test]
    fn test_snappy_xerial_container() {
        let first = snap::Encoder::new().compress_vec(&SAMPLE[..40]).unwrap();
        let second = snap::Encoder::new().compress_vec(&SAMPLE[40..]).unwrap();

        let mut container = Vec::new();
        container.extend_from_slice(&[0x82, b'S', b'N', b'A', b'P', b'P', b'Y', 0x00]);
        container.put_i32::<BigEndian>(1);
        container.put_i32::<BigEndian>(1);
        container.put_i32::<BigEndian>(first.len() as i32);
        container.extend_from_slice(&first);
        container.put_i32::<BigEndian>(second.len() as i32);
        container.extend_from_slice(&second);

        assert_eq!(Compression::Snappy.decompress(&container).unwrap(), SAMPLE);
    }

    #[test]
    fn test_snappy_truncated_chunk() {
        let mut container = Vec::new();
        container.extend_from_slice(&[0x82, b'S', b'N', b'A', b'P', b'P', b'Y', 0x00]);
        container.put_i32::<BigEndian>(1);
        container.put_i32::<BigEndian>(1);
        container.put_i32::<BigEndian>(100);
        container.extend_from_slice(b"short");

        match Compression::Snappy.decompress(&container) {
            Err(Error(ErrorKind::DecompressionFailed, _)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_gzip_rejects_garbage() {
        match Compression::Gzip.decompress(b"not a gzip stream") {
            Err(Error(ErrorKind::DecompressionFailed, _)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_reserved_codec() {
        assert_eq!(Compression::from_codec(1), Some(Compression::Gzip));
        assert_eq!(Compression::from_codec(3), None);
        assert_eq!(Compression::from_codec(7), None);
    }
}
