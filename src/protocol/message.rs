use bytes::{BigEndian, BufMut, ByteOrder, Bytes, BytesMut};

use crc::crc32;

use nom::{ErrorKind, IResult};

use compression::Compression;
use errors::Result;
use protocol::{Offset, ParseTag, PartitionId, WriteExt, parse_bytes};

pub const COMPRESSION_CODEC_MASK: i8 = 0x07;

/// Bytes of the offset + size header that precede every message.
const MESSAGE_HEADER_LEN: usize = 8 + 4;
/// Smallest possible message body: crc, magic, attributes and two null
/// length prefixes.
const MESSAGE_MIN_BODY: usize = 4 + 1 + 1 + 4 + 4;

/// Message sets
///
/// One structure common to both the produce and fetch requests is the message set format.
/// A message in kafka is a key-value pair with a small amount of associated metadata.
/// A message set is just a sequence of messages with offset and size information.
/// This format happens to be used both for the on-disk storage on the broker and the on-the-wire format.
///
/// MessageSet => [Offset MessageSize Message]
///   Offset => int64
///   MessageSize => int32
///
/// The sequence carries no element count; it ends when the enclosing byte
/// budget is exhausted, and the broker may truncate the last message to fit
/// the client's size limit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageSet {
    pub messages: Vec<Message>,
}

/// Message format
///
/// Message => Crc MagicByte Attributes Key Value
///   Crc => uint32
///   MagicByte => int8
///   Attributes => int8
///   Key => bytes
///   Value => bytes
///
/// The checksum covers the bytes from the magic byte through the end of the
/// value; the compression codec lives in the low 3 bits of the attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    pub offset: Offset,
    pub crc: u32,
    pub key: Option<Bytes>,
    pub value: Option<Bytes>,
    /// The topic this message was fetched from.
    pub topic: String,
    /// The partition this message was fetched from.
    pub partition: PartitionId,
    /// High-water-mark offset of the partition at fetch time.
    pub tip_offset: Offset,
}

impl Message {
    /// Bytes the message occupies in an uncompressed set.
    fn wire_size(&self) -> usize {
        MESSAGE_HEADER_LEN + MESSAGE_MIN_BODY + self.key.as_ref().map_or(0, |k| k.len()) +
        self.value.as_ref().map_or(0, |v| v.len())
    }

    /// Writes the message keeping its recorded checksum, the way a decoded
    /// message is serialized again into a response.
    pub fn encode<T: ByteOrder>(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_i64::<T>(self.offset);

        let size_off = buf.len();
        buf.put_i32::<T>(0);
        buf.put_u32::<T>(self.crc);
        buf.put_i8(0);
        buf.put_i8(Compression::None as i8);
        buf.put_bytes::<T, _>(self.key.as_ref())?;
        buf.put_bytes::<T, _>(self.value.as_ref())?;

        let size = (buf.len() - size_off - 4) as i32;
        T::write_i32(&mut buf[size_off..], size);

        Ok(())
    }
}

pub struct MessageSetEncoder {
    compression: Compression,
}

impl MessageSetEncoder {
    pub fn new(compression: Compression) -> Self {
        MessageSetEncoder { compression: compression }
    }

    /// Encodes a message set, deriving each message's size and checksum.
    ///
    /// With compression, the set is first encoded flat, the image is
    /// compressed, and a single envelope message at offset 0 with a null
    /// key carries the result. An empty set produces no bytes, whatever
    /// the compression.
    pub fn encode<T: ByteOrder>(&self, message_set: &MessageSet, buf: &mut BytesMut) -> Result<()> {
        if message_set.messages.is_empty() {
            return Ok(());
        }

        match self.compression {
            Compression::None => {
                for message in &message_set.messages {
                    self.encode_message::<T>(message, message.offset, Compression::None, buf)?;
                }

                Ok(())
            }
            compression => {
                let image_size = message_set.messages.iter().map(|m| m.wire_size()).sum();
                let mut image = BytesMut::with_capacity(image_size);

                MessageSetEncoder::new(Compression::None).encode::<T>(message_set, &mut image)?;

                let envelope = Message {
                    value: Some(Bytes::from(compression.compress(&image)?)),
                    ..Default::default()
                };

                self.encode_message::<T>(&envelope, 0, compression, buf)
            }
        }
    }

    fn encode_message<T: ByteOrder>(&self,
                                    message: &Message,
                                    offset: Offset,
                                    compression: Compression,
                                    buf: &mut BytesMut)
                                    -> Result<()> {
        buf.put_i64::<T>(offset);

        let size_off = buf.len();
        buf.put_i32::<T>(0);
        let crc_off = buf.len();
        buf.put_u32::<T>(0);
        let data_off = buf.len();
        buf.put_i8(0);
        buf.put_i8(compression as i8 & COMPRESSION_CODEC_MASK);
        buf.put_bytes::<T, _>(message.key.as_ref())?;
        buf.put_bytes::<T, _>(message.value.as_ref())?;

        let size = (buf.len() - crc_off) as i32;
        let crc = crc32::checksum_ieee(&buf[data_off..]);

        T::write_i32(&mut buf[size_off..], size);
        T::write_u32(&mut buf[crc_off..], crc);

        Ok(())
    }
}

/// Decodes a message set out of its enclosing byte budget.
///
/// A trailing message cut off by the broker is dropped without error; a
/// checksum disagreement on a fully present message aborts the frame.
/// Compressed envelopes are restored recursively and their inner messages
/// spliced into the output in place of the envelope, keeping the inner
/// offsets as-is.
pub fn parse_message_set(input: &[u8]) -> IResult<&[u8], MessageSet> {
    let mut messages = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() {
        if remaining.len() < MESSAGE_HEADER_LEN {
            debug!("dropping truncated trailing message, {} bytes left",
                   remaining.len());
            break;
        }

        let offset = BigEndian::read_i64(remaining);
        let size = BigEndian::read_i32(&remaining[8..]);

        if size < 0 {
            return IResult::Error(ErrorKind::Custom(ParseTag::MessageSize as u32));
        }

        let size = size as usize;

        if remaining.len() - MESSAGE_HEADER_LEN < size {
            debug!("dropping truncated trailing message, {} of {} bytes left",
                   remaining.len() - MESSAGE_HEADER_LEN,
                   size);
            break;
        }
        if size < MESSAGE_MIN_BODY {
            return IResult::Error(ErrorKind::Custom(ParseTag::MessageSize as u32));
        }

        let body = &remaining[MESSAGE_HEADER_LEN..MESSAGE_HEADER_LEN + size];
        remaining = &remaining[MESSAGE_HEADER_LEN + size..];

        let crc = BigEndian::read_u32(body);
        let computed = crc32::checksum_ieee(&body[4..]);

        if crc != computed {
            trace!("message checksum mismatched, expected={}, current={}",
                   computed,
                   crc);

            return IResult::Error(ErrorKind::Custom(ParseTag::MessageCrc as u32));
        }

        let attrs = body[5] as i8;
        let (rest, key) = try_parse!(&body[6..], parse_bytes);
        let (_, value) = try_parse!(rest, parse_bytes);

        match Compression::from_codec(attrs & COMPRESSION_CODEC_MASK) {
            Some(Compression::None) => {
                messages.push(Message {
                                  offset: offset,
                                  crc: crc,
                                  key: key,
                                  value: value,
                                  ..Default::default()
                              });
            }
            Some(compression) => {
                let image = match compression
                          .decompress(value.as_ref().map_or(&[][..], |v| &v[..])) {
                    Ok(image) => image,
                    Err(_) => {
                        return IResult::Error(ErrorKind::Custom(ParseTag::Decompress as u32))
                    }
                };

                match parse_message_set(&image) {
                    IResult::Done(_, inner) => messages.extend(inner.messages),
                    IResult::Error(e) => return IResult::Error(e),
                    IResult::Incomplete(_) => {
                        return IResult::Error(ErrorKind::Custom(ParseTag::MessageSize as u32))
                    }
                }
            }
            None => return IResult::Error(ErrorKind::Custom(ParseTag::Compression as u32)),
        }
    }

    IResult::Done(&input[input.len()..], MessageSet { messages: messages })
}

#[cfg(test)]
mod tests {
    use bytes::{BigEndian, BufMut, Bytes, BytesMut};

    use crc::crc32;

    use nom::{ErrorKind, IResult};

    use super::*;
    use compression::Compression;
    use protocol::ParseTag;

    fn key_value_message(offset: i64) -> Message {
        Message {
            offset: offset,
            crc: 0xb8ba5f57,
            key: Some(Bytes::from(&b"foo"[..])),
            value: Some(Bytes::from(&b"bar"[..])),
            ..Default::default()
        }
    }

    #[test]
    fn test_encode_single_message() {
        let set = MessageSet { messages: vec![key_value_message(0)] };

        let mut buf = BytesMut::with_capacity(64);
        MessageSetEncoder::new(Compression::None)
            .encode::<BigEndian>(&set, &mut buf)
            .unwrap();

        assert_eq!(&buf[..],
                   &[0, 0, 0, 0, 0, 0, 0, 0,                // offset
                     0, 0, 0, 0x14,                         // size
                     0xb8, 0xba, 0x5f, 0x57,                // crc
                     0, 0,                                  // magic + attributes
                     0, 0, 0, 3, b'f', b'o', b'o',          // key
                     0, 0, 0, 3, b'b', b'a', b'r'][..]);    // value

        assert_eq!(parse_message_set(&buf), IResult::Done(&b""[..], set));
    }

    #[test]
    fn test_encode_empty_message_set() {
        for &compression in &[Compression::None, Compression::Gzip, Compression::Snappy] {
            let mut buf = BytesMut::with_capacity(64);

            MessageSetEncoder::new(compression)
                .encode::<BigEndian>(&MessageSet::default(), &mut buf)
                .unwrap();

            assert_eq!(buf.len(), 0);
        }
    }

    #[test]
    fn test_null_key_and_value_survive_round_trip() {
        let set = MessageSet {
            messages: vec![Message {
                               value: Some(Bytes::new()),
                               ..Default::default()
                           }],
        };

        let mut buf = BytesMut::with_capacity(64);
        MessageSetEncoder::new(Compression::None)
            .encode::<BigEndian>(&set, &mut buf)
            .unwrap();

        // key length -1, value length 0
        assert_eq!(&buf[18..], &[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0][..]);

        match parse_message_set(&buf) {
            IResult::Done(_, decoded) => {
                assert_eq!(decoded.messages[0].key, None);
                assert_eq!(decoded.messages[0].value, Some(Bytes::new()));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_compressed_round_trip() {
        let set = MessageSet { messages: vec![key_value_message(0), key_value_message(1)] };

        for &compression in &[Compression::Gzip, Compression::Snappy] {
            let mut buf = BytesMut::with_capacity(256);

            MessageSetEncoder::new(compression)
                .encode::<BigEndian>(&set, &mut buf)
                .unwrap();

            // a single envelope message at offset 0 carrying the codec
            assert_eq!(BigEndian::read_i64(&buf), 0);
            assert_eq!(buf[17] as i8 & COMPRESSION_CODEC_MASK, compression as i8);

            assert_eq!(parse_message_set(&buf), IResult::Done(&b""[..], set.clone()));
        }
    }

    #[test]
    fn test_truncated_message_set() {
        let set = MessageSet {
            messages: vec![Message {
                               value: Some(Bytes::from(&b"111111111111111"[..])),
                               ..Default::default()
                           },
                           Message {
                               value: Some(Bytes::from(&b"222222222222222"[..])),
                               ..Default::default()
                           },
                           Message {
                               value: Some(Bytes::from(&b"333333333333333"[..])),
                               ..Default::default()
                           }],
        };

        let mut buf = BytesMut::with_capacity(256);
        MessageSetEncoder::new(Compression::None)
            .encode::<BigEndian>(&set, &mut buf)
            .unwrap();

        // cut off the last bytes as kafka can do
        let truncated = &buf[..buf.len() - 4];

        match parse_message_set(truncated) {
            IResult::Done(_, decoded) => {
                assert_eq!(decoded.messages.len(), 2);
                assert_eq!(decoded.messages[0].value.as_ref().unwrap()[0], b'1');
                assert_eq!(decoded.messages[1].value.as_ref().unwrap()[0], b'2');
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_checksum_mismatch() {
        let set = MessageSet { messages: vec![key_value_message(0)] };

        let mut buf = BytesMut::with_capacity(64);
        MessageSetEncoder::new(Compression::None)
            .encode::<BigEndian>(&set, &mut buf)
            .unwrap();

        let last = buf.len() - 1;
        buf[last] ^= 0xff;

        assert_eq!(parse_message_set(&buf),
                   IResult::Error(ErrorKind::Custom(ParseTag::MessageCrc as u32)));
    }

    #[test]
    fn test_reserved_compression_codec() {
        let mut body = BytesMut::with_capacity(16);
        body.put_i8(0);
        body.put_i8(3); // reserved codec
        body.put_bytes::<BigEndian, &[u8]>(None).unwrap();
        body.put_bytes::<BigEndian, _>(Some(&b"x"[..])).unwrap();

        let mut buf = BytesMut::with_capacity(32);
        buf.put_i64::<BigEndian>(0);
        buf.put_i32::<BigEndian>(body.len() as i32 + 4);
        buf.put_u32::<BigEndian>(crc32::checksum_ieee(&body));
        buf.put_slice(&body);

        assert_eq!(parse_message_set(&buf),
                   IResult::Error(ErrorKind::Custom(ParseTag::Compression as u32)));
    }
}
