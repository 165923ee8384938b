use std::io::Read;
use std::str;

use byteorder::{BigEndian, ReadBytesExt};

use bytes::Bytes;

use hexplay::HexViewBuilder;

use nom::{ErrorKind, IResult, Needed, be_i16, be_i32};

use errors::{KafkaCode, Result};

/// Positions in the wire grammar that fail for codec reasons rather than
/// plain length underflow. They travel through `nom` as custom error codes
/// and are translated back into `ErrorKind` at the frame boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum ParseTag {
    StringLen = 0,
    Utf8 = 1,
    BytesLen = 2,
    ArrayLen = 3,
    MessageSize = 4,
    MessageCrc = 5,
    Compression = 6,
    Decompress = 7,
}

/// Reads the i32 element count of an array and applies the element parser
/// that many times. A count of -1 denotes the empty array; any other
/// negative count is malformed. Element failures abort the array verbatim,
/// keeping codec error codes intact.
macro_rules! parse_array {
    ($i:expr, $submac:ident!( $($args:tt)* )) => ({
        match ::nom::be_i32($i) {
            ::nom::IResult::Error(e) => ::nom::IResult::Error(e),
            ::nom::IResult::Incomplete(needed) => ::nom::IResult::Incomplete(needed),
            ::nom::IResult::Done(rest, len) => {
                if len < -1 {
                    ::nom::IResult::Error(::nom::ErrorKind::Custom(
                        $crate::protocol::ParseTag::ArrayLen as u32))
                } else {
                    let mut input = rest;
                    let mut items = Vec::new();
                    let mut failed = None;

                    for _ in 0..len {
                        match $submac!(input, $($args)*) {
                            ::nom::IResult::Done(rest, item) => {
                                items.push(item);
                                input = rest;
                            }
                            ::nom::IResult::Error(e) => {
                                failed = Some(::nom::IResult::Error(e));
                                break;
                            }
                            ::nom::IResult::Incomplete(needed) => {
                                failed = Some(::nom::IResult::Incomplete(needed));
                                break;
                            }
                        }
                    }

                    match failed {
                        Some(err) => err,
                        None => ::nom::IResult::Done(input, items),
                    }
                }
            }
        }
    });
    ($i:expr, $f:expr) => (parse_array!($i, call!($f)));
}

/// Reads a length-prefixed string. The null marker (length -1) decodes as
/// the empty string; the wire keeps no other distinction for strings.
pub fn parse_string(input: &[u8]) -> IResult<&[u8], String> {
    let (rest, len) = try_parse!(input, be_i16);

    if len == -1 {
        return IResult::Done(rest, String::new());
    }
    if len < 0 {
        return IResult::Error(ErrorKind::Custom(ParseTag::StringLen as u32));
    }

    let len = len as usize;

    if rest.len() < len {
        return IResult::Incomplete(Needed::Size(len - rest.len()));
    }

    match str::from_utf8(&rest[..len]) {
        Ok(s) => IResult::Done(&rest[len..], s.to_owned()),
        Err(_) => IResult::Error(ErrorKind::Custom(ParseTag::Utf8 as u32)),
    }
}

/// Reads a length-prefixed byte string. Unlike strings, the null marker is
/// preserved: length -1 decodes as `None` and length 0 as empty bytes.
pub fn parse_bytes(input: &[u8]) -> IResult<&[u8], Option<Bytes>> {
    let (rest, len) = try_parse!(input, be_i32);

    if len == -1 {
        return IResult::Done(rest, None);
    }
    if len < 0 {
        return IResult::Error(ErrorKind::Custom(ParseTag::BytesLen as u32));
    }

    let len = len as usize;

    if rest.len() < len {
        return IResult::Incomplete(Needed::Size(len - rest.len()));
    }

    IResult::Done(&rest[len..], Some(Bytes::from(&rest[..len])))
}

/// Reads the i16 error code that sits next to a response entry.
pub fn parse_error_code(input: &[u8]) -> IResult<&[u8], Option<KafkaCode>> {
    map!(input, be_i16, KafkaCode::from_wire)
}

/// Pulls one length-prefixed frame off a stream. The i32 prefix excludes
/// its own 4 bytes; the returned buffer is the frame body.
pub fn read_frame<R: Read>(r: &mut R) -> Result<Vec<u8>> {
    let size = r.read_i32::<BigEndian>()?;

    if size < 0 {
        bail!(::errors::ErrorKind::Malformed("frame size"));
    }

    let mut frame = vec![0; size as usize];

    r.read_exact(&mut frame)?;

    Ok(frame)
}

/// Runs a body parser over a complete frame and lifts parse failures into
/// codec errors, tagging plain grammar violations with the frame name.
pub fn decode<T, P>(frame: &[u8], parser: P, what: &'static str) -> Result<T>
    where P: Fn(&[u8]) -> IResult<&[u8], T>
{
    match parser(frame) {
        IResult::Done(_, parsed) => Ok(parsed),
        IResult::Error(ErrorKind::Custom(tag)) => {
            Err(match tag {
                    t if t == ParseTag::MessageCrc as u32 => ::errors::ErrorKind::CrcMismatch,
                    t if t == ParseTag::Compression as u32 => {
                        ::errors::ErrorKind::UnknownCompression
                    }
                    t if t == ParseTag::Decompress as u32 => {
                        ::errors::ErrorKind::DecompressionFailed
                    }
                    _ => ::errors::ErrorKind::Malformed(what),
                }
                .into())
        }
        IResult::Error(_) |
        IResult::Incomplete(_) => {
            trace!("malformed {} frame:\n{}",
                   what,
                   HexViewBuilder::new(frame).row_width(16).finish());

            bail!(::errors::ErrorKind::Malformed(what))
        }
    }
}
