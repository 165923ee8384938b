use bytes::{BufMut, ByteOrder, BytesMut};

use nom::{be_i16, be_i32};

use errors::Result;
use protocol::{ApiKey, ApiKeys, ApiVersion, CorrelationId, Encodable, WriteExt, parse_string};

/// Common header every request starts with.
///
/// A null client id is accepted on the wire and decodes as the empty
/// string; the encoder always writes a real (possibly empty) string.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestHeader {
    pub api_key: ApiKey,
    pub api_version: ApiVersion,
    /// An opaque id chosen by the client and echoed back by the broker to
    /// pair a response with its request.
    pub correlation_id: CorrelationId,
    pub client_id: String,
}

impl RequestHeader {
    pub fn new<S: Into<String>>(api_key: ApiKeys,
                                correlation_id: CorrelationId,
                                client_id: S)
                                -> Self {
        RequestHeader {
            api_key: api_key as ApiKey,
            api_version: match api_key {
                ApiKeys::Fetch => 1,
                _ => 0,
            },
            correlation_id: correlation_id,
            client_id: client_id.into(),
        }
    }
}

impl Encodable for RequestHeader {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_i16::<T>(self.api_key);
        dst.put_i16::<T>(self.api_version);
        dst.put_i32::<T>(self.correlation_id);
        dst.put_str::<T, _>(Some(&self.client_id))
    }
}

/// Common header every response starts with.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseHeader {
    pub correlation_id: CorrelationId,
}

impl Encodable for ResponseHeader {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_i32::<T>(self.correlation_id);

        Ok(())
    }
}

named!(pub parse_request_header<RequestHeader>,
    do_parse!(
        api_key: be_i16
     >> api_version: be_i16
     >> correlation_id: be_i32
     >> client_id: parse_string
     >> (RequestHeader {
            api_key: api_key,
            api_version: api_version,
            correlation_id: correlation_id,
            client_id: client_id,
        })
    )
);

named!(pub parse_response_header<ResponseHeader>,
    do_parse!(
        correlation_id: be_i32
     >> (ResponseHeader {
            correlation_id: correlation_id,
        })
    )
);

#[cfg(test)]
mod tests {
    use bytes::{BigEndian, BufMut, BytesMut};

    use nom::IResult;

    use super::*;
    use protocol::ApiKeys;

    #[test]
    fn test_request_header_wire_version() {
        assert_eq!(RequestHeader::new(ApiKeys::Metadata, 123, "testcli").api_version, 0);
        assert_eq!(RequestHeader::new(ApiKeys::Fetch, 123, "testcli").api_version, 1);
    }

    #[test]
    fn test_request_header_round_trip() {
        let header = RequestHeader::new(ApiKeys::Produce, 241, "test");

        let mut buf = BytesMut::with_capacity(32);
        header.encode::<BigEndian>(&mut buf).unwrap();

        assert_eq!(&buf[..], &[0, 0, 0, 0, 0, 0, 0, 241, 0, 4, b't', b'e', b's', b't'][..]);
        assert_eq!(parse_request_header(&buf),
                   IResult::Done(&b""[..], header));
    }

    #[test]
    fn test_null_client_id_reads_as_empty() {
        let mut buf = BytesMut::with_capacity(16);

        buf.put_i16::<BigEndian>(ApiKeys::Metadata as i16);
        buf.put_i16::<BigEndian>(0);
        buf.put_i32::<BigEndian>(123);
        buf.put_i16::<BigEndian>(-1);

        assert_eq!(parse_request_header(&buf),
                   IResult::Done(&b""[..],
                                 RequestHeader::new(ApiKeys::Metadata, 123, "")));
    }
}
