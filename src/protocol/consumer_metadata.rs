use std::io::Read;

use bytes::{BufMut, ByteOrder, BytesMut};

use nom::be_i32;

use errors::{KafkaCode, Result};
use protocol::{Encodable, Frame, RequestHeader, ResponseHeader, WriteExt, decode,
               parse_error_code, parse_request_header, parse_response_header, parse_string,
               read_frame};

/// Locates the coordinator broker of a consumer group.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsumerMetadataRequest {
    pub header: RequestHeader,
    pub group_id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConsumerMetadataResponse {
    pub header: ResponseHeader,
    pub error: Option<KafkaCode>,
    pub coordinator_id: i32,
    pub coordinator_host: String,
    pub coordinator_port: i32,
}

impl Encodable for ConsumerMetadataRequest {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_str::<T, _>(Some(&self.group_id))
    }
}

impl Frame for ConsumerMetadataRequest {}

impl Encodable for ConsumerMetadataResponse {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_i16::<T>(KafkaCode::to_wire(&self.error));
        dst.put_i32::<T>(self.coordinator_id);
        dst.put_str::<T, _>(Some(&self.coordinator_host))?;
        dst.put_i32::<T>(self.coordinator_port);

        Ok(())
    }
}

impl Frame for ConsumerMetadataResponse {}

named!(pub parse_consumer_metadata_request<ConsumerMetadataRequest>,
    do_parse!(
        header: parse_request_header
     >> group_id: parse_string
     >> (ConsumerMetadataRequest {
            header: header,
            group_id: group_id,
        })
    )
);

named!(pub parse_consumer_metadata_response<ConsumerMetadataResponse>,
    do_parse!(
        header: parse_response_header
     >> error: parse_error_code
     >> coordinator_id: be_i32
     >> coordinator_host: parse_string
     >> coordinator_port: be_i32
     >> (ConsumerMetadataResponse {
            header: header,
            error: error,
            coordinator_id: coordinator_id,
            coordinator_host: coordinator_host,
            coordinator_port: coordinator_port,
        })
    )
);

pub fn read_consumer_metadata_request<R: Read>(r: &mut R) -> Result<ConsumerMetadataRequest> {
    let frame = read_frame(r)?;

    decode(&frame, parse_consumer_metadata_request, "ConsumerMetadataRequest")
}

pub fn read_consumer_metadata_response<R: Read>(r: &mut R) -> Result<ConsumerMetadataResponse> {
    let frame = read_frame(r)?;

    decode(&frame, parse_consumer_metadata_response, "ConsumerMetadataResponse")
}
