use std::io::Read;

use bytes::{BufMut, ByteOrder, BytesMut};

use nom::{be_i32, be_i64};

use errors::{KafkaCode, Result};
use protocol::{Encodable, Frame, Offset, PartitionId, RequestHeader, ResponseHeader, WriteExt,
               decode, parse_error_code, parse_request_header, parse_response_header,
               parse_string, read_frame};

/// Fetches the last committed offsets of a group.
#[derive(Clone, Debug, PartialEq)]
pub struct OffsetFetchRequest {
    pub header: RequestHeader,
    pub group_id: String,
    pub topics: Vec<OffsetFetchTopic>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetFetchTopic {
    pub topic_name: String,
    pub partitions: Vec<PartitionId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetFetchResponse {
    pub header: ResponseHeader,
    pub topics: Vec<OffsetFetchTopicStatus>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetFetchTopicStatus {
    pub topic_name: String,
    pub partitions: Vec<OffsetFetchPartitionStatus>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetFetchPartitionStatus {
    pub partition: PartitionId,
    pub offset: Offset,
    pub metadata: String,
    pub error: Option<KafkaCode>,
}

impl Encodable for OffsetFetchRequest {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_str::<T, _>(Some(&self.group_id))?;
        dst.put_array::<T, _, _>(&self.topics, |buf, topic| {
            buf.put_str::<T, _>(Some(&topic.topic_name))?;
            buf.put_array::<T, _, _>(&topic.partitions,
                                      |buf, partition| Ok(buf.put_i32::<T>(*partition)))
        })
    }
}

impl Frame for OffsetFetchRequest {}

impl Encodable for OffsetFetchResponse {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_array::<T, _, _>(&self.topics, |buf, topic| {
            buf.put_str::<T, _>(Some(&topic.topic_name))?;
            buf.put_array::<T, _, _>(&topic.partitions, |buf, partition| {
                buf.put_i32::<T>(partition.partition);
                buf.put_i64::<T>(partition.offset);
                buf.put_str::<T, _>(Some(&partition.metadata))?;
                buf.put_i16::<T>(KafkaCode::to_wire(&partition.error));
                Ok(())
            })
        })
    }
}

impl Frame for OffsetFetchResponse {}

named!(pub parse_offset_fetch_request<OffsetFetchRequest>,
    do_parse!(
        header: parse_request_header
     >> group_id: parse_string
     >> topics: parse_array!(parse_offset_fetch_topic)
     >> (OffsetFetchRequest {
            header: header,
            group_id: group_id,
            topics: topics,
        })
    )
);

named!(parse_offset_fetch_topic<OffsetFetchTopic>,
    do_parse!(
        topic_name: parse_string
     >> partitions: parse_array!(be_i32)
     >> (OffsetFetchTopic {
            topic_name: topic_name,
            partitions: partitions,
        })
    )
);

named!(pub parse_offset_fetch_response<OffsetFetchResponse>,
    do_parse!(
        header: parse_response_header
     >> topics: parse_array!(parse_offset_fetch_topic_status)
     >> (OffsetFetchResponse {
            header: header,
            topics: topics,
        })
    )
);

named!(parse_offset_fetch_topic_status<OffsetFetchTopicStatus>,
    do_parse!(
        topic_name: parse_string
     >> partitions: parse_array!(parse_offset_fetch_partition_status)
     >> (OffsetFetchTopicStatus {
            topic_name: topic_name,
            partitions: partitions,
        })
    )
);

named!(parse_offset_fetch_partition_status<OffsetFetchPartitionStatus>,
    do_parse!(
        partition: be_i32
     >> offset: be_i64
     >> metadata: parse_string
     >> error: parse_error_code
     >> (OffsetFetchPartitionStatus {
            partition: partition,
            offset: offset,
            metadata: metadata,
            error: error,
        })
    )
);

pub fn read_offset_fetch_request<R: Read>(r: &mut R) -> Result<OffsetFetchRequest> {
    let frame = read_frame(r)?;

    decode(&frame, parse_offset_fetch_request, "OffsetFetchRequest")
}

pub fn read_offset_fetch_response<R: Read>(r: &mut R) -> Result<OffsetFetchResponse> {
    let frame = read_frame(r)?;

    decode(&frame, parse_offset_fetch_response, "OffsetFetchResponse")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use errors::KafkaCode;
    use protocol::{ApiKeys, RequestHeader, testutil};

    #[test]
    fn test_offset_fetch_request() {
        let req = OffsetFetchRequest {
            header: RequestHeader::new(ApiKeys::OffsetFetch, 66, "cli"),
            group_id: "g".to_owned(),
            topics: vec![OffsetFetchTopic {
                             topic_name: "t".to_owned(),
                             partitions: vec![0, 1],
                         }],
        };

        let buf = testutil::serialized(&req);

        assert_eq!(&buf[..],
                   &[0x0, 0x0, 0x0, 0x23, 0x0, 0x9, 0x0, 0x0, 0x0, 0x0, 0x0, 0x42, 0x0, 0x3,
                     b'c', b'l', b'i', 0x0, 0x1, b'g', 0x0, 0x0, 0x0, 0x1, 0x0, 0x1, b't', 0x0,
                     0x0, 0x0, 0x2, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x1][..]);

        assert_eq!(read_offset_fetch_request(&mut Cursor::new(&buf[..])).unwrap(), req);
    }

    #[test]
    fn test_offset_fetch_response_round_trip() {
        let resp = OffsetFetchResponse {
            header: ResponseHeader { correlation_id: 66 },
            topics: vec![OffsetFetchTopicStatus {
                             topic_name: "t".to_owned(),
                             partitions:
                                 vec![OffsetFetchPartitionStatus {
                                          partition: 0,
                                          offset: 42,
                                          metadata: "done".to_owned(),
                                          error: None,
                                      },
                                      OffsetFetchPartitionStatus {
                                          partition: 1,
                                          offset: -1,
                                          metadata: String::new(),
                                          error: Some(KafkaCode::NotCoordinatorForConsumer),
                                      }],
                         }],
        };

        let buf = testutil::serialized(&resp);

        assert_eq!(read_offset_fetch_response(&mut Cursor::new(&buf[..])).unwrap(), resp);
    }
}
