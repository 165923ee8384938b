use std::io::Read;

use bytes::{BufMut, ByteOrder, BytesMut};

use nom::{be_i16, be_i32, be_i64};

use compression::Compression;
use errors::{KafkaCode, Result};
use protocol::{Encodable, Frame, MessageSet, MessageSetEncoder, Offset, PartitionId,
               RequestHeader, RequiredAcks, ResponseHeader, WriteExt, decode, parse_error_code,
               parse_message_set, parse_request_header, parse_response_header, parse_string,
               read_frame};

#[derive(Clone, Debug, PartialEq)]
pub struct ProduceRequest {
    pub header: RequestHeader,
    /// The durability level the broker must reach before answering.
    pub required_acks: RequiredAcks,
    /// Maximum time in milliseconds the broker may block waiting for the
    /// required acknowledgements.
    pub ack_timeout: i32,
    /// Applied to the partition message sets during serialization. The
    /// codec is never on the wire in request form, so a decoded request
    /// always reports `None`; callers who re-encode must set it back.
    pub compression: Compression,
    pub topics: Vec<ProduceTopicData>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProduceTopicData {
    pub topic_name: String,
    pub partitions: Vec<ProducePartitionData>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProducePartitionData {
    pub partition: PartitionId,
    pub message_set: MessageSet,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProduceResponse {
    pub header: ResponseHeader,
    pub topics: Vec<ProduceTopicStatus>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProduceTopicStatus {
    pub topic_name: String,
    pub partitions: Vec<ProducePartitionStatus>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProducePartitionStatus {
    pub partition: PartitionId,
    pub error: Option<KafkaCode>,
    /// Offset assigned to the first message of the appended set.
    pub offset: Offset,
}

impl Encodable for ProduceRequest {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_i16::<T>(self.required_acks as i16);
        dst.put_i32::<T>(self.ack_timeout);

        let encoder = MessageSetEncoder::new(self.compression);

        dst.put_array::<T, _, _>(&self.topics, |buf, topic| {
            buf.put_str::<T, _>(Some(&topic.topic_name))?;
            buf.put_array::<T, _, _>(&topic.partitions, |buf, partition| {
                buf.put_i32::<T>(partition.partition);

                let size_off = buf.len();
                buf.put_i32::<T>(0);
                encoder.encode::<T>(&partition.message_set, buf)?;

                let size = (buf.len() - size_off - 4) as i32;
                T::write_i32(&mut buf[size_off..], size);

                Ok(())
            })
        })
    }
}

impl Frame for ProduceRequest {}

impl Encodable for ProduceResponse {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_array::<T, _, _>(&self.topics, |buf, topic| {
            buf.put_str::<T, _>(Some(&topic.topic_name))?;
            buf.put_array::<T, _, _>(&topic.partitions, |buf, partition| {
                buf.put_i32::<T>(partition.partition);
                buf.put_i16::<T>(KafkaCode::to_wire(&partition.error));
                buf.put_i64::<T>(partition.offset);
                Ok(())
            })
        })
    }
}

impl Frame for ProduceResponse {}

named!(pub parse_produce_request<ProduceRequest>,
    do_parse!(
        header: parse_request_header
     >> required_acks: map_opt!(be_i16, RequiredAcks::from_code)
     >> ack_timeout: be_i32
     >> topics: parse_array!(parse_produce_topic_data)
     >> (ProduceRequest {
            header: header,
            required_acks: required_acks,
            ack_timeout: ack_timeout,
            compression: Compression::None,
            topics: topics,
        })
    )
);

named!(parse_produce_topic_data<ProduceTopicData>,
    do_parse!(
        topic_name: parse_string
     >> partitions: parse_array!(parse_produce_partition_data)
     >> (ProduceTopicData {
            topic_name: topic_name,
            partitions: partitions,
        })
    )
);

named!(parse_produce_partition_data<ProducePartitionData>,
    do_parse!(
        partition: be_i32
     >> message_set: length_value!(be_i32, parse_message_set)
     >> (ProducePartitionData {
            partition: partition,
            message_set: message_set,
        })
    )
);

named!(pub parse_produce_response<ProduceResponse>,
    do_parse!(
        header: parse_response_header
     >> topics: parse_array!(parse_produce_topic_status)
     >> (ProduceResponse {
            header: header,
            topics: topics,
        })
    )
);

named!(parse_produce_topic_status<ProduceTopicStatus>,
    do_parse!(
        topic_name: parse_string
     >> partitions: parse_array!(parse_produce_partition_status)
     >> (ProduceTopicStatus {
            topic_name: topic_name,
            partitions: partitions,
        })
    )
);

named!(parse_produce_partition_status<ProducePartitionStatus>,
    do_parse!(
        partition: be_i32
     >> error: parse_error_code
     >> offset: be_i64
     >> (ProducePartitionStatus {
            partition: partition,
            error: error,
            offset: offset,
        })
    )
);

pub fn read_produce_request<R: Read>(r: &mut R) -> Result<ProduceRequest> {
    let frame = read_frame(r)?;

    decode(&frame, parse_produce_request, "ProduceRequest")
}

pub fn read_produce_response<R: Read>(r: &mut R) -> Result<ProduceResponse> {
    let frame = read_frame(r)?;

    decode(&frame, parse_produce_response, "ProduceResponse")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::Bytes;

    use super::*;
    use errors::KafkaCode;
    use protocol::{ApiKeys, Message, RequestHeader, testutil};

    fn produce_request(compression: Compression) -> ProduceRequest {
        ProduceRequest {
            header: RequestHeader::new(ApiKeys::Produce, 241, "test"),
            required_acks: RequiredAcks::All,
            ack_timeout: 1000,
            compression: compression,
            topics: vec![ProduceTopicData {
                             topic_name: "foo".to_owned(),
                             partitions: vec![ProducePartitionData {
                                                  partition: 0,
                                                  message_set: MessageSet {
                                                      messages: vec![Message {
                                                          offset: 0,
                                                          crc: 0xb8ba5f57,
                                                          key: Some(Bytes::from(&b"foo"[..])),
                                                          value: Some(Bytes::from(&b"bar"[..])),
                                                          ..Default::default()
                                                      }],
                                                  },
                                              }],
                         }],
        }
    }

    lazy_static!{
        static ref UNCOMPRESSED_REQUEST: Vec<u8> = vec![
            0x0, 0x0, 0x0, 0x49, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0xf1, 0x0, 0x4, 0x74, 0x65,
            0x73, 0x74, 0xff, 0xff, 0x0, 0x0, 0x3, 0xe8, 0x0, 0x0, 0x0, 0x1, 0x0, 0x3, 0x66, 0x6f,
            0x6f, 0x0, 0x0, 0x0, 0x1, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x20, 0x0, 0x0, 0x0, 0x0,
            0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x14, 0xb8, 0xba, 0x5f, 0x57, 0x0, 0x0, 0x0, 0x0,
            0x0, 0x3, 0x66, 0x6f, 0x6f, 0x0, 0x0, 0x0, 0x3, 0x62, 0x61, 0x72];

        // serialized by a foreign producer with gzip compression
        static ref GZIP_REQUEST: Vec<u8> = vec![
            0x0, 0x0, 0x0, 0x6d, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0xf1, 0x0, 0x4, 0x74, 0x65,
            0x73, 0x74, 0xff, 0xff, 0x0, 0x0, 0x3, 0xe8, 0x0, 0x0, 0x0, 0x1, 0x0, 0x3, 0x66, 0x6f,
            0x6f, 0x0, 0x0, 0x0, 0x1, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x44, 0x0, 0x0, 0x0, 0x0,
            0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x38, 0x9d, 0x81, 0x74, 0xc4, 0x0, 0x1, 0xff, 0xff,
            0xff, 0xff, 0x0, 0x0, 0x0, 0x2a, 0x1f, 0x8b, 0x8, 0x0, 0x0, 0x9, 0x6e, 0x88, 0x0,
            0xff, 0x62, 0x40, 0x0, 0x91, 0x1d, 0xbb, 0xe2, 0xc3, 0xc1, 0x2c, 0xe6, 0xb4, 0xfc,
            0x7c, 0x10, 0x95, 0x94, 0x58, 0x4, 0x8, 0x0, 0x0, 0xff, 0xff, 0xa0, 0xbc, 0x10, 0xc2,
            0x20, 0x0, 0x0, 0x0];

        // serialized by a foreign producer with snappy compression
        static ref SNAPPY_REQUEST: Vec<u8> = vec![
            0x0, 0x0, 0x0, 0x5c, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0xf1, 0x0, 0x4, 0x74, 0x65,
            0x73, 0x74, 0xff, 0xff, 0x0, 0x0, 0x3, 0xe8, 0x0, 0x0, 0x0, 0x1, 0x0, 0x3, 0x66, 0x6f,
            0x6f, 0x0, 0x0, 0x0, 0x1, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x33, 0x0, 0x0, 0x0, 0x0,
            0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x27, 0x2e, 0xd4, 0xed, 0xcd, 0x0, 0x2, 0xff, 0xff,
            0xff, 0xff, 0x0, 0x0, 0x0, 0x19, 0x20, 0x0, 0x0, 0x19, 0x1, 0x10, 0x14, 0xb8, 0xba,
            0x5f, 0x57, 0x5, 0xf, 0x28, 0x3, 0x66, 0x6f, 0x6f, 0x0, 0x0, 0x0, 0x3, 0x62, 0x61,
            0x72];

        static ref ERROR_RESPONSE: Vec<u8> = vec![
            0x0, 0x0, 0x0, 0x22, 0x0, 0x0, 0x0, 0xf1, 0x0, 0x0, 0x0, 0x1, 0x0, 0x6, 0x66, 0x72,
            0x75, 0x69, 0x74, 0x73, 0x0, 0x0, 0x0, 0x1, 0x0, 0x0, 0x0, 0x5d, 0x0, 0x3, 0xff, 0xff,
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff];

        static ref OK_RESPONSE: Vec<u8> = vec![
            0x0, 0x0, 0x0, 0x1f, 0x0, 0x0, 0x0, 0xf1, 0x0, 0x0, 0x0, 0x1, 0x0, 0x3, 0x66, 0x6f,
            0x6f, 0x0, 0x0, 0x0, 0x1, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0,
            0x0, 0x1];
    }

    #[test]
    fn test_uncompressed_request() {
        let req = produce_request(Compression::None);

        let buf = testutil::serialized(&req);

        assert_eq!(&buf[..], &UNCOMPRESSED_REQUEST[..]);
        assert_eq!(read_produce_request(&mut Cursor::new(&buf[..])).unwrap(), req);
    }

    #[test]
    fn test_compressed_request_round_trip() {
        for &compression in &[Compression::Gzip, Compression::Snappy] {
            let req = produce_request(compression);

            let buf = testutil::serialized(&req);

            // the codec is not carried on the wire; a decoded request
            // always reports None
            let decoded = read_produce_request(&mut Cursor::new(&buf[..])).unwrap();
            assert_eq!(decoded, produce_request(Compression::None));
        }
    }

    #[test]
    fn test_foreign_compressed_request() {
        for fixture in &[&GZIP_REQUEST[..], &SNAPPY_REQUEST[..]] {
            let decoded = read_produce_request(&mut Cursor::new(*fixture)).unwrap();

            assert_eq!(decoded, produce_request(Compression::None));
        }
    }

    #[test]
    fn test_error_response() {
        let resp = read_produce_response(&mut Cursor::new(&ERROR_RESPONSE[..])).unwrap();

        assert_eq!(resp,
                   ProduceResponse {
                       header: ResponseHeader { correlation_id: 241 },
                       topics: vec![ProduceTopicStatus {
                                        topic_name: "fruits".to_owned(),
                                        partitions:
                                            vec![ProducePartitionStatus {
                                                     partition: 93,
                                                     error:
                                                         Some(KafkaCode::UnknownTopicOrPartition),
                                                     offset: -1,
                                                 }],
                                    }],
                   });

        assert_eq!(&testutil::serialized(&resp)[..], &ERROR_RESPONSE[..]);
    }

    #[test]
    fn test_ok_response() {
        let resp = read_produce_response(&mut Cursor::new(&OK_RESPONSE[..])).unwrap();

        assert_eq!(resp,
                   ProduceResponse {
                       header: ResponseHeader { correlation_id: 241 },
                       topics: vec![ProduceTopicStatus {
                                        topic_name: "foo".to_owned(),
                                        partitions: vec![ProducePartitionStatus {
                                                             partition: 0,
                                                             error: None,
                                                             offset: 1,
                                                         }],
                                    }],
                   });

        assert_eq!(&testutil::serialized(&resp)[..], &OK_RESPONSE[..]);
    }
}
