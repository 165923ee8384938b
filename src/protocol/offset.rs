use std::io::Read;

use bytes::{BufMut, ByteOrder, BytesMut};

use nom::{be_i32, be_i64};

use errors::{KafkaCode, Result};
use protocol::{Encodable, FetchOffset, Frame, Offset, PartitionId, RequestHeader,
               ResponseHeader, WriteExt, decode, parse_error_code, parse_request_header,
               parse_response_header, parse_string, read_frame};

/// Asks a broker for the offsets around a point in time in a partition log.
#[derive(Clone, Debug, PartialEq)]
pub struct OffsetRequest {
    pub header: RequestHeader,
    pub replica_id: i32,
    pub topics: Vec<OffsetTopic>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetTopic {
    pub topic_name: String,
    pub partitions: Vec<OffsetPartition>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetPartition {
    pub partition: PartitionId,
    /// The point in time to look offsets up for: a millisecond timestamp,
    /// or one of the latest/earliest sentinels.
    pub time: FetchOffset,
    /// Maximum number of offsets the broker may return for this partition.
    pub max_number_of_offsets: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetResponse {
    pub header: ResponseHeader,
    pub topics: Vec<OffsetTopicStatus>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetTopicStatus {
    pub topic_name: String,
    pub partitions: Vec<PartitionOffsets>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PartitionOffsets {
    pub partition: PartitionId,
    pub error: Option<KafkaCode>,
    pub offsets: Vec<Offset>,
}

impl Encodable for OffsetRequest {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_i32::<T>(self.replica_id);
        dst.put_array::<T, _, _>(&self.topics, |buf, topic| {
            buf.put_str::<T, _>(Some(&topic.topic_name))?;
            buf.put_array::<T, _, _>(&topic.partitions, |buf, partition| {
                buf.put_i32::<T>(partition.partition);
                buf.put_i64::<T>(partition.time.value());
                buf.put_i32::<T>(partition.max_number_of_offsets);
                Ok(())
            })
        })
    }
}

impl Frame for OffsetRequest {}

impl Encodable for OffsetResponse {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_array::<T, _, _>(&self.topics, |buf, topic| {
            buf.put_str::<T, _>(Some(&topic.topic_name))?;
            buf.put_array::<T, _, _>(&topic.partitions, |buf, partition| {
                buf.put_i32::<T>(partition.partition);
                buf.put_i16::<T>(KafkaCode::to_wire(&partition.error));
                buf.put_array::<T, _, _>(&partition.offsets,
                                          |buf, offset| Ok(buf.put_i64::<T>(*offset)))
            })
        })
    }
}

impl Frame for OffsetResponse {}

named!(pub parse_offset_request<OffsetRequest>,
    do_parse!(
        header: parse_request_header
     >> replica_id: be_i32
     >> topics: parse_array!(parse_offset_topic)
     >> (OffsetRequest {
            header: header,
            replica_id: replica_id,
            topics: topics,
        })
    )
);

named!(parse_offset_topic<OffsetTopic>,
    do_parse!(
        topic_name: parse_string
     >> partitions: parse_array!(parse_offset_partition)
     >> (OffsetTopic {
            topic_name: topic_name,
            partitions: partitions,
        })
    )
);

named!(parse_offset_partition<OffsetPartition>,
    do_parse!(
        partition: be_i32
     >> time: map!(be_i64, FetchOffset::from_value)
     >> max_number_of_offsets: be_i32
     >> (OffsetPartition {
            partition: partition,
            time: time,
            max_number_of_offsets: max_number_of_offsets,
        })
    )
);

named!(pub parse_offset_response<OffsetResponse>,
    do_parse!(
        header: parse_response_header
     >> topics: parse_array!(parse_offset_topic_status)
     >> (OffsetResponse {
            header: header,
            topics: topics,
        })
    )
);

named!(parse_offset_topic_status<OffsetTopicStatus>,
    do_parse!(
        topic_name: parse_string
     >> partitions: parse_array!(parse_partition_offsets)
     >> (OffsetTopicStatus {
            topic_name: topic_name,
            partitions: partitions,
        })
    )
);

named!(parse_partition_offsets<PartitionOffsets>,
    do_parse!(
        partition: be_i32
     >> error: parse_error_code
     >> offsets: parse_array!(be_i64)
     >> (PartitionOffsets {
            partition: partition,
            error: error,
            offsets: offsets,
        })
    )
);

pub fn read_offset_request<R: Read>(r: &mut R) -> Result<OffsetRequest> {
    let frame = read_frame(r)?;

    decode(&frame, parse_offset_request, "OffsetRequest")
}

pub fn read_offset_response<R: Read>(r: &mut R) -> Result<OffsetResponse> {
    let frame = read_frame(r)?;

    decode(&frame, parse_offset_response, "OffsetResponse")
}
