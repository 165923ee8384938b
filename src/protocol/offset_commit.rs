use std::io::Read;

use bytes::{BufMut, ByteOrder, BytesMut};

use nom::{be_i32, be_i64};

use errors::{KafkaCode, Result};
use protocol::{Encodable, Frame, Offset, PartitionId, RequestHeader, ResponseHeader, WriteExt,
               decode, parse_error_code, parse_request_header, parse_response_header,
               parse_string, read_frame};

/// Commits consumed offsets for a group.
#[derive(Clone, Debug, PartialEq)]
pub struct OffsetCommitRequest {
    pub header: RequestHeader,
    pub group_id: String,
    pub topics: Vec<OffsetCommitTopic>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetCommitTopic {
    pub topic_name: String,
    pub partitions: Vec<OffsetCommitPartition>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetCommitPartition {
    pub partition: PartitionId,
    pub offset: Offset,
    /// Free-form annotation stored next to the offset; comes back as the
    /// empty string when the broker sends the null marker.
    pub metadata: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetCommitResponse {
    pub header: ResponseHeader,
    pub topics: Vec<OffsetCommitTopicStatus>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetCommitTopicStatus {
    pub topic_name: String,
    pub partitions: Vec<OffsetCommitPartitionStatus>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetCommitPartitionStatus {
    pub partition: PartitionId,
    pub error: Option<KafkaCode>,
}

impl Encodable for OffsetCommitRequest {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_str::<T, _>(Some(&self.group_id))?;
        dst.put_array::<T, _, _>(&self.topics, |buf, topic| {
            buf.put_str::<T, _>(Some(&topic.topic_name))?;
            buf.put_array::<T, _, _>(&topic.partitions, |buf, partition| {
                buf.put_i32::<T>(partition.partition);
                buf.put_i64::<T>(partition.offset);
                buf.put_str::<T, _>(Some(&partition.metadata))
            })
        })
    }
}

impl Frame for OffsetCommitRequest {}

impl Encodable for OffsetCommitResponse {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_array::<T, _, _>(&self.topics, |buf, topic| {
            buf.put_str::<T, _>(Some(&topic.topic_name))?;
            buf.put_array::<T, _, _>(&topic.partitions, |buf, partition| {
                buf.put_i32::<T>(partition.partition);
                buf.put_i16::<T>(KafkaCode::to_wire(&partition.error));
                Ok(())
            })
        })
    }
}

impl Frame for OffsetCommitResponse {}

named!(pub parse_offset_commit_request<OffsetCommitRequest>,
    do_parse!(
        header: parse_request_header
     >> group_id: parse_string
     >> topics: parse_array!(parse_offset_commit_topic)
     >> (OffsetCommitRequest {
            header: header,
            group_id: group_id,
            topics: topics,
        })
    )
);

named!(parse_offset_commit_topic<OffsetCommitTopic>,
    do_parse!(
        topic_name: parse_string
     >> partitions: parse_array!(parse_offset_commit_partition)
     >> (OffsetCommitTopic {
            topic_name: topic_name,
            partitions: partitions,
        })
    )
);

named!(parse_offset_commit_partition<OffsetCommitPartition>,
    do_parse!(
        partition: be_i32
     >> offset: be_i64
     >> metadata: parse_string
     >> (OffsetCommitPartition {
            partition: partition,
            offset: offset,
            metadata: metadata,
        })
    )
);

named!(pub parse_offset_commit_response<OffsetCommitResponse>,
    do_parse!(
        header: parse_response_header
     >> topics: parse_array!(parse_offset_commit_topic_status)
     >> (OffsetCommitResponse {
            header: header,
            topics: topics,
        })
    )
);

named!(parse_offset_commit_topic_status<OffsetCommitTopicStatus>,
    do_parse!(
        topic_name: parse_string
     >> partitions: parse_array!(parse_offset_commit_partition_status)
     >> (OffsetCommitTopicStatus {
            topic_name: topic_name,
            partitions: partitions,
        })
    )
);

named!(parse_offset_commit_partition_status<OffsetCommitPartitionStatus>,
    do_parse!(
        partition: be_i32
     >> error: parse_error_code
     >> (OffsetCommitPartitionStatus {
            partition: partition,
            error: error,
        })
    )
);

pub fn read_offset_commit_request<R: Read>(r: &mut R) -> Result<OffsetCommitRequest> {
    let frame = read_frame(r)?;

    decode(&frame, parse_offset_commit_request, "OffsetCommitRequest")
}

pub fn read_offset_commit_response<R: Read>(r: &mut R) -> Result<OffsetCommitResponse> {
    let frame = read_frame(r)?;

    decode(&frame, parse_offset_commit_response, "OffsetCommitResponse")
}
