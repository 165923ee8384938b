use std::io::Read;

use bytes::{BufMut, ByteOrder, BytesMut};

use nom::{be_i32, be_i64};

use errors::{KafkaCode, Result};
use protocol::{Encodable, Frame, MessageSet, Offset, PartitionId, RequestHeader, ResponseHeader,
               WriteExt, decode, parse_error_code, parse_message_set, parse_request_header,
               parse_response_header, parse_string, read_frame};

#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    pub header: RequestHeader,
    /// The replica id indicates the node id of the replica initiating this
    /// request. An ordinary client uses -1.
    pub replica_id: i32,
    /// The maximum amount of time in milliseconds to block waiting if
    /// insufficient data is available at the time the request is issued.
    pub max_wait_time: i32,
    /// This is the minimum number of bytes of messages that must be
    /// available to give a response.
    pub min_bytes: i32,
    pub topics: Vec<FetchTopic>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchTopic {
    /// The name of the topic.
    pub topic_name: String,
    pub partitions: Vec<FetchPartition>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchPartition {
    /// The id of the partition the fetch is for.
    pub partition: PartitionId,
    /// The offset to begin this fetch from.
    pub fetch_offset: Offset,
    /// The maximum bytes to include in the message set for this partition.
    pub max_bytes: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchResponse {
    pub header: ResponseHeader,
    pub topics: Vec<TopicData>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TopicData {
    /// The name of the topic this response entry is for.
    pub topic_name: String,
    pub partitions: Vec<PartitionData>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PartitionData {
    /// The id of the partition the fetch is for.
    pub partition: PartitionId,
    pub error: Option<KafkaCode>,
    /// The offset at the end of the log for this partition.
    pub highwater_mark_offset: Offset,
    pub message_set: MessageSet,
}

impl Encodable for FetchRequest {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_i32::<T>(self.replica_id);
        dst.put_i32::<T>(self.max_wait_time);
        dst.put_i32::<T>(self.min_bytes);
        dst.put_array::<T, _, _>(&self.topics, |buf, topic| {
            buf.put_str::<T, _>(Some(&topic.topic_name))?;
            buf.put_array::<T, _, _>(&topic.partitions, |buf, partition| {
                buf.put_i32::<T>(partition.partition);
                buf.put_i64::<T>(partition.fetch_offset);
                buf.put_i32::<T>(partition.max_bytes);
                Ok(())
            })
        })
    }
}

impl Frame for FetchRequest {}

impl Encodable for FetchResponse {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_array::<T, _, _>(&self.topics, |buf, topic| {
            buf.put_str::<T, _>(Some(&topic.topic_name))?;
            buf.put_array::<T, _, _>(&topic.partitions, |buf, partition| {
                buf.put_i32::<T>(partition.partition);
                buf.put_i16::<T>(KafkaCode::to_wire(&partition.error));
                buf.put_i64::<T>(partition.highwater_mark_offset);

                let size_off = buf.len();
                buf.put_i32::<T>(0);

                for message in &partition.message_set.messages {
                    message.encode::<T>(buf)?;
                }

                let size = (buf.len() - size_off - 4) as i32;
                T::write_i32(&mut buf[size_off..], size);

                Ok(())
            })
        })
    }
}

impl Frame for FetchResponse {}

named!(pub parse_fetch_request<FetchRequest>,
    do_parse!(
        header: parse_request_header
     >> replica_id: be_i32
     >> max_wait_time: be_i32
     >> min_bytes: be_i32
     >> topics: parse_array!(parse_fetch_topic)
     >> (FetchRequest {
            header: header,
            replica_id: replica_id,
            max_wait_time: max_wait_time,
            min_bytes: min_bytes,
            topics: topics,
        })
    )
);

named!(parse_fetch_topic<FetchTopic>,
    do_parse!(
        topic_name: parse_string
     >> partitions: parse_array!(parse_fetch_partition)
     >> (FetchTopic {
            topic_name: topic_name,
            partitions: partitions,
        })
    )
);

named!(parse_fetch_partition<FetchPartition>,
    do_parse!(
        partition: be_i32
     >> fetch_offset: be_i64
     >> max_bytes: be_i32
     >> (FetchPartition {
            partition: partition,
            fetch_offset: fetch_offset,
            max_bytes: max_bytes,
        })
    )
);

named!(parse_fetch_response_body<FetchResponse>,
    do_parse!(
        header: parse_response_header
     >> topics: parse_array!(parse_topic_data)
     >> (FetchResponse {
            header: header,
            topics: topics,
        })
    )
);

named!(parse_topic_data<TopicData>,
    do_parse!(
        topic_name: parse_string
     >> partitions: parse_array!(parse_partition_data)
     >> (TopicData {
            topic_name: topic_name,
            partitions: partitions,
        })
    )
);

named!(parse_partition_data<PartitionData>,
    do_parse!(
        partition: be_i32
     >> error: parse_error_code
     >> highwater_mark_offset: be_i64
     >> message_set: length_value!(be_i32, parse_message_set)
     >> (PartitionData {
            partition: partition,
            error: error,
            highwater_mark_offset: highwater_mark_offset,
            message_set: message_set,
        })
    )
);

/// Parses a fetch response, stamping every message with the topic,
/// partition and high-water mark of the partition it came out of.
pub fn parse_fetch_response(input: &[u8]) -> ::nom::IResult<&[u8], FetchResponse> {
    match parse_fetch_response_body(input) {
        ::nom::IResult::Done(remaining, mut response) => {
            for topic in &mut response.topics {
                for partition in &mut topic.partitions {
                    for message in &mut partition.message_set.messages {
                        message.topic = topic.topic_name.clone();
                        message.partition = partition.partition;
                        message.tip_offset = partition.highwater_mark_offset;
                    }
                }
            }

            ::nom::IResult::Done(remaining, response)
        }
        other => other,
    }
}

pub fn read_fetch_request<R: Read>(r: &mut R) -> Result<FetchRequest> {
    let frame = read_frame(r)?;

    decode(&frame, parse_fetch_request, "FetchRequest")
}

pub fn read_fetch_response<R: Read>(r: &mut R) -> Result<FetchResponse> {
    let frame = read_frame(r)?;

    decode(&frame, parse_fetch_response, "FetchResponse")
}
