use std::io::Read;

use bytes::{BufMut, ByteOrder, BytesMut};

use nom::be_i32;

use errors::{KafkaCode, Result};
use protocol::{Encodable, Frame, PartitionId, RequestHeader, ResponseHeader, WriteExt, decode,
               parse_error_code, parse_request_header, parse_response_header, parse_string,
               read_frame};

/// Asks a broker for the cluster layout. An empty topic list means
/// "all topics".
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataRequest {
    pub header: RequestHeader,
    pub topics: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetadataResponse {
    pub header: ResponseHeader,
    pub brokers: Vec<BrokerMetadata>,
    pub topics: Vec<TopicMetadata>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BrokerMetadata {
    pub node_id: i32,
    pub host: String,
    pub port: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TopicMetadata {
    pub error: Option<KafkaCode>,
    pub topic_name: String,
    pub partitions: Vec<PartitionMetadata>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PartitionMetadata {
    pub error: Option<KafkaCode>,
    pub partition: PartitionId,
    pub leader: i32,
    pub replicas: Vec<i32>,
    pub isrs: Vec<i32>,
}

impl Encodable for MetadataRequest {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_array::<T, _, _>(&self.topics, |buf, topic| buf.put_str::<T, _>(Some(topic)))
    }
}

impl Frame for MetadataRequest {}

impl Encodable for MetadataResponse {
    fn encode<T: ByteOrder>(&self, dst: &mut BytesMut) -> Result<()> {
        self.header.encode::<T>(dst)?;

        dst.put_array::<T, _, _>(&self.brokers, |buf, broker| {
                buf.put_i32::<T>(broker.node_id);
                buf.put_str::<T, _>(Some(&broker.host))?;
                buf.put_i32::<T>(broker.port);
                Ok(())
            })?;

        dst.put_array::<T, _, _>(&self.topics, |buf, topic| {
            buf.put_i16::<T>(KafkaCode::to_wire(&topic.error));
            buf.put_str::<T, _>(Some(&topic.topic_name))?;
            buf.put_array::<T, _, _>(&topic.partitions, |buf, partition| {
                buf.put_i16::<T>(KafkaCode::to_wire(&partition.error));
                buf.put_i32::<T>(partition.partition);
                buf.put_i32::<T>(partition.leader);
                buf.put_array::<T, _, _>(&partition.replicas,
                                          |buf, replica| Ok(buf.put_i32::<T>(*replica)))?;
                buf.put_array::<T, _, _>(&partition.isrs, |buf, isr| Ok(buf.put_i32::<T>(*isr)))
            })
        })
    }
}

impl Frame for MetadataResponse {}

named!(pub parse_metadata_request<MetadataRequest>,
    do_parse!(
        header: parse_request_header
     >> topics: parse_array!(parse_string)
     >> (MetadataRequest {
            header: header,
            topics: topics,
        })
    )
);

named!(pub parse_metadata_response<MetadataResponse>,
    do_parse!(
        header: parse_response_header
     >> brokers: parse_array!(parse_broker_metadata)
     >> topics: parse_array!(parse_topic_metadata)
     >> (MetadataResponse {
            header: header,
            brokers: brokers,
            topics: topics,
        })
    )
);

named!(parse_broker_metadata<BrokerMetadata>,
    do_parse!(
        node_id: be_i32
     >> host: parse_string
     >> port: be_i32
     >> (BrokerMetadata {
            node_id: node_id,
            host: host,
            port: port,
        })
    )
);

named!(parse_topic_metadata<TopicMetadata>,
    do_parse!(
        error: parse_error_code
     >> topic_name: parse_string
     >> partitions: parse_array!(parse_partition_metadata)
     >> (TopicMetadata {
            error: error,
            topic_name: topic_name,
            partitions: partitions,
        })
    )
);

named!(parse_partition_metadata<PartitionMetadata>,
    do_parse!(
        error: parse_error_code
     >> partition: be_i32
     >> leader: be_i32
     >> replicas: parse_array!(be_i32)
     >> isrs: parse_array!(be_i32)
     >> (PartitionMetadata {
            error: error,
            partition: partition,
            leader: leader,
            replicas: replicas,
            isrs: isrs,
        })
    )
);

pub fn read_metadata_request<R: Read>(r: &mut R) -> Result<MetadataRequest> {
    let frame = read_frame(r)?;

    decode(&frame, parse_metadata_request, "MetadataRequest")
}

pub fn read_metadata_response<R: Read>(r: &mut R) -> Result<MetadataResponse> {
    let frame = read_frame(r)?;

    decode(&frame, parse_metadata_response, "MetadataResponse")
}
