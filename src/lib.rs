#![recursion_limit = "128"]

#[macro_use]
extern crate log;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate nom;
extern crate byteorder;
extern crate bytes;
extern crate crc;
extern crate flate2;
extern crate hexplay;
extern crate snap;

#[cfg(test)]
#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod errors;
mod compression;
#[macro_use]
mod protocol;

pub use compression::Compression;
pub use errors::{Error, ErrorKind, KafkaCode, Result};
pub use protocol::{ApiKey, ApiKeys, ApiVersion, BrokerMetadata, COMPRESSION_CODEC_MASK,
                   ConsumerMetadataRequest, ConsumerMetadataResponse, CorrelationId, Encodable,
                   ErrorCode, FetchOffset, FetchPartition, FetchRequest, FetchResponse,
                   FetchTopic, Frame, Message, MessageSet, MessageSetEncoder, MetadataRequest,
                   MetadataResponse, Offset, OffsetCommitPartition, OffsetCommitPartitionStatus,
                   OffsetCommitRequest, OffsetCommitResponse, OffsetCommitTopic,
                   OffsetCommitTopicStatus, OffsetFetchPartitionStatus, OffsetFetchRequest,
                   OffsetFetchResponse, OffsetFetchTopic, OffsetFetchTopicStatus,
                   OffsetPartition, OffsetRequest, OffsetResponse, OffsetTopic,
                   OffsetTopicStatus, PartitionData, PartitionId, PartitionMetadata,
                   PartitionOffsets, ProducePartitionData, ProducePartitionStatus,
                   ProduceRequest, ProduceResponse, ProduceTopicData, ProduceTopicStatus,
                   RequestHeader, RequiredAcks, ResponseHeader, Timestamp, TopicData,
                   TopicMetadata, WriteExt, parse_consumer_metadata_request,
                   parse_consumer_metadata_response, parse_fetch_request, parse_fetch_response,
                   parse_message_set, parse_metadata_request, parse_metadata_response,
                   parse_offset_commit_request, parse_offset_commit_response,
                   parse_offset_fetch_request, parse_offset_fetch_response, parse_offset_request,
                   parse_offset_response, parse_produce_request, parse_produce_response,
                   read_consumer_metadata_request, read_consumer_metadata_response,
                   read_fetch_request, read_fetch_response, read_frame, read_metadata_request,
                   read_metadata_response, read_offset_commit_request,
                   read_offset_commit_response, read_offset_fetch_request,
                   read_offset_fetch_response, read_offset_request, read_offset_response,
                   read_produce_request, read_produce_response};
