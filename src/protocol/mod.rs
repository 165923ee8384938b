#[macro_use]
mod parse;
mod encode;
mod header;
mod message;
mod metadata;
mod produce;
mod fetch;
mod offset;
mod offset_commit;
mod offset_fetch;
mod consumer_metadata;

pub use self::consumer_metadata::{ConsumerMetadataRequest, ConsumerMetadataResponse,
                                  parse_consumer_metadata_request,
                                  parse_consumer_metadata_response,
                                  read_consumer_metadata_request,
                                  read_consumer_metadata_response};
pub use self::encode::{Encodable, Frame, WriteExt};
pub use self::fetch::{FetchPartition, FetchRequest, FetchResponse, FetchTopic, PartitionData,
                      TopicData, parse_fetch_request, parse_fetch_response, read_fetch_request,
                      read_fetch_response};
pub use self::header::{RequestHeader, ResponseHeader, parse_request_header,
                       parse_response_header};
pub use self::message::{COMPRESSION_CODEC_MASK, Message, MessageSet, MessageSetEncoder,
                        parse_message_set};
pub use self::metadata::{BrokerMetadata, MetadataRequest, MetadataResponse, PartitionMetadata,
                         TopicMetadata, parse_metadata_request, parse_metadata_response,
                         read_metadata_request, read_metadata_response};
pub use self::offset::{OffsetPartition, OffsetRequest, OffsetResponse, OffsetTopic,
                       OffsetTopicStatus, PartitionOffsets, parse_offset_request,
                       parse_offset_response, read_offset_request, read_offset_response};
pub use self::offset_commit::{OffsetCommitPartition, OffsetCommitPartitionStatus,
                              OffsetCommitRequest, OffsetCommitResponse, OffsetCommitTopic,
                              OffsetCommitTopicStatus, parse_offset_commit_request,
                              parse_offset_commit_response, read_offset_commit_request,
                              read_offset_commit_response};
pub use self::offset_fetch::{OffsetFetchPartitionStatus, OffsetFetchRequest,
                             OffsetFetchResponse, OffsetFetchTopic, OffsetFetchTopicStatus,
                             parse_offset_fetch_request, parse_offset_fetch_response,
                             read_offset_fetch_request, read_offset_fetch_response};
pub use self::parse::{ParseTag, decode, parse_bytes, parse_error_code, parse_string, read_frame};
pub use self::produce::{ProducePartitionData, ProducePartitionStatus, ProduceRequest,
                        ProduceResponse, ProduceTopicData, ProduceTopicStatus,
                        parse_produce_request, parse_produce_response, read_produce_request,
                        read_produce_response};

/// The message offset within a partition log.
pub type Offset = i64;

/// The partition id within a topic.
pub type PartitionId = i32;

/// The numeric code identifying an API.
pub type ApiKey = i16;

/// The version of an API.
pub type ApiVersion = i16;

/// An opaque request id echoed back by the broker.
pub type CorrelationId = i32;

/// A timestamp in milliseconds.
pub type Timestamp = i64;

/// The numeric error code reported inside a response payload.
pub type ErrorCode = i16;

/// The following are the numeric codes that the ApiKey in the request can take for each of the below request types.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(i16)]
pub enum ApiKeys {
    Produce = 0,
    Fetch = 1,
    Offsets = 2,
    Metadata = 3,
    LeaderAndIsr = 4,
    StopReplica = 5,
    UpdateMetadata = 6,
    ControlledShutdown = 7,
    OffsetCommit = 8,
    OffsetFetch = 9,
    ConsumerMetadata = 10,
}

/// Possible choices on acknowledgement requirements when
/// producing/sending messages to Kafka.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(i16)]
pub enum RequiredAcks {
    /// Indicates to the receiving Kafka broker not to acknowlegde
    /// messages sent to it at all. Sending messages with this
    /// acknowledgement requirement translates into a fire-and-forget
    /// scenario which - of course - is very fast but not reliable.
    None = 0,
    /// Requires the receiving Kafka broker to wait until the sent
    /// messages are written to local disk. Such messages can be
    /// regarded as acknowledged by one broker in the cluster.
    Leader = 1,
    /// Requires the sent messages to be acknowledged by all in-sync
    /// replicas of the targeted topic partitions.
    All = -1,
}

impl RequiredAcks {
    /// Resolves the wire form; anything but the three defined levels is
    /// malformed.
    pub fn from_code(code: i16) -> Option<RequiredAcks> {
        match code {
            0 => Some(RequiredAcks::None),
            1 => Some(RequiredAcks::Leader),
            -1 => Some(RequiredAcks::All),
            _ => None,
        }
    }
}

/// Possible values for the `time` field of an offset request: a concrete
/// millisecond timestamp or one of the two sentinels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FetchOffset {
    /// The offset one past the last committed message (-1 on the wire).
    Latest,
    /// The first offset still present in the log (-2 on the wire).
    Earliest,
    /// The latest offset of messages appended before this timestamp.
    ByTime(Timestamp),
}

impl FetchOffset {
    pub fn from_value(value: i64) -> FetchOffset {
        match value {
            -1 => FetchOffset::Latest,
            -2 => FetchOffset::Earliest,
            time => FetchOffset::ByTime(time),
        }
    }

    pub fn value(&self) -> i64 {
        match *self {
            FetchOffset::Latest => -1,
            FetchOffset::Earliest => -2,
            FetchOffset::ByTime(time) => time,
        }
    }
}
