use std::fmt;

/// Errors reported by a remote Kafka broker inside response payloads.
///
/// The broker uses numeric codes to indicate what problem occurred; a code
/// travels as an i16 next to the entry it refers to. Code 0 means no error
/// and is represented as the absent error (`None`) in decoded responses.
///
/// See also [Kafka Errors](http://kafka.apache.org/protocol.html)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KafkaCode {
    /// No error occurred.
    NoError,
    /// The server experienced an unexpected error when processing the request.
    Unknown,
    /// The requested offset is outside the range of offsets
    /// maintained by the server for the given topic/partition.
    OffsetOutOfRange,
    /// A message contents does not match its checksum.
    InvalidMessage,
    /// This request is for a topic or partition that does not exist
    /// on this broker.
    UnknownTopicOrPartition,
    /// The message has a negative size.
    InvalidMessageSize,
    /// The cluster is in the middle of a leadership election and there is
    /// currently no leader for this partition and hence it is unavailable
    /// for writes.
    LeaderNotAvailable,
    /// The client attempted to send messages to a replica that is not the
    /// leader for some partition. It indicates that the client's metadata
    /// is out of date.
    NotLeaderForPartition,
    /// The request exceeds the user-specified time limit in the request.
    RequestTimedOut,
    /// This is not a client facing error and is used mostly by tools
    /// when a broker is not alive.
    BrokerNotAvailable,
    /// A replica is expected on a broker, but is not (this can be
    /// safely ignored).
    ReplicaNotAvailable,
    /// The server has a configurable maximum message size to avoid
    /// unbounded memory allocation. This error is thrown if the client
    /// attempts to produce a message larger than this maximum.
    MessageSizeTooLarge,
    /// Internal error code for broker-to-broker communication.
    StaleControllerEpoch,
    /// The string supplied for offset metadata is larger than the
    /// configured maximum.
    OffsetMetadataTooLarge,
    /// The broker is still loading offsets after a leader change for the
    /// offsets topic partition.
    OffsetsLoadInProgress,
    /// The offsets topic has not yet been created, or the group
    /// coordinator is not active.
    ConsumerCoordinatorNotAvailable,
    /// The broker received an offset fetch or commit request for a group
    /// that it is not a coordinator for.
    NotCoordinatorForConsumer,
    /// A code this client does not recognize.
    UnknownError(i16),
}

impl KafkaCode {
    /// Looks up the code reported on the wire.
    pub fn from_code(code: i16) -> KafkaCode {
        match code {
            0 => KafkaCode::NoError,
            -1 => KafkaCode::Unknown,
            1 => KafkaCode::OffsetOutOfRange,
            2 => KafkaCode::InvalidMessage,
            3 => KafkaCode::UnknownTopicOrPartition,
            4 => KafkaCode::InvalidMessageSize,
            5 => KafkaCode::LeaderNotAvailable,
            6 => KafkaCode::NotLeaderForPartition,
            7 => KafkaCode::RequestTimedOut,
            8 => KafkaCode::BrokerNotAvailable,
            9 => KafkaCode::ReplicaNotAvailable,
            10 => KafkaCode::MessageSizeTooLarge,
            11 => KafkaCode::StaleControllerEpoch,
            12 => KafkaCode::OffsetMetadataTooLarge,
            14 => KafkaCode::OffsetsLoadInProgress,
            15 => KafkaCode::ConsumerCoordinatorNotAvailable,
            16 => KafkaCode::NotCoordinatorForConsumer,
            other => KafkaCode::UnknownError(other),
        }
    }

    /// Decodes the i16 that sits next to a response entry; 0 is success and
    /// maps to the absent error.
    pub fn from_wire(code: i16) -> Option<KafkaCode> {
        if code == 0 {
            None
        } else {
            Some(KafkaCode::from_code(code))
        }
    }

    /// The wire representation of an optional per-entry error.
    pub fn to_wire(err: &Option<KafkaCode>) -> i16 {
        err.as_ref().map_or(0, |code| code.code())
    }

    pub fn code(&self) -> i16 {
        match *self {
            KafkaCode::NoError => 0,
            KafkaCode::Unknown => -1,
            KafkaCode::OffsetOutOfRange => 1,
            KafkaCode::InvalidMessage => 2,
            KafkaCode::UnknownTopicOrPartition => 3,
            KafkaCode::InvalidMessageSize => 4,
            KafkaCode::LeaderNotAvailable => 5,
            KafkaCode::NotLeaderForPartition => 6,
            KafkaCode::RequestTimedOut => 7,
            KafkaCode::BrokerNotAvailable => 8,
            KafkaCode::ReplicaNotAvailable => 9,
            KafkaCode::MessageSizeTooLarge => 10,
            KafkaCode::StaleControllerEpoch => 11,
            KafkaCode::OffsetMetadataTooLarge => 12,
            KafkaCode::OffsetsLoadInProgress => 14,
            KafkaCode::ConsumerCoordinatorNotAvailable => 15,
            KafkaCode::NotCoordinatorForConsumer => 16,
            KafkaCode::UnknownError(code) => code,
        }
    }
}

impl fmt::Display for KafkaCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            KafkaCode::UnknownError(code) => write!(f, "unknown kafka error ({})", code),
            ref code => write!(f, "{:?} ({})", code, code.code()),
        }
    }
}

error_chain!{
    foreign_links {
        Io(::std::io::Error);
    }

    errors {
        // a value that cannot be expressed in the wire grammar
        CodecError(reason: &'static str) {
            description("codec error")
            display("codec error, {}", reason)
        }
        // a buffer that disagrees with the wire grammar
        Malformed(what: &'static str) {
            description("malformed data")
            display("malformed data while reading {}", what)
        }
        // a message checksum that does not match the computed value
        CrcMismatch {
            description("CRC mismatch")
        }
        // message attributes carrying a reserved compression code
        UnknownCompression {
            description("unknown compression")
        }
        CompressionFailed {
            description("compression failed")
        }
        DecompressionFailed {
            description("decompression failed")
        }
    }
}
