//! The submission console: sends forms to the relay and turns the reply into
//! chat messages, a compliance verdict and writer buckets

pub mod decoder;
pub mod log;
pub mod payload;
pub mod reader;
pub mod state;
pub mod submission;
pub mod transport;
pub mod views;

pub use decoder::Utf8StreamDecoder;
pub use log::{LogBook, LogEntry, LogStream};
pub use payload::{ChatMessage, Role, UpstreamShape, flatten, parse_accumulated};
pub use reader::{ChunkProgress, HttpResponseReader, ResponseMeta, ResponseReader};
pub use state::Console;
pub use submission::{MISSING_CONTENT_TYPE_NOTE, SubmissionEvent, SubmissionState, run_submission};
pub use transport::{RelayClient, RelayTransport, SubmissionForm};
pub use views::{ComplianceVerdict, WriterBucket, WriterBuckets, raw_view};
