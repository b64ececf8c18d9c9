//! Request and response facades plus the sink traits a transport implements.

pub mod request;
pub mod response;
pub mod sink;

pub use request::{parse_query_params, Request, RequestId};
pub use response::{write_json_error, Response};
pub use sink::{ChunkSink, HeaderVec, RecordingSink, ResponseHead, ResponseSink, WriteSink};
