pub mod http_client;
pub use http_client::{HttpReply, HttpTransport, RequestBody};
pub mod sink;
pub use sink::{download_to_sink, write_bytes, write_stream};
