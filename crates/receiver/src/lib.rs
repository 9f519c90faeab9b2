//! The dispatcher: one cooperative loop bound to the upstream pub/sub
//! subscription. It receives two-frame messages (envelope prefix plus a
//! gzip-compressed XML body), decompresses, routes by longest prefix match
//! to the right parser and hands the result to the right store. A single
//! malformed message never stops the loop.

mod dispatcher;
mod envelope;

pub use dispatcher::{run_receiver, ReceiverConfig, ServiceSink};
pub use envelope::{Channel, EnvelopeConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceiverError {
    #[error("upstream socket error: {0}")]
    Socket(#[from] zeromq::ZmqError),
}
