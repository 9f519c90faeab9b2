use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flate2::read::GzDecoder;
use tokio_util::sync::CancellationToken;
use zeromq::{Socket, SocketRecv, SubSocket, ZmqMessage};

use stores::StoreCollection;

use crate::envelope::{Channel, EnvelopeConfig};
use crate::ReceiverError;

/// Where accepted service records are forwarded when archiving is on. The
/// sink must not block the dispatcher; failures stay inside the sink.
#[async_trait]
pub trait ServiceSink: Send + Sync {
    async fn push(&self, service: &model::Service);
}

#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Upstream endpoint, e.g. `tcp://pubsub.example.net:7664`.
    pub server: String,
    pub envelopes: EnvelopeConfig,
    /// Hand parsed records to the stores.
    pub process_stores: bool,
    /// Forward accepted services to the archive sink.
    pub archive_services: bool,
    /// How long a single receive may block before cancellation is
    /// re-checked.
    pub receive_timeout: Duration,
}

impl ReceiverConfig {
    fn subscriptions(&self) -> Vec<(Channel, &str)> {
        let all = [
            (Channel::Arrivals, self.envelopes.arrivals.as_str()),
            (Channel::Departures, self.envelopes.departures.as_str()),
            (Channel::Services, self.envelopes.services.as_str()),
        ];

        all.into_iter()
            .filter(|(channel, prefix)| {
                if prefix.is_empty() {
                    return false;
                }
                if self.process_stores {
                    true
                } else {
                    // Archiver mode only needs the services channel.
                    self.archive_services && *channel == Channel::Services
                }
            })
            .collect()
    }
}

/// Connects to the upstream feed and dispatches messages until the token is
/// cancelled. Returning from this function is the cancellation
/// acknowledgement; the caller awaits it during shutdown.
pub async fn run_receiver(
    config: ReceiverConfig,
    stores: Arc<StoreCollection>,
    archive: Option<Arc<dyn ServiceSink>>,
    shutdown: CancellationToken,
) -> Result<(), ReceiverError> {
    let mut socket = SubSocket::new();
    socket.connect(&config.server).await?;
    tracing::info!(server = %config.server, "connected to upstream feed");

    for (channel, prefix) in config.subscriptions() {
        socket.subscribe(prefix).await?;
        tracing::info!(system = channel.as_str(), envelope = prefix, "subscribed to envelope");
    }

    tracing::info!("receiving data");

    loop {
        let message = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = tokio::time::timeout(config.receive_timeout, socket.recv()) => {
                match received {
                    // Receive timeout: re-check cancellation and continue.
                    Err(_) => continue,
                    Ok(Err(error)) => {
                        tracing::error!(error = %error, "upstream receive failed");
                        continue;
                    }
                    Ok(Ok(message)) => message,
                }
            }
        };

        handle_message(&config, &stores, archive.as_deref(), message).await;
    }

    // Dropping the socket tears down the subscription.
    drop(socket);
    tracing::info!("receiver shut down");

    Ok(())
}

async fn handle_message(
    config: &ReceiverConfig,
    stores: &StoreCollection,
    archive: Option<&dyn ServiceSink>,
    message: ZmqMessage,
) {
    let envelope = message
        .get(0)
        .map(|frame| String::from_utf8_lossy(frame).into_owned())
        .unwrap_or_default();

    let Some(payload) = message.get(1) else {
        tracing::warn!(envelope, "message without payload frame");
        return;
    };

    // A payload that does not decompress never reached a parser, so no
    // store counter is touched.
    let document = match gunzip(payload) {
        Ok(document) => document,
        Err(error) => {
            tracing::error!(envelope, error = %error, "error decompressing message, message ignored");
            return;
        }
    };

    match config.envelopes.channel_for(&envelope) {
        Some(Channel::Arrivals) => match parsers::parse_das_message(&document) {
            Ok(arrival) => {
                tracing::debug!(
                    product_id = arrival.product_id,
                    id = arrival.id,
                    "arrival received"
                );
                stores.arrivals.process(arrival);
            }
            Err(error) => {
                stores.arrivals.counters().increment_error();
                tracing::error!(envelope, error = %error, "could not parse arrival message");
            }
        },
        Some(Channel::Departures) => match parsers::parse_dvs_message(&document) {
            Ok(departure) => {
                tracing::debug!(
                    product_id = departure.product_id,
                    id = departure.id,
                    "departure received"
                );
                stores.departures.process(departure);
            }
            Err(error) => {
                stores.departures.counters().increment_error();
                tracing::error!(envelope, error = %error, "could not parse departure message");
            }
        },
        Some(Channel::Services) => match parsers::parse_rit_message(&document) {
            Ok(service) => {
                tracing::debug!(
                    product_id = service.product_id,
                    id = service.id,
                    "service received"
                );
                if config.archive_services {
                    if let Some(sink) = archive {
                        sink.push(&service).await;
                    }
                }
                if config.process_stores {
                    stores.services.process(service);
                }
            }
            Err(error) => {
                stores.services.counters().increment_error();
                tracing::error!(envelope, error = %error, "could not parse service message");
            }
        },
        None => {
            tracing::warn!(envelope, "unknown envelope");
        }
    }
}

fn gunzip(data: &[u8]) -> std::io::Result<String> {
    let mut decoder = GzDecoder::new(data);
    let mut document = String::new();
    decoder.read_to_string(&mut document)?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn config() -> ReceiverConfig {
        ReceiverConfig {
            server: "tcp://127.0.0.1:7664".to_owned(),
            envelopes: EnvelopeConfig {
                arrivals: "/das".to_owned(),
                departures: "/dvs".to_owned(),
                services: "/rit".to_owned(),
            },
            process_stores: true,
            archive_services: false,
            receive_timeout: Duration::from_secs(1),
        }
    }

    fn gzipped(content: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap()
    }

    fn two_frames(envelope: &str, payload: Vec<u8>) -> ZmqMessage {
        let mut message = ZmqMessage::from(envelope.to_owned());
        message.push_back(payload.into());
        message
    }

    #[tokio::test]
    async fn parse_failure_increments_error_counter() {
        let config = config();
        let stores = StoreCollection::new("/tmp/unused");

        let message = two_frames("/dvs/NL", gzipped(b"<NotADeparture/>"));
        handle_message(&config, &stores, None, message).await;

        assert_eq!(stores.departures.counters().snapshot().error, 1);
        assert_eq!(stores.departures.counters().snapshot().received, 0);
        assert_eq!(stores.departures.count(), 0);
    }

    #[tokio::test]
    async fn decompression_failure_touches_no_counter() {
        let config = config();
        let stores = StoreCollection::new("/tmp/unused");

        let message = two_frames("/dvs/NL", b"definitely not gzip".to_vec());
        handle_message(&config, &stores, None, message).await;

        assert_eq!(stores.departures.counters().snapshot().error, 0);
        assert_eq!(stores.departures.counters().snapshot().received, 0);
    }

    #[tokio::test]
    async fn unknown_envelope_is_ignored() {
        let config = config();
        let stores = StoreCollection::new("/tmp/unused");

        let message = two_frames("/other/NL", gzipped(b"<Whatever/>"));
        handle_message(&config, &stores, None, message).await;

        for counters in [
            stores.arrivals.counters().snapshot(),
            stores.departures.counters().snapshot(),
            stores.services.counters().snapshot(),
        ] {
            assert_eq!(counters.received, 0);
            assert_eq!(counters.error, 0);
        }
    }

    #[test]
    fn archiver_mode_subscribes_to_services_only() {
        let mut config = config();
        config.process_stores = false;
        config.archive_services = true;

        let subscriptions = config.subscriptions();
        assert_eq!(subscriptions.len(), 1);
        assert_eq!(subscriptions[0].0, Channel::Services);
    }

    #[test]
    fn server_mode_subscribes_to_all_channels() {
        let config = config();
        let subscriptions = config.subscriptions();
        assert_eq!(subscriptions.len(), 3);
    }
}
