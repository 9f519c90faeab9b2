/// The three logical channels of the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Arrivals,
    Departures,
    Services,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Arrivals => "arrivals",
            Channel::Departures => "departures",
            Channel::Services => "services",
        }
    }
}

/// Envelope prefix per logical channel, as configured for the upstream
/// environment (production and test feeds use different prefixes).
#[derive(Debug, Clone)]
pub struct EnvelopeConfig {
    pub arrivals: String,
    pub departures: String,
    pub services: String,
}

impl EnvelopeConfig {
    /// Routes an envelope to its channel. The envelopes on the wire are
    /// longer than the configured prefixes; when prefixes overlap the
    /// longest match wins.
    pub fn channel_for(&self, envelope: &str) -> Option<Channel> {
        [
            (Channel::Arrivals, self.arrivals.as_str()),
            (Channel::Departures, self.departures.as_str()),
            (Channel::Services, self.services.as_str()),
        ]
        .into_iter()
        .filter(|(_, prefix)| !prefix.is_empty() && envelope.starts_with(prefix))
        .max_by_key(|(_, prefix)| prefix.len())
        .map(|(channel, _)| channel)
    }
}
