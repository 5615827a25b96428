use std::time::Duration;

use tonic::transport::Endpoint;

/// HTTP/2 keepalive settings for the client channel.
///
/// When applied, the connection sends a PING frame after `interval` without
/// inbound traffic and drops the connection if the ack takes longer than
/// `timeout`.
///
/// The values are this program's own choice; tonic has no default interval.
/// `while_idle` is on, unlike grpc-go's `PermitWithoutStream` default: the
/// client spends nearly all its time between calls, and without idle pings
/// the connection would never be pinged at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeepAlive {
    pub interval: Duration,
    pub timeout: Duration,
    pub while_idle: bool,
}

impl Default for KeepAlive {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(20),
            while_idle: true,
        }
    }
}

impl KeepAlive {
    pub fn apply(&self, endpoint: Endpoint) -> Endpoint {
        endpoint
            .http2_keep_alive_interval(self.interval)
            .keep_alive_timeout(self.timeout)
            .keep_alive_while_idle(self.while_idle)
    }
}
