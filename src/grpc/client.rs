use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tonic::{
    codegen::InterceptedService,
    transport::{Channel, Endpoint},
    Request, Response, Status,
};
use tower::{util::BoxCloneService, BoxError, Service};

use super::{
    interceptors::{stamp_attempt, Interceptor, RetryAttempt},
    retry::{with_retry, Attempted, RetryOptions},
    rpc::{greeter_client::GreeterClient, HelloReply, HelloRequest},
};
use crate::{config::Config, error::ClientError};

/// The unary `SayHello` call path with retries applied.
pub type GreeterStack = BoxCloneService<HelloRequest, HelloReply, BoxError>;

/// Build the plaintext endpoint for `config`, with keepalive applied when
/// enabled. Nothing is dialed yet.
pub fn endpoint(config: &Config) -> Result<Endpoint, ClientError> {
    let endpoint =
        Endpoint::from_shared(config.url()).map_err(|source| ClientError::InvalidAddress {
            addr: config.addr.clone(),
            source,
        })?;

    match endpoint.uri().scheme_str() {
        Some("http") => {}
        other => {
            return Err(ClientError::UnsupportedScheme {
                addr: config.addr.clone(),
                scheme: other.unwrap_or_default().to_string(),
            })
        }
    }

    Ok(match config.keep_alive() {
        Some(keep_alive) => keep_alive.apply(endpoint),
        None => endpoint,
    })
}

/// Create the long-lived channel and the retrying call path on top of it.
///
/// The channel connects on first use and reconnects on its own afterwards,
/// so an unreachable server shows up as failed calls rather than here.
pub fn connect(config: &Config) -> Result<GreeterStack, ClientError> {
    let channel = endpoint(config)?.connect_lazy();
    Ok(stack(channel, RetryOptions::default()))
}

pub fn stack(channel: Channel, options: RetryOptions) -> GreeterStack {
    with_retry(SayHello::new(channel), options)
}

/// One `SayHello` attempt over the channel.
///
/// Carries its attempt number to the `stamp_attempt` interceptor. Must not set
/// `grpc-timeout`: the `Timeout` layer in `with_retry` is the only bound on an
/// attempt, and tonic's own timer would end it as a non-retryable `Cancelled`.
#[derive(Clone)]
pub struct SayHello {
    client: GreeterClient<InterceptedService<Channel, Interceptor>>,
}

impl SayHello {
    pub fn new(channel: Channel) -> Self {
        Self {
            client: GreeterClient::with_interceptor(channel, stamp_attempt as Interceptor),
        }
    }
}

impl Service<Attempted<HelloRequest>> for SayHello {
    type Response = HelloReply;
    type Error = Status;
    type Future = Pin<Box<dyn Future<Output = Result<HelloReply, Status>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // the generated client waits for channel readiness itself
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Attempted<HelloRequest>) -> Self::Future {
        let mut client = self.client.clone();
        let mut request = Request::new(req.message);
        request.extensions_mut().insert(RetryAttempt(req.attempt));

        Box::pin(async move { client.say_hello(request).await.map(Response::into_inner) })
    }
}
