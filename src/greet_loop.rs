//! The client's main loop: one timed `SayHello` every few seconds, forever.
//!
//! The loop is generic over the call path so it can run against any
//! `tower::Service`, and it takes its clock and sleep from `tokio::time`, which
//! tests pause and advance instead of waiting in real time.

use std::{future::Future, time::Duration};

use tokio::time::{sleep, timeout_at, Instant};
use tonic::Status;
use tower::{BoxError, Service, ServiceExt};
use tracing::{info, warn};

use crate::grpc::{
    retry::into_status,
    rpc::{HelloReply, HelloRequest},
};

pub const CALL_DEADLINE: Duration = Duration::from_secs(45);
pub const PAUSE: Duration = Duration::from_secs(5);

const SEPARATOR: &str = ">>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>";

/// What happened in one iteration.
#[derive(Debug)]
pub struct Iteration {
    pub count: u64,
    pub deadline: Instant,
    pub result: Result<String, Status>,
}

pub struct GreetLoop<S> {
    service: S,
    name: String,
    count: u64,
    deadline: Duration,
    pause: Duration,
}

impl<S> GreetLoop<S>
where
    S: Service<HelloRequest, Response = HelloReply, Error = BoxError>,
{
    pub fn new(service: S, name: impl Into<String>) -> Self {
        Self {
            service,
            name: name.into(),
            count: 0,
            deadline: CALL_DEADLINE,
            pause: PAUSE,
        }
    }

    /// Number of requests issued so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Issue one request and log the outcome. Never fails: call errors are
    /// logged and returned in the `Iteration`.
    pub async fn step(&mut self) -> Iteration {
        let count = self.count;
        self.count = self.count.wrapping_add(1);
        info!("{}", SEPARATOR);
        info!("New request from client: {}", count);

        let deadline = Instant::now() + self.deadline;
        let result = self.say_hello(deadline).await;
        match &result {
            Ok(message) => info!("Greeting: {}", message),
            Err(status) => warn!("could not greet: {}", status),
        }

        Iteration {
            count,
            deadline,
            result,
        }
    }

    /// Loop until `shutdown` resolves. An iteration in progress is abandoned.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.cycle() => {}
            }
        }
    }

    async fn cycle(&mut self) {
        self.step().await;
        info!("Sleeping for {} seconds", self.pause.as_secs());
        info!("{}", SEPARATOR);
        sleep(self.pause).await;
    }

    async fn say_hello(&mut self, deadline: Instant) -> Result<String, Status> {
        let request = HelloRequest {
            name: self.name.clone(),
        };
        let service = &mut self.service;
        let call = async move { service.ready().await?.call(request).await };

        match timeout_at(deadline, call).await {
            Ok(Ok(reply)) => Ok(reply.message),
            Ok(Err(err)) => Err(into_status(err)),
            Err(_) => Err(Status::deadline_exceeded("call deadline exceeded")),
        }
    }
}
