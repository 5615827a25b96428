use std::{future::Future, net::SocketAddr};

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{transport::Server, Request, Response, Status};
use tracing::info;

use super::{
    rpc::{
        greeter_server::{Greeter, GreeterServer},
        HelloReply, HelloRequest,
    },
    util::{log_metadata, merge_metadata},
};

#[derive(Debug, Default)]
pub struct GreeterServerImpl {}

#[tonic::async_trait]
impl Greeter for GreeterServerImpl {
    async fn say_hello(
        &self,
        request: Request<HelloRequest>,
    ) -> Result<Response<HelloReply>, Status> {
        log_metadata(request.metadata());
        info!("Received: {}", request.get_ref().name);

        let mut response = Response::new(HelloReply {
            message: format!("Hello {}", request.get_ref().name),
        });
        // propagate headers to response
        merge_metadata(response.metadata_mut(), request.metadata());
        Ok(response)
    }
}

pub fn service() -> GreeterServer<GreeterServerImpl> {
    GreeterServer::new(GreeterServerImpl::default())
}

/// Serve the greeter on `addr` until `shutdown` resolves.
pub async fn run<F>(addr: SocketAddr, shutdown: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()>,
{
    let listener = TcpListener::bind(addr).await?;
    info!("server listening at {}", listener.local_addr()?);

    Server::builder()
        .add_service(service())
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await?;

    Ok(())
}
