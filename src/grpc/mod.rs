pub mod client;
pub mod interceptors;
pub mod keepalive;
pub mod retry;
pub mod server;
mod util;

pub mod rpc {
    tonic::include_proto!("helloworld");
}
