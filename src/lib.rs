pub mod config;
pub mod error;
pub mod greet_loop;
pub mod grpc;
pub mod logging;
pub mod signal;
