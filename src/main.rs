use std::net::{IpAddr, SocketAddr};

use clap::Parser;

use greeter::{grpc::server, logging, signal};

#[derive(Parser, Debug)]
#[command(author, version, about = "Answers SayHello requests", long_about = None)]
struct Args {
    /// interface to listen on
    #[arg(long, default_value = "::1")]
    host: IpAddr,

    /// the server port
    #[arg(short, long, default_value_t = 50051)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let args = Args::parse();

    server::run(SocketAddr::new(args.host, args.port), signal::shutdown()).await
}
