use clap::Parser;
use tracing::{error, info};

use greeter::{
    config::{Args, Config},
    greet_loop::GreetLoop,
    grpc::client,
    logging, signal,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let config = Config::from(Args::parse());
    info!(
        addr = %config.addr,
        name = %config.name,
        alive = config.alive,
        "starting greeter client"
    );

    let service = client::connect(&config).map_err(|err| {
        error!("did not connect: {}", err);
        err
    })?;

    let mut greet = GreetLoop::new(service, config.name);
    greet.run(signal::shutdown()).await;
    info!("stopped after {} requests", greet.count());
    Ok(())
}
