use clap::Parser;

use crate::grpc::keepalive::KeepAlive;

pub const DEFAULT_ADDR: &str = "localhost:50051";
pub const DEFAULT_NAME: &str = "world";

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
#[command(about = "Greets a remote Greeter service every few seconds")]
pub struct Args {
    /// the address to connect to
    #[arg(long, default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// name to greet
    #[arg(short, long, default_value = DEFAULT_NAME)]
    pub name: String,

    /// keep connection alive with HTTP/2 pings
    #[arg(long)]
    pub alive: bool,
}

/// Client settings, fixed for the lifetime of the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub addr: String,
    pub name: String,
    pub alive: bool,
}

impl Config {
    /// Endpoint URL for `addr`. Bare `host:port` addresses get an `http://`
    /// scheme, anything with a scheme is passed through untouched.
    pub fn url(&self) -> String {
        if self.addr.contains("://") {
            self.addr.clone()
        } else {
            format!("http://{}", self.addr)
        }
    }

    pub fn keep_alive(&self) -> Option<KeepAlive> {
        self.alive.then(KeepAlive::default)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            name: DEFAULT_NAME.to_string(),
            alive: false,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            addr: args.addr,
            name: args.name,
            alive: args.alive,
        }
    }
}
