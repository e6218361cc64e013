use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about)]
/// Serves Postgres schema introspection over HTTP.
///
/// Clients pass the address of the database to inspect with every request; the
/// server keeps no connections open between requests.
pub struct Cli {
    /// The address to listen on
    #[arg(
        long,
        env = "SCHEMA_SCOUT_HOST",
        default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    )]
    pub host: IpAddr,

    /// The port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
}

impl Cli {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
