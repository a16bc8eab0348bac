use crate::signaling::{AllowAll, RelaySettings, RoomAuthorizer, SharedTokenAuthorizer};
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tlink_core::IceServerConfig;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_STUN_SERVER: &str = "stun:stun.l.google.com:19302";

/// Deployment settings for the signaling relay. Every flag can also be set
/// through the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "tlink-server", version, about = "Signaling relay for peer-to-peer voice calls")]
pub struct ServerConfig {
    #[arg(long, env = "TLINK_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// STUN/TURN urls advertised to clients, comma separated.
    #[arg(
        long = "ice-server",
        env = "TLINK_ICE_SERVERS",
        value_delimiter = ',',
        default_value = DEFAULT_STUN_SERVER
    )]
    pub ice_servers: Vec<String>,

    /// When set, `join-room` must carry this token.
    #[arg(long, env = "TLINK_JOIN_TOKEN")]
    pub join_token: Option<String>,

    #[arg(long, env = "TLINK_MAX_ROOM_MEMBERS")]
    pub max_room_members: Option<usize>,

    /// `tracing` filter directive, e.g. `info` or `tlink_server=debug`.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            ice_servers: vec![DEFAULT_STUN_SERVER.to_owned()],
            join_token: None,
            max_room_members: None,
            log_level: "info".to_owned(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn relay_settings(&self) -> RelaySettings {
        let ice_servers = if self.ice_servers.is_empty() {
            Vec::new()
        } else {
            vec![IceServerConfig {
                urls: self.ice_servers.clone(),
                username: None,
                credential: None,
            }]
        };

        RelaySettings {
            ice_servers,
            max_room_members: self.max_room_members,
        }
    }

    pub fn authorizer(&self) -> Arc<dyn RoomAuthorizer> {
        match &self.join_token {
            Some(token) => Arc::new(SharedTokenAuthorizer::new(token.clone())),
            None => Arc::new(AllowAll),
        }
    }
}
