use std::env;
use tlink_core::IceServerConfig;

pub const DEFAULT_RELAY_URL: &str = "ws://127.0.0.1:5000/ws";
pub const DEFAULT_STUN_SERVER: &str = "stun:stun.l.google.com:19302";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    /// Used until the relay advertises its own ICE servers.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_owned(),
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_SERVER)],
        }
    }
}

impl ClientConfig {
    /// Reads `TLINK_RELAY_URL` and `TLINK_ICE_SERVERS` (comma separated urls).
    pub fn from_env() -> Self {
        let relay_url = env::var("TLINK_RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.into());
        let ice_servers = env::var("TLINK_ICE_SERVERS")
            .ok()
            .map(|value| parse_ice_urls(&value))
            .filter(|urls| !urls.is_empty())
            .map(|urls| {
                vec![IceServerConfig {
                    urls,
                    username: None,
                    credential: None,
                }]
            })
            .unwrap_or_else(|| vec![IceServerConfig::stun(DEFAULT_STUN_SERVER)]);

        Self {
            relay_url,
            ice_servers,
        }
    }
}

fn parse_ice_urls(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
        .collect()
}
