//! Configuration from the environment.

use std::env;
use std::net::{Ipv4Addr, SocketAddr};

use crate::game::GameOptions;

/// Socket address to bind the server to.
///
/// Reads the `PORT` env var or defaults to 8080, binds to 0.0.0.0.
pub fn server_addr() -> SocketAddr {
    let port = env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(8080);
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Rule variants, off by default:
/// `ZORO_LENIENT_BIDDING` accepts bids out of turn order,
/// `ZORO_UNDO` enables the undo stack.
pub fn game_options() -> GameOptions {
    GameOptions {
        lenient_bidding: env_flag("ZORO_LENIENT_BIDDING"),
        undo_enabled: env_flag("ZORO_UNDO"),
    }
}
