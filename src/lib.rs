//! Zoro: an authoritative server for a Wizard-style trick-taking
//! card game, played in lobbies of 3 to 6 players over WebSockets.

pub mod config;
pub mod game;
pub mod lobby;
pub mod telemetry;
pub mod ws;

use game::GameOptions;
use lobby::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: SessionRegistry,
    pub options: GameOptions,
}

impl AppState {
    pub fn new(options: GameOptions) -> Self {
        Self {
            registry: SessionRegistry::new(),
            options,
        }
    }
}
