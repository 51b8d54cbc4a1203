//! Lobby bookkeeping and the registry mapping lobby codes to games.

pub mod registry;

pub use registry::{Lobby, RegistryError, SessionRegistry, MAX_LOBBY_SIZE, MIN_PLAYERS};
