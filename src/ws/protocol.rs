//! Wire messages. Tagged JSON enums on both directions; game
//! snapshots are broadcast whole to every lobby subscriber.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{Game, Suit};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinLobby { lobby_code: String, user: String },
    LeaveLobby,
    /// Admin only: kick a user out of the lobby.
    RemoveUser { user: String },
    LobbyMessage { text: String },
    StartGame,
    /// Rejoin a running game and receive a fresh snapshot.
    JoinGame,
    MakePrediction { prediction: u8 },
    PlayCard { card_index: usize },
    ChooseTrump { suit: Suit },
    NextRound,
    UndoMove,
    PauseGame { is_paused: bool },
    RestartGame,
    EndGame,
    Ping,
}

#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    LobbyUsers {
        users: Vec<String>,
        admin: String,
    },
    LobbyMessage {
        id: Uuid,
        user: String,
        text: String,
    },
    GameStarted {
        game: Game,
    },
    GameUpdate {
        game: Game,
    },
    GamePaused {
        is_paused: bool,
        paused_by: String,
    },
    GameRestarted {
        restarted_by: String,
    },
    GameEnded {
        ended_by: String,
    },
    RemovedFromLobby {
        message: String,
    },
    Error {
        message: String,
    },
    Pong,
}
