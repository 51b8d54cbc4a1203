//! Session registry: lobby membership, admin bookkeeping, and the one
//! live game per lobby.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use time::OffsetDateTime;
use tokio::sync::mpsc::UnboundedSender;

use crate::game::{Game, Phase};
use crate::ws::protocol::ServerMessage;

pub const MAX_LOBBY_SIZE: usize = 6;
pub const MIN_PLAYERS: usize = 3;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("lobby not found")]
    LobbyNotFound,
    #[error("no game running in this lobby")]
    GameNotFound,
    #[error("lobby is full (maximum {MAX_LOBBY_SIZE} players)")]
    LobbyFull,
    #[error("username already taken in this lobby")]
    NameTaken,
    #[error("username must be between 1 and 20 characters")]
    InvalidName,
    #[error("only the admin may do that")]
    NotAdmin,
}

#[derive(Debug)]
pub struct Member {
    pub name: String,
    /// None while the player is disconnected; reattached on rejoin.
    pub tx: Option<UnboundedSender<ServerMessage>>,
}

#[derive(Debug)]
struct Roster {
    members: Vec<Member>,
    admin: String,
}

/// One lobby: its roster and at most one live game. The game mutex is
/// the single-writer discipline for that game; every mutation goes
/// through it.
#[derive(Debug)]
pub struct Lobby {
    pub code: String,
    pub created_at: OffsetDateTime,
    roster: Mutex<Roster>,
    pub game: Mutex<Option<Game>>,
}

impl Lobby {
    fn new(code: String, admin: String) -> Self {
        Self {
            code,
            created_at: OffsetDateTime::now_utc(),
            roster: Mutex::new(Roster {
                members: Vec::new(),
                admin,
            }),
            game: Mutex::new(None),
        }
    }

    pub fn users(&self) -> Vec<String> {
        self.roster.lock().members.iter().map(|m| m.name.clone()).collect()
    }

    pub fn admin(&self) -> String {
        self.roster.lock().admin.clone()
    }

    pub fn is_admin(&self, name: &str) -> bool {
        self.roster.lock().admin == name
    }

    pub fn is_empty(&self) -> bool {
        self.roster.lock().members.is_empty()
    }

    pub fn broadcast(&self, msg: &ServerMessage) {
        let roster = self.roster.lock();
        for member in &roster.members {
            if let Some(tx) = &member.tx {
                let _ = tx.send(msg.clone());
            }
        }
    }

    pub fn send_to(&self, name: &str, msg: &ServerMessage) {
        let roster = self.roster.lock();
        if let Some(member) = roster.members.iter().find(|m| m.name == name) {
            if let Some(tx) = &member.tx {
                let _ = tx.send(msg.clone());
            }
        }
    }

    /// Lobby roster plus admin, as broadcast after every change.
    pub fn roster_message(&self) -> ServerMessage {
        let roster = self.roster.lock();
        ServerMessage::LobbyUsers {
            users: roster.members.iter().map(|m| m.name.clone()).collect(),
            admin: roster.admin.clone(),
        }
    }

    pub fn game_is_active(&self) -> bool {
        self.game
            .lock()
            .as_ref()
            .map(|g| g.phase != Phase::Finished)
            .unwrap_or(false)
    }

    fn add_member(
        &self,
        name: &str,
        tx: UnboundedSender<ServerMessage>,
    ) -> Result<(), RegistryError> {
        let mut roster = self.roster.lock();
        if let Some(member) = roster.members.iter_mut().find(|m| m.name == name) {
            // Reconnection replaces the dead channel; a live one means
            // someone else already holds this name.
            if member.tx.as_ref().is_some_and(|tx| !tx.is_closed()) {
                return Err(RegistryError::NameTaken);
            }
            member.tx = Some(tx);
            return Ok(());
        }
        if roster.members.len() >= MAX_LOBBY_SIZE {
            return Err(RegistryError::LobbyFull);
        }
        roster.members.push(Member {
            name: name.to_string(),
            tx: Some(tx),
        });
        Ok(())
    }

    /// Drop a member, transferring admin to the first remaining member
    /// when the admin leaves. Returns whether the lobby is now empty.
    fn drop_member(&self, name: &str) -> bool {
        let mut roster = self.roster.lock();
        roster.members.retain(|m| m.name != name);
        if roster.members.is_empty() {
            return true;
        }
        if roster.admin == name {
            roster.admin = roster.members[0].name.clone();
        }
        false
    }

    /// Detach the channel without removing the member (disconnect
    /// during an active game).
    fn detach_member(&self, name: &str) {
        let mut roster = self.roster.lock();
        if let Some(member) = roster.members.iter_mut().find(|m| m.name == name) {
            member.tx = None;
        }
    }
}

/// Process-wide map from lobby code to lobby, shared by every
/// connection. Lobbies are created on first join and removed when the
/// last member leaves.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    lobbies: Arc<DashMap<String, Arc<Lobby>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> Option<Arc<Lobby>> {
        self.lobbies.get(code).map(|l| l.clone())
    }

    /// Join (or create) a lobby. The first joiner becomes admin.
    pub fn join(
        &self,
        code: &str,
        name: &str,
        tx: UnboundedSender<ServerMessage>,
    ) -> Result<Arc<Lobby>, RegistryError> {
        if name.is_empty() || name.len() > 20 {
            return Err(RegistryError::InvalidName);
        }
        let lobby = self
            .lobbies
            .entry(code.to_string())
            .or_insert_with(|| Arc::new(Lobby::new(code.to_string(), name.to_string())))
            .clone();
        lobby.add_member(name, tx)?;
        Ok(lobby)
    }

    /// Explicit leave: the member is removed and an empty lobby is
    /// torn down together with its game.
    pub fn leave(&self, code: &str, name: &str) {
        let Some(lobby) = self.get(code) else { return };
        if lobby.drop_member(name) {
            self.lobbies.remove(code);
        }
    }

    /// Admin kicks `target` out of the lobby.
    pub fn remove_user(
        &self,
        code: &str,
        actor: &str,
        target: &str,
    ) -> Result<Arc<Lobby>, RegistryError> {
        let lobby = self.get(code).ok_or(RegistryError::LobbyNotFound)?;
        if !lobby.is_admin(actor) {
            return Err(RegistryError::NotAdmin);
        }
        lobby.send_to(
            target,
            &ServerMessage::RemovedFromLobby {
                message: "You were removed from the lobby.".to_string(),
            },
        );
        if lobby.drop_member(target) {
            self.lobbies.remove(code);
        }
        Ok(lobby)
    }

    /// Connection loss. Members of an active game keep their seat so
    /// they can rejoin; otherwise this behaves like a leave.
    pub fn disconnect(&self, code: &str, name: &str) {
        let Some(lobby) = self.get(code) else { return };
        if lobby.game_is_active() {
            lobby.detach_member(name);
        } else if lobby.drop_member(name) {
            self.lobbies.remove(code);
        }
    }

    pub fn lobby_count(&self) -> usize {
        self.lobbies.len()
    }
}
