//! WebSocket connection lifecycle and message dispatch.
//!
//! Each socket gets an unbounded channel; a forwarder task drains it
//! into the socket so game code never awaits mid-lock. Game mutations
//! lock the lobby's game mutex, apply, clone the snapshot, release,
//! then broadcast.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::game::{ActionError, Game};
use crate::lobby::{Lobby, RegistryError, MIN_PLAYERS};
use crate::ws::protocol::{ClientMessage, ServerMessage};
use crate::AppState;

/// The socket's lobby binding once it has joined.
struct Session {
    lobby_code: String,
    user: String,
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&msg) else { continue };
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let mut session: Option<Session> = None;

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => handle_message(&state, &tx, &mut session, msg),
                Err(err) => {
                    debug!(%err, "bad client message");
                    send_error(&tx, format!("Bad message: {err}"));
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Seats in an active game survive the disconnect for rejoin.
    if let Some(Session { lobby_code, user }) = session {
        state.registry.disconnect(&lobby_code, &user);
        if let Some(lobby) = state.registry.get(&lobby_code) {
            lobby.broadcast(&lobby.roster_message());
        }
        debug!(%lobby_code, %user, "socket disconnected");
    }
}

fn send_error(tx: &UnboundedSender<ServerMessage>, message: impl Into<String>) {
    let _ = tx.send(ServerMessage::Error {
        message: message.into(),
    });
}

/// Lock the lobby's game, apply one mutation, and broadcast the full
/// snapshot on success.
fn with_game<F>(lobby: &Arc<Lobby>, tx: &UnboundedSender<ServerMessage>, apply: F)
where
    F: FnOnce(&mut Game) -> Result<(), ActionError>,
{
    let mut guard = lobby.game.lock();
    let Some(game) = guard.as_mut() else {
        drop(guard);
        send_error(tx, RegistryError::GameNotFound.to_string());
        return;
    };
    match apply(&mut *game) {
        Ok(()) => {
            let snapshot = game.clone();
            drop(guard);
            lobby.broadcast(&ServerMessage::GameUpdate { game: snapshot });
        }
        Err(err) => {
            drop(guard);
            send_error(tx, err.to_string());
        }
    }
}

fn handle_message(
    state: &AppState,
    tx: &UnboundedSender<ServerMessage>,
    session: &mut Option<Session>,
    msg: ClientMessage,
) {
    if let ClientMessage::JoinLobby { lobby_code, user } = msg {
        match state.registry.join(&lobby_code, &user, tx.clone()) {
            Ok(lobby) => {
                info!(%lobby_code, %user, "joined lobby");
                *session = Some(Session { lobby_code, user });
                lobby.broadcast(&lobby.roster_message());
            }
            Err(err) => send_error(tx, err.to_string()),
        }
        return;
    }

    let Some(Session { lobby_code, user }) = session.as_ref() else {
        send_error(tx, "Join a lobby first.");
        return;
    };
    let Some(lobby) = state.registry.get(lobby_code) else {
        send_error(tx, RegistryError::LobbyNotFound.to_string());
        return;
    };

    match msg {
        ClientMessage::JoinLobby { .. } => unreachable!("handled above"),

        ClientMessage::LeaveLobby => {
            state.registry.leave(lobby_code, user);
            lobby.broadcast(&lobby.roster_message());
            *session = None;
        }

        ClientMessage::RemoveUser { user: target } => {
            match state.registry.remove_user(lobby_code, user, &target) {
                Ok(lobby) => lobby.broadcast(&lobby.roster_message()),
                Err(err) => send_error(tx, err.to_string()),
            }
        }

        ClientMessage::LobbyMessage { text } => {
            lobby.broadcast(&ServerMessage::LobbyMessage {
                id: Uuid::new_v4(),
                user: user.clone(),
                text,
            });
        }

        ClientMessage::StartGame => {
            let mut guard = lobby.game.lock();
            if guard.is_some() {
                // Rebroadcast the running game instead of replacing it.
                let snapshot = guard.as_ref().cloned();
                drop(guard);
                if let Some(game) = snapshot {
                    lobby.broadcast(&ServerMessage::GameUpdate { game });
                }
                return;
            }
            let names = lobby.users();
            if names.len() < MIN_PLAYERS {
                drop(guard);
                send_error(tx, "Not enough players to start the game.");
                return;
            }
            match Game::new(&names, state.options) {
                Ok(game) => {
                    let snapshot = game.clone();
                    *guard = Some(game);
                    drop(guard);
                    info!(%lobby_code, players = names.len(), "game started");
                    lobby.broadcast(&ServerMessage::GameStarted {
                        game: snapshot.clone(),
                    });
                    lobby.broadcast(&ServerMessage::GameUpdate { game: snapshot });
                }
                Err(err) => {
                    drop(guard);
                    send_error(tx, err.to_string());
                }
            }
        }

        ClientMessage::JoinGame => {
            let guard = lobby.game.lock();
            match guard.as_ref() {
                Some(game) if game.players.is_empty() => {
                    send_error(tx, ActionError::CorruptState.to_string());
                }
                Some(game) => {
                    let snapshot = game.clone();
                    drop(guard);
                    let _ = tx.send(ServerMessage::GameUpdate { game: snapshot });
                }
                None => {
                    send_error(tx, "Game not found. Please start a new game from the lobby.");
                }
            }
        }

        ClientMessage::MakePrediction { prediction } => {
            with_game(&lobby, tx, |game| game.submit_prediction(user, prediction));
        }

        ClientMessage::PlayCard { card_index } => {
            with_game(&lobby, tx, |game| game.submit_play(user, card_index));
        }

        ClientMessage::ChooseTrump { suit } => {
            with_game(&lobby, tx, |game| game.choose_trump(user, suit));
        }

        ClientMessage::NextRound => {
            with_game(&lobby, tx, |game| game.request_next_round());
        }

        ClientMessage::UndoMove => {
            with_game(&lobby, tx, |game| game.undo_last_move());
        }

        ClientMessage::PauseGame { is_paused } => {
            if !lobby.is_admin(user) {
                send_error(tx, "Only admin can pause the game.");
                return;
            }
            let mut guard = lobby.game.lock();
            let Some(game) = guard.as_mut() else {
                drop(guard);
                send_error(tx, RegistryError::GameNotFound.to_string());
                return;
            };
            game.set_paused(is_paused);
            let snapshot = game.clone();
            drop(guard);
            lobby.broadcast(&ServerMessage::GamePaused {
                is_paused,
                paused_by: user.clone(),
            });
            lobby.broadcast(&ServerMessage::GameUpdate { game: snapshot });
        }

        ClientMessage::RestartGame => {
            if !lobby.is_admin(user) {
                send_error(tx, "Only admin can restart the game.");
                return;
            }
            let mut guard = lobby.game.lock();
            let fresh = match guard.as_ref() {
                Some(game) => game.restart(),
                None => Game::new(&lobby.users(), state.options),
            };
            match fresh {
                Ok(game) => {
                    let snapshot = game.clone();
                    *guard = Some(game);
                    drop(guard);
                    info!(%lobby_code, "game restarted");
                    lobby.broadcast(&ServerMessage::GameRestarted {
                        restarted_by: user.clone(),
                    });
                    lobby.broadcast(&ServerMessage::GameStarted {
                        game: snapshot.clone(),
                    });
                    lobby.broadcast(&ServerMessage::GameUpdate { game: snapshot });
                }
                Err(err) => {
                    drop(guard);
                    warn!(%lobby_code, %err, "restart failed");
                    send_error(tx, err.to_string());
                }
            }
        }

        ClientMessage::EndGame => {
            if !lobby.is_admin(user) {
                send_error(tx, "Only admin can end the game.");
                return;
            }
            let mut guard = lobby.game.lock();
            let Some(game) = guard.as_mut() else {
                drop(guard);
                send_error(tx, RegistryError::GameNotFound.to_string());
                return;
            };
            game.end();
            let snapshot = game.clone();
            drop(guard);
            lobby.broadcast(&ServerMessage::GameEnded {
                ended_by: user.clone(),
            });
            lobby.broadcast(&ServerMessage::GameUpdate { game: snapshot });
        }

        ClientMessage::Ping => {
            let _ = tx.send(ServerMessage::Pong);
        }
    }
}
