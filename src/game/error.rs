//! Rejection reasons for game actions. All recoverable; a rejected
//! action leaves the game untouched.

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ActionError {
    #[error("action not allowed in the current phase")]
    InvalidPhase,
    #[error("not your turn")]
    NotYourTurn,
    #[error("player not found")]
    PlayerNotFound,
    #[error("card index out of range")]
    IllegalCardIndex,
    #[error("card violates the follow-suit rule")]
    IllegalCardPlay,
    #[error("prediction out of range")]
    PredictionOutOfRange,
    #[error("prediction already made")]
    AlreadyPredicted,
    #[error("a game needs between 3 and 6 players")]
    NotEnoughPlayers,
    #[error("game is paused")]
    GamePaused,
    #[error("only the dealer may choose the trump suit")]
    NotTrumpChooser,
    #[error("nothing to undo")]
    UndoUnavailable,
    #[error("game state is corrupted")]
    CorruptState,
}
