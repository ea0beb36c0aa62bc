/// Errors surfaced by the name-based entry points of the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The name does not match any of Love, Hunger, Thirst, Fun.
    #[error("unknown meter: {0}")]
    InvalidMeter(String),

    /// The name does not match any of Pet, Feed, Water, Play.
    #[error("unknown action: {0}")]
    InvalidAction(String),
}
