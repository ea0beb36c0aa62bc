//! Virtual cat simulation core.
//!
//! Four meters (Love, Hunger, Thirst, Fun) decay on a repeating timer and
//! are topped up by player actions (Pet, Feed, Water, Play). A zeroed meter
//! ends the game; the player may retry with full meters or continue as a
//! zombie with the meters as they are.
//!
//! [`game::Game`] owns all of it. Front-ends implement
//! [`ports::Presenter`], feed clock time into [`game::Game::advance`] and
//! forward button presses to the `on_*` methods.

pub mod actions;
pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod lifecycle;
pub mod meters;
pub mod model;
pub mod ports;
pub mod scheduler;
pub mod storage;

pub use actions::{ActionKind, Rejection};
pub use error::GameError;
pub use game::Game;
pub use meters::{MeterBank, MeterKind};
pub use model::{Animation, GameState, Rules};
pub use ports::{MeterStore, Presenter};
