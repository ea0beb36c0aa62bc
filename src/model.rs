use crate::actions::ActionKind;
use serde::{Deserialize, Serialize};

/// Upper bound shared by every meter.
pub const METER_MAX: f32 = 100.0;

pub const DEFAULT_DECAY_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_INITIAL_VALUE: f32 = METER_MAX;
pub const DEFAULT_COOLDOWN_MS: u64 = 10_000;
pub const DEFAULT_BUSY_MS: u64 = 10_000;
pub const DEFAULT_CRITICAL_THRESHOLD: f32 = 20.0;

/// Amount removed from each meter per decay tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecayRates {
    pub love: f32,
    pub hunger: f32,
    pub thirst: f32,
    pub fun: f32,
}

impl Default for DecayRates {
    fn default() -> Self {
        Self {
            love: 1.0,
            hunger: 2.0,
            thirst: 3.0,
            fun: 1.5,
        }
    }
}

/// Game tuning. Cooldown and busy window are kept apart even though they
/// currently share a value: one throttles a single action, the other locks
/// out every action while the cat is busy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub decay_interval_ms: u64,
    pub initial_value: f32,
    pub decay_rates: DecayRates,
    pub cooldown_ms: u64,
    pub busy_ms: u64,
    pub critical_threshold: f32,
    pub decay_while_busy: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            decay_interval_ms: DEFAULT_DECAY_INTERVAL_MS,
            initial_value: DEFAULT_INITIAL_VALUE,
            decay_rates: DecayRates::default(),
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            busy_ms: DEFAULT_BUSY_MS,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
            decay_while_busy: false,
        }
    }
}

/// Animation keys the presenter knows how to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animation {
    Standing,
    Sitting,
    Eating,
    Playing,
    Sleeping,
}

impl Animation {
    pub fn key(self) -> &'static str {
        match self {
            Animation::Standing => "idle_standing",
            Animation::Sitting => "idle_sitting",
            Animation::Eating => "idle_eating",
            Animation::Playing => "idle_playing",
            Animation::Sleeping => "idle_sleeping",
        }
    }
}

/// Timer payloads. Declaration order is the firing order for timers due at
/// the same instant, so decay runs before action completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerEvent {
    DecayTick,
    ActionComplete,
}

/// Coarse lifecycle phase, derived from the [`GameState`] flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver,
    Zombie,
}

/// Process-wide play state. Owned by [`crate::game::Game`]; only the action
/// controller and the lifecycle functions mutate it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameState {
    pub current_action: Option<ActionKind>,
    pub is_game_over: bool,
    pub is_zombie: bool,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.is_game_over {
            Phase::GameOver
        } else if self.is_zombie {
            Phase::Zombie
        } else {
            Phase::Playing
        }
    }

    pub fn is_busy(&self) -> bool {
        self.current_action.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_use_canonical_configuration() {
        let r = Rules::default();
        assert_eq!(r.decay_interval_ms, 5_000);
        assert_eq!(r.initial_value, 100.0);
        assert_eq!(r.cooldown_ms, r.busy_ms);
        assert!(!r.decay_while_busy);
    }

    #[test]
    fn partial_rules_json_falls_back_to_defaults() {
        let r: Rules = serde_json::from_str(r#"{"decay_interval_ms": 2000}"#).unwrap();
        assert_eq!(r.decay_interval_ms, 2_000);
        assert_eq!(r.busy_ms, DEFAULT_BUSY_MS);
        assert_eq!(r.decay_rates, DecayRates::default());
    }

    #[test]
    fn phase_follows_flags() {
        let mut st = GameState::new();
        assert_eq!(st.phase(), Phase::Playing);
        st.is_game_over = true;
        assert_eq!(st.phase(), Phase::GameOver);
        st.is_game_over = false;
        st.is_zombie = true;
        assert_eq!(st.phase(), Phase::Zombie);
    }
}
