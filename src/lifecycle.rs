//! Game-over detection, the retry / continue transitions and idle
//! animation selection.
//!
//! ```text
//!   PLAYING ──zeroed meter──▶ GAME_OVER ──retry──▶ PLAYING
//!                                 │
//!                                 └──continue──▶ ZOMBIE
//! ```

use crate::meters::{MeterBank, MeterKind};
use crate::model::{Animation, GameState, Phase};

/// Enters GAME_OVER if a meter has hit zero. Returns the meter that caused
/// the transition. Zombies are already past their loss and keep playing.
pub fn check_for_loss(state: &mut GameState, bank: &MeterBank) -> Option<MeterKind> {
    if state.phase() != Phase::Playing {
        return None;
    }
    let reason = bank.zeroed_meter()?;
    state.is_game_over = true;
    Some(reason)
}

/// GAME_OVER → PLAYING with full meters. No-op in any other phase.
/// The caller still has to abort the in-progress action.
pub fn retry(state: &mut GameState, bank: &mut MeterBank) -> bool {
    if !state.is_game_over {
        return false;
    }
    bank.reset_all();
    state.is_game_over = false;
    state.is_zombie = false;
    state.current_action = None;
    true
}

/// GAME_OVER → ZOMBIE, meters untouched.
pub fn continue_as_zombie(state: &mut GameState) -> bool {
    if !state.is_game_over {
        return false;
    }
    state.is_game_over = false;
    state.is_zombie = true;
    state.current_action = None;
    true
}

/// The animation the cat should be showing right now.
pub fn current_animation(state: &GameState, bank: &MeterBank) -> Animation {
    if state.is_game_over {
        return Animation::Sleeping;
    }
    if let Some(kind) = state.current_action {
        return kind.spec().animation;
    }
    idle_animation(state, bank)
}

/// Standing, unless every meter is critical and the cat is not a zombie.
pub fn idle_animation(state: &GameState, bank: &MeterBank) -> Animation {
    if !state.is_zombie && bank.is_critical() {
        Animation::Sleeping
    } else {
        Animation::Standing
    }
}

/// Buttons accept input only while nothing blocks a new action.
pub fn inputs_enabled(state: &GameState) -> bool {
    !state.is_game_over && state.current_action.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionKind;
    use crate::model::{DecayRates, METER_MAX};

    fn bank(v: f32) -> MeterBank {
        MeterBank::new(v, DecayRates::default(), 20.0)
    }

    #[test]
    fn loss_detected_once() {
        let mut st = GameState::new();
        let mut b = bank(METER_MAX);
        assert_eq!(check_for_loss(&mut st, &b), None);
        b.apply(MeterKind::Thirst, -METER_MAX);
        assert_eq!(check_for_loss(&mut st, &b), Some(MeterKind::Thirst));
        assert!(st.is_game_over);
        assert_eq!(check_for_loss(&mut st, &b), None);
    }

    #[test]
    fn zombie_is_not_checked_for_loss() {
        let mut st = GameState::new();
        let b = bank(0.0);
        check_for_loss(&mut st, &b).unwrap();
        assert!(continue_as_zombie(&mut st));
        assert_eq!(check_for_loss(&mut st, &b), None);
        assert_eq!(st.phase(), Phase::Zombie);
    }

    #[test]
    fn retry_resets_meters_and_flags() {
        let mut st = GameState {
            current_action: Some(ActionKind::Feed),
            is_game_over: true,
            is_zombie: false,
        };
        let mut b = bank(0.0);
        assert!(retry(&mut st, &mut b));
        assert_eq!(st, GameState::new());
        assert!(b.iter().all(|(_, v)| v == METER_MAX));
    }

    #[test]
    fn transitions_need_game_over() {
        let mut st = GameState::new();
        let mut b = bank(5.0);
        assert!(!retry(&mut st, &mut b));
        assert!(!continue_as_zombie(&mut st));
        assert_eq!(b.value(MeterKind::Love), 5.0);
        assert_eq!(st, GameState::new());
    }

    #[test]
    fn continue_keeps_meters() {
        let mut st = GameState::new();
        let mut b = bank(10.0);
        b.apply(MeterKind::Fun, -10.0);
        check_for_loss(&mut st, &b).unwrap();
        let before = b.snapshot();
        assert!(continue_as_zombie(&mut st));
        assert!(st.is_zombie && !st.is_game_over);
        assert_eq!(b.snapshot(), before);
    }

    #[test]
    fn animation_selection() {
        let mut st = GameState::new();
        let low = bank(10.0);
        assert_eq!(current_animation(&st, &bank(METER_MAX)), Animation::Standing);
        assert_eq!(current_animation(&st, &low), Animation::Sleeping);

        st.current_action = Some(ActionKind::Play);
        assert_eq!(current_animation(&st, &low), Animation::Playing);
        assert!(!inputs_enabled(&st));

        st.current_action = None;
        st.is_zombie = true;
        assert_eq!(current_animation(&st, &low), Animation::Standing);

        st.is_zombie = false;
        st.is_game_over = true;
        assert_eq!(current_animation(&st, &bank(METER_MAX)), Animation::Sleeping);
        assert!(!inputs_enabled(&st));
    }
}
