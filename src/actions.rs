use crate::error::GameError;
use crate::meters::{MeterBank, MeterKind};
use crate::model::{Animation, GameState, TimerEvent};
use crate::scheduler::{Scheduler, TimerHandle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Pet,
    Feed,
    Water,
    Play,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionSpec {
    pub kind: ActionKind,
    pub target: MeterKind,
    pub effect: f32,
    pub animation: Animation,
}

/// Indexed by `ActionKind as usize`.
pub static ACTIONS: [ActionSpec; 4] = [
    ActionSpec {
        kind: ActionKind::Pet,
        target: MeterKind::Love,
        effect: 15.0,
        animation: Animation::Sitting,
    },
    ActionSpec {
        kind: ActionKind::Feed,
        target: MeterKind::Hunger,
        effect: 20.0,
        animation: Animation::Eating,
    },
    ActionSpec {
        kind: ActionKind::Water,
        target: MeterKind::Thirst,
        effect: 20.0,
        animation: Animation::Eating,
    },
    ActionSpec {
        kind: ActionKind::Play,
        target: MeterKind::Fun,
        effect: 20.0,
        animation: Animation::Playing,
    },
];

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Pet,
        ActionKind::Feed,
        ActionKind::Water,
        ActionKind::Play,
    ];

    pub fn spec(self) -> &'static ActionSpec {
        &ACTIONS[self as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Pet => "Pet",
            ActionKind::Feed => "Feed",
            ActionKind::Water => "Water",
            ActionKind::Play => "Play",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| GameError::InvalidAction(s.to_string()))
    }
}

/// Why a request had no effect. Callers treat all of these as a silent no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    GameOver,
    Busy(ActionKind),
    CoolingDown { remaining_ms: u64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::GameOver => write!(f, "game over"),
            Rejection::Busy(k) => write!(f, "busy with {k}"),
            Rejection::CoolingDown { remaining_ms } => {
                write!(f, "cooling down ({remaining_ms}ms left)")
            }
        }
    }
}

pub type ActionOutcome = Result<&'static ActionSpec, Rejection>;

/// Owns cooldown bookkeeping and the single pending completion timer.
/// The in-progress action itself lives in [`GameState::current_action`].
#[derive(Clone, Debug)]
pub struct ActionController {
    cooldown_ms: u64,
    busy_ms: u64,
    last_used: [Option<u64>; 4],
    pending: Option<TimerHandle>,
}

impl ActionController {
    pub fn new(cooldown_ms: u64, busy_ms: u64) -> Self {
        Self {
            cooldown_ms,
            busy_ms,
            last_used: [None; 4],
            pending: None,
        }
    }

    pub fn last_used(&self, kind: ActionKind) -> Option<u64> {
        self.last_used[kind as usize]
    }

    pub fn cooldown_remaining(&self, kind: ActionKind, now: u64) -> u64 {
        match self.last_used(kind) {
            Some(at) => self.cooldown_ms.saturating_sub(now.saturating_sub(at)),
            None => 0,
        }
    }

    pub fn pending(&self) -> Option<TimerHandle> {
        self.pending
    }

    pub fn check(&self, kind: ActionKind, now: u64, state: &GameState) -> Result<(), Rejection> {
        if state.is_game_over {
            return Err(Rejection::GameOver);
        }
        if let Some(current) = state.current_action {
            return Err(Rejection::Busy(current));
        }
        match self.cooldown_remaining(kind, now) {
            0 => Ok(()),
            remaining_ms => Err(Rejection::CoolingDown { remaining_ms }),
        }
    }

    /// Applies the action's effect and enters the busy window. On rejection
    /// nothing is mutated.
    pub fn request(
        &mut self,
        kind: ActionKind,
        now: u64,
        state: &mut GameState,
        bank: &mut MeterBank,
        timers: &mut Scheduler<TimerEvent>,
    ) -> ActionOutcome {
        self.check(kind, now, state)?;

        let spec = kind.spec();
        bank.apply(spec.target, spec.effect);
        state.current_action = Some(kind);
        self.last_used[kind as usize] = Some(now);

        if let Some(stale) = self.pending.take() {
            timers.cancel(stale);
        }
        self.pending = Some(timers.schedule_once(now, self.busy_ms, TimerEvent::ActionComplete));
        Ok(spec)
    }

    /// Ends the busy window if `handle` is the pending completion. Returns the
    /// finished action, or `None` for a stale or unknown handle.
    pub fn complete(&mut self, handle: TimerHandle, state: &mut GameState) -> Option<ActionKind> {
        if self.pending != Some(handle) {
            return None;
        }
        self.pending = None;
        state.current_action.take()
    }

    /// Drops any in-progress action without waiting for its timer.
    pub fn abort(&mut self, state: &mut GameState, timers: &mut Scheduler<TimerEvent>) {
        if let Some(h) = self.pending.take() {
            timers.cancel(h);
        }
        state.current_action = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DecayRates;

    struct Rig {
        ctl: ActionController,
        state: GameState,
        bank: MeterBank,
        timers: Scheduler<TimerEvent>,
    }

    fn rig(start: f32) -> Rig {
        Rig {
            ctl: ActionController::new(10_000, 10_000),
            state: GameState::new(),
            bank: MeterBank::new(start, DecayRates::default(), 20.0),
            timers: Scheduler::new(),
        }
    }

    impl Rig {
        fn request(&mut self, kind: ActionKind, now: u64) -> ActionOutcome {
            self.ctl
                .request(kind, now, &mut self.state, &mut self.bank, &mut self.timers)
        }

        fn finish(&mut self, now: u64) -> Option<ActionKind> {
            let fired = self.timers.pop_due(now)?;
            self.ctl.complete(fired.handle, &mut self.state)
        }
    }

    #[test]
    fn table_is_indexed_by_kind() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.spec().kind, kind);
        }
        assert_eq!(ActionKind::Pet.spec().target, MeterKind::Love);
        assert_eq!(ActionKind::Pet.spec().effect, 15.0);
    }

    #[test]
    fn parse_rejects_unknown_action() {
        assert_eq!("Water".parse::<ActionKind>(), Ok(ActionKind::Water));
        assert_eq!(
            "Bathe".parse::<ActionKind>(),
            Err(GameError::InvalidAction("Bathe".into()))
        );
    }

    #[test]
    fn first_use_applies_effect_and_goes_busy() {
        let mut r = rig(50.0);
        let spec = r.request(ActionKind::Feed, 0).unwrap();
        assert_eq!(spec.animation, Animation::Eating);
        assert_eq!(r.bank.value(MeterKind::Hunger), 70.0);
        assert_eq!(r.state.current_action, Some(ActionKind::Feed));
        assert_eq!(r.ctl.last_used(ActionKind::Feed), Some(0));
        assert_eq!(r.timers.len(), 1);
    }

    #[test]
    fn busy_blocks_every_action() {
        let mut r = rig(50.0);
        r.request(ActionKind::Pet, 0).unwrap();
        let before = r.bank.clone();
        assert_eq!(
            r.request(ActionKind::Play, 500),
            Err(Rejection::Busy(ActionKind::Pet))
        );
        assert_eq!(r.bank, before);
        assert_eq!(r.ctl.last_used(ActionKind::Play), None);
    }

    #[test]
    fn cooldown_blocks_same_action() {
        let mut r = rig(50.0);
        r.request(ActionKind::Water, 1_000).unwrap();
        assert_eq!(r.finish(11_000), Some(ActionKind::Water));
        // busy window over, but a shorter cooldown would be needed to reuse now
        r.ctl.cooldown_ms = 20_000;
        let thirst = r.bank.value(MeterKind::Thirst);
        assert_eq!(
            r.request(ActionKind::Water, 11_000),
            Err(Rejection::CoolingDown { remaining_ms: 10_000 })
        );
        assert_eq!(r.bank.value(MeterKind::Thirst), thirst);
        assert_eq!(r.ctl.last_used(ActionKind::Water), Some(1_000));
        assert!(r.request(ActionKind::Water, 21_000).is_ok());
    }

    #[test]
    fn game_over_blocks_requests() {
        let mut r = rig(50.0);
        r.state.is_game_over = true;
        assert_eq!(r.request(ActionKind::Pet, 0), Err(Rejection::GameOver));
        assert_eq!(r.bank.value(MeterKind::Love), 50.0);
    }

    #[test]
    fn completion_frees_the_slot() {
        let mut r = rig(50.0);
        r.request(ActionKind::Play, 0).unwrap();
        assert_eq!(r.finish(9_999), None);
        assert!(r.state.is_busy());
        assert_eq!(r.finish(10_000), Some(ActionKind::Play));
        assert!(!r.state.is_busy());
        assert!(r.request(ActionKind::Pet, 10_000).is_ok());
    }

    #[test]
    fn stale_handle_is_ignored() {
        let mut r = rig(50.0);
        r.request(ActionKind::Play, 0).unwrap();
        let stale = r.ctl.pending().unwrap();
        r.ctl.abort(&mut r.state, &mut r.timers);
        assert!(r.timers.is_empty());
        r.request(ActionKind::Pet, 100).unwrap();
        assert_eq!(r.ctl.complete(stale, &mut r.state), None);
        assert_eq!(r.state.current_action, Some(ActionKind::Pet));
    }
}
