use crate::actions::{ActionController, ActionKind, ActionOutcome};
use crate::error::GameError;
use crate::lifecycle;
use crate::meters::{MeterBank, MeterKind};
use crate::model::{Animation, GameState, Rules, TimerEvent, METER_MAX};
use crate::ports::{MeterStore, Presenter};
use crate::scheduler::{Scheduler, TimerHandle};
use tracing::{debug, info, warn};

/// Every entry point ends the same way: persist if meters changed, check for
/// a zeroed meter, render, then sync animation and inputs with the presenter.
pub struct Game {
    rules: Rules,
    state: GameState,
    bank: MeterBank,
    actions: ActionController,
    timers: Scheduler<TimerEvent>,
    store: Option<Box<dyn MeterStore>>,
    decay_timer: Option<TimerHandle>,
    shown_animation: Option<Animation>,
    shown_inputs: Option<bool>,
}

impl Game {
    /// Builds a fresh game and restores saved meters, if any.
    pub fn new(rules: Rules, store: Option<Box<dyn MeterStore>>) -> Self {
        let mut bank = MeterBank::new(
            rules.initial_value,
            rules.decay_rates,
            rules.critical_threshold,
        );
        let mut store = store;
        if let Some(s) = store.as_mut() {
            match s.load() {
                Ok(Some(saved)) => {
                    bank.restore(&saved);
                    info!(meters = ?bank.snapshot(), "restored saved meters");
                }
                Ok(None) => debug!("no saved meters"),
                Err(e) => warn!(error = %e, "could not load saved meters"),
            }
        }
        Self {
            actions: ActionController::new(rules.cooldown_ms, rules.busy_ms),
            rules,
            state: GameState::new(),
            bank,
            timers: Scheduler::new(),
            store,
            decay_timer: None,
            shown_animation: None,
            shown_inputs: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn meters(&self) -> &MeterBank {
        &self.bank
    }

    pub fn actions(&self) -> &ActionController {
        &self.actions
    }

    /// Arms the decay timer and pushes the full initial picture. Calling it
    /// again re-arms the timer from `now`.
    pub fn start(&mut self, now: u64, presenter: &mut dyn Presenter) {
        if let Some(h) = self.decay_timer.take() {
            self.timers.cancel(h);
        }
        self.decay_timer = Some(self.timers.schedule_repeating(
            now,
            self.rules.decay_interval_ms,
            TimerEvent::DecayTick,
        ));
        self.shown_animation = None;
        self.shown_inputs = None;
        info!(
            decay_interval_ms = self.rules.decay_interval_ms,
            "game started"
        );
        self.check_for_loss(presenter);
        self.render_meters(presenter);
        self.sync(presenter);
    }

    /// Fires every timer due at or before `now`, in time order.
    pub fn advance(&mut self, now: u64, presenter: &mut dyn Presenter) {
        while let Some(fired) = self.timers.pop_due(now) {
            match fired.event {
                TimerEvent::DecayTick => self.on_decay_tick(presenter),
                TimerEvent::ActionComplete => self.on_action_complete(fired.handle, presenter),
            }
        }
    }

    fn on_decay_tick(&mut self, presenter: &mut dyn Presenter) {
        if self.state.is_game_over {
            return;
        }
        if self.state.is_busy() && !self.rules.decay_while_busy {
            return;
        }
        self.bank.decay_all();
        self.persist();
        self.check_for_loss(presenter);
        self.render_meters(presenter);
        self.sync(presenter);
    }

    fn on_action_complete(&mut self, handle: TimerHandle, presenter: &mut dyn Presenter) {
        if let Some(kind) = self.actions.complete(handle, &mut self.state) {
            debug!(action = %kind, "action finished");
            self.sync(presenter);
        }
    }

    pub fn on_action_button_pressed(
        &mut self,
        kind: ActionKind,
        now: u64,
        presenter: &mut dyn Presenter,
    ) -> ActionOutcome {
        let outcome = self.actions.request(
            kind,
            now,
            &mut self.state,
            &mut self.bank,
            &mut self.timers,
        );
        match outcome {
            Ok(spec) => {
                info!(action = %kind, meter = %spec.target, value = self.bank.value(spec.target), "action started");
                self.persist();
                self.check_for_loss(presenter);
                presenter.render_meter(spec.target, self.bank.value(spec.target), METER_MAX);
                self.sync(presenter);
            }
            Err(reason) => debug!(action = %kind, %reason, "action ignored"),
        }
        outcome
    }

    /// Name-based variant for string-keyed input sources.
    pub fn on_action_named(
        &mut self,
        name: &str,
        now: u64,
        presenter: &mut dyn Presenter,
    ) -> Result<ActionOutcome, GameError> {
        let kind = name.parse::<ActionKind>()?;
        Ok(self.on_action_button_pressed(kind, now, presenter))
    }

    pub fn on_retry_pressed(&mut self, presenter: &mut dyn Presenter) -> bool {
        if !lifecycle::retry(&mut self.state, &mut self.bank) {
            return false;
        }
        self.actions.abort(&mut self.state, &mut self.timers);
        info!("retry: meters reset");
        self.persist();
        presenter.hide_end_screen();
        self.render_meters(presenter);
        self.sync(presenter);
        true
    }

    pub fn on_continue_pressed(&mut self, presenter: &mut dyn Presenter) -> bool {
        if !lifecycle::continue_as_zombie(&mut self.state) {
            return false;
        }
        self.actions.abort(&mut self.state, &mut self.timers);
        info!(meters = ?self.bank.snapshot(), "continuing as zombie");
        presenter.hide_end_screen();
        self.sync(presenter);
        true
    }

    fn check_for_loss(&mut self, presenter: &mut dyn Presenter) {
        if let Some(reason) = lifecycle::check_for_loss(&mut self.state, &self.bank) {
            info!(meter = %reason, "game over");
            self.sync(presenter);
            presenter.show_end_screen(reason);
        }
    }

    fn render_meters(&self, presenter: &mut dyn Presenter) {
        for (kind, value) in self.bank.iter() {
            presenter.render_meter(kind, value, METER_MAX);
        }
    }

    /// Tells the presenter about animation and input changes only.
    fn sync(&mut self, presenter: &mut dyn Presenter) {
        let animation = lifecycle::current_animation(&self.state, &self.bank);
        if self.shown_animation != Some(animation) {
            presenter.play_animation(animation);
            self.shown_animation = Some(animation);
        }
        let enabled = lifecycle::inputs_enabled(&self.state);
        if self.shown_inputs != Some(enabled) {
            presenter.set_inputs_enabled(enabled);
            self.shown_inputs = Some(enabled);
        }
    }

    fn persist(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if let Err(e) = store.save(&self.bank.snapshot()) {
            warn!(error = %e, "could not save meters");
        }
    }

    /// Value of one meter, for presenters that poll instead of listening.
    pub fn meter(&self, kind: MeterKind) -> f32 {
        self.bank.value(kind)
    }
}
