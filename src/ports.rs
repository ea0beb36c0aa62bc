//! Collaborator traits: what the core drives and what persists it.
//!
//! ```text
//!   Presenter  <── Game ──>  MeterStore
//!      │            ▲
//!      └── input ───┘
//! ```

use crate::meters::MeterKind;
use crate::model::Animation;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Core → presentation signals. Input flows the other way through the
/// `on_*` methods of [`crate::game::Game`].
pub trait Presenter {
    fn play_animation(&mut self, animation: Animation);
    fn set_inputs_enabled(&mut self, enabled: bool);
    fn render_meter(&mut self, meter: MeterKind, value: f32, max: f32);
    /// The player answers through `Game::on_retry_pressed` or
    /// `Game::on_continue_pressed`.
    fn show_end_screen(&mut self, reason: MeterKind);
    fn hide_end_screen(&mut self);
}

/// Meter persistence. Values are keyed by meter name so that stale or
/// foreign entries can be skipped on load.
pub trait MeterStore {
    fn load(&mut self) -> anyhow::Result<Option<BTreeMap<String, f32>>>;
    fn save(&mut self, values: &BTreeMap<String, f32>) -> anyhow::Result<()>;
}

/// In-process store. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemorySlot>>,
}

#[derive(Debug, Default)]
struct MemorySlot {
    values: Option<BTreeMap<String, f32>>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: BTreeMap<String, f32>) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().values = Some(values);
        store
    }

    pub fn values(&self) -> Option<BTreeMap<String, f32>> {
        self.inner.borrow().values.clone()
    }

    pub fn save_count(&self) -> usize {
        self.inner.borrow().saves
    }
}

impl MeterStore for MemoryStore {
    fn load(&mut self) -> anyhow::Result<Option<BTreeMap<String, f32>>> {
        Ok(self.values())
    }

    fn save(&mut self, values: &BTreeMap<String, f32>) -> anyhow::Result<()> {
        let mut slot = self.inner.borrow_mut();
        slot.values = Some(values.clone());
        slot.saves += 1;
        Ok(())
    }
}
