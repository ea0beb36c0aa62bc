use crate::error::GameError;
use crate::model::{DecayRates, METER_MAX};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MeterKind {
    Love,
    Hunger,
    Thirst,
    Fun,
}

impl MeterKind {
    /// Fixed enumeration order. Ties in [`MeterBank::zeroed_meter`] resolve
    /// to the earliest entry.
    pub const ALL: [MeterKind; 4] = [
        MeterKind::Love,
        MeterKind::Hunger,
        MeterKind::Thirst,
        MeterKind::Fun,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MeterKind::Love => "Love",
            MeterKind::Hunger => "Hunger",
            MeterKind::Thirst => "Thirst",
            MeterKind::Fun => "Fun",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MeterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MeterKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MeterKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| GameError::InvalidMeter(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Meter {
    pub value: f32,
    pub decay_rate: f32,
}

fn clamp_meter(v: f32) -> f32 {
    v.clamp(0.0, METER_MAX)
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeterBank {
    meters: [Meter; 4],
    critical_threshold: f32,
}

impl MeterBank {
    pub fn new(initial: f32, rates: DecayRates, critical_threshold: f32) -> Self {
        let value = clamp_meter(initial);
        let meter = |rate: f32| Meter {
            value,
            decay_rate: rate.max(0.0),
        };
        Self {
            meters: [
                meter(rates.love),
                meter(rates.hunger),
                meter(rates.thirst),
                meter(rates.fun),
            ],
            critical_threshold,
        }
    }

    pub fn value(&self, kind: MeterKind) -> f32 {
        self.meters[kind.index()].value
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeterKind, f32)> + '_ {
        MeterKind::ALL.into_iter().map(move |k| (k, self.value(k)))
    }

    pub fn decay_all(&mut self) {
        for m in &mut self.meters {
            m.value = clamp_meter(m.value - m.decay_rate);
        }
    }

    /// Adds `amount` to one meter, clamped into `[0, METER_MAX]`.
    pub fn apply(&mut self, kind: MeterKind, amount: f32) {
        if !amount.is_finite() {
            return;
        }
        let m = &mut self.meters[kind.index()];
        m.value = clamp_meter(m.value + amount);
    }

    pub fn apply_named(&mut self, name: &str, amount: f32) -> Result<(), GameError> {
        let kind = name.parse::<MeterKind>()?;
        self.apply(kind, amount);
        Ok(())
    }

    pub fn reset_all(&mut self) {
        for m in &mut self.meters {
            m.value = METER_MAX;
        }
    }

    pub fn snapshot(&self) -> BTreeMap<String, f32> {
        self.iter().map(|(k, v)| (k.name().to_string(), v)).collect()
    }

    /// Loads saved values. Unknown names and non-finite values are skipped;
    /// meters absent from `data` keep their current value.
    pub fn restore(&mut self, data: &BTreeMap<String, f32>) {
        for (name, &value) in data {
            let kind = match name.parse::<MeterKind>() {
                Ok(k) => k,
                Err(e) => {
                    warn!(error = %e, "ignoring saved value");
                    continue;
                }
            };
            if !value.is_finite() {
                warn!(meter = %kind, "ignoring non-finite saved value");
                continue;
            }
            self.meters[kind.index()].value = clamp_meter(value);
        }
    }

    /// True when every meter sits below the critical threshold.
    pub fn is_critical(&self) -> bool {
        self.meters
            .iter()
            .all(|m| m.value < self.critical_threshold)
    }

    pub fn zeroed_meter(&self) -> Option<MeterKind> {
        MeterKind::ALL
            .into_iter()
            .find(|&k| self.value(k) <= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_bank() -> MeterBank {
        MeterBank::new(METER_MAX, DecayRates::default(), 20.0)
    }

    #[test]
    fn single_decay_from_max() {
        let mut bank = full_bank();
        bank.decay_all();
        assert_eq!(bank.value(MeterKind::Love), 99.0);
        assert_eq!(bank.value(MeterKind::Hunger), 98.0);
        assert_eq!(bank.value(MeterKind::Thirst), 97.0);
        assert_eq!(bank.value(MeterKind::Fun), 98.5);
    }

    #[test]
    fn fifty_decays_clamp_at_zero() {
        let mut bank = full_bank();
        for _ in 0..50 {
            bank.decay_all();
        }
        assert_eq!(bank.value(MeterKind::Love), 50.0);
        assert_eq!(bank.value(MeterKind::Hunger), 0.0);
        assert_eq!(bank.value(MeterKind::Thirst), 0.0);
        assert_eq!(bank.value(MeterKind::Fun), 25.0);
    }

    #[test]
    fn apply_clamps_to_max() {
        let mut bank = full_bank();
        bank.decay_all();
        bank.apply(MeterKind::Love, 500.0);
        assert_eq!(bank.value(MeterKind::Love), METER_MAX);
        bank.apply(MeterKind::Love, -500.0);
        assert_eq!(bank.value(MeterKind::Love), 0.0);
    }

    #[test]
    fn apply_zero_is_idempotent() {
        let mut bank = full_bank();
        bank.decay_all();
        let before = bank.snapshot();
        for k in MeterKind::ALL {
            bank.apply(k, 0.0);
        }
        assert_eq!(bank.snapshot(), before);
    }

    #[test]
    fn apply_named_rejects_unknown_meter() {
        let mut bank = full_bank();
        let err = bank.apply_named("Sleep", 5.0).unwrap_err();
        assert_eq!(err, GameError::InvalidMeter("Sleep".into()));
        assert_eq!(bank, full_bank());
        bank.decay_all();
        bank.apply_named("Thirst", 1.0).unwrap();
        assert_eq!(bank.value(MeterKind::Thirst), 98.0);
    }

    #[test]
    fn zeroed_meter_prefers_enumeration_order() {
        let mut bank = full_bank();
        assert_eq!(bank.zeroed_meter(), None);
        bank.apply(MeterKind::Fun, -100.0);
        assert_eq!(bank.zeroed_meter(), Some(MeterKind::Fun));
        bank.apply(MeterKind::Love, -100.0);
        assert_eq!(bank.zeroed_meter(), Some(MeterKind::Love));
        bank.apply(MeterKind::Hunger, -100.0);
        assert_eq!(bank.zeroed_meter(), Some(MeterKind::Love));
    }

    #[test]
    fn critical_requires_every_meter_low() {
        let mut bank = MeterBank::new(19.0, DecayRates::default(), 20.0);
        assert!(bank.is_critical());
        bank.apply(MeterKind::Fun, 1.0);
        assert!(!bank.is_critical());
    }

    #[test]
    fn restore_round_trips_snapshot() {
        let mut bank = full_bank();
        for _ in 0..7 {
            bank.decay_all();
        }
        let snap = bank.snapshot();
        let mut other = full_bank();
        other.restore(&snap);
        assert_eq!(other, bank);
    }

    #[test]
    fn restore_skips_unknown_and_keeps_missing() {
        let mut bank = full_bank();
        let mut data = BTreeMap::new();
        data.insert("Hunger".to_string(), 42.0);
        data.insert("Sleep".to_string(), 1.0);
        data.insert("Fun".to_string(), f32::NAN);
        data.insert("Thirst".to_string(), 250.0);
        bank.restore(&data);
        assert_eq!(bank.value(MeterKind::Love), METER_MAX);
        assert_eq!(bank.value(MeterKind::Hunger), 42.0);
        assert_eq!(bank.value(MeterKind::Thirst), METER_MAX);
        assert_eq!(bank.value(MeterKind::Fun), METER_MAX);
    }

    #[test]
    fn reset_all_fills_every_meter() {
        let mut bank = MeterBank::new(10.0, DecayRates::default(), 20.0);
        bank.reset_all();
        assert!(bank.iter().all(|(_, v)| v == METER_MAX));
    }
}
