use crate::config::atomic_rename;
use crate::ports::MeterStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use serde_json::Value;
use std::{fs, io, path::PathBuf};
use tracing::warn;

pub const SAVE_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub meters: BTreeMap<String, f32>,
}

/// Pulls numeric meter entries out of either save shape. Older saves were a
/// bare `{"Love": 100, ...}` object. Non-numeric entries are dropped here and
/// unknown names are left for `MeterBank::restore` to skip.
fn numeric_meters(doc: &Value) -> Option<BTreeMap<String, f32>> {
    let obj = doc.as_object()?;
    let meters = match obj.get("meters") {
        Some(inner) => {
            if let Some(v) = obj.get("version").and_then(Value::as_u64) {
                if v > u64::from(SAVE_VERSION) {
                    warn!(version = v, "save file is newer than this build");
                }
            }
            inner.as_object()?
        }
        None => obj,
    };
    Some(
        meters
            .iter()
            .filter_map(|(name, v)| Some((name.clone(), v.as_f64()? as f32)))
            .collect(),
    )
}

/// Meter values in a JSON file, replaced atomically on every save.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MeterStore for JsonFileStore {
    /// A missing, unreadable or malformed file loads as `None`; it never
    /// fails the game.
    fn load(&mut self) -> Result<Option<BTreeMap<String, f32>>> {
        let s = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read save file");
                return Ok(None);
            }
        };
        let doc = match serde_json::from_str::<Value>(&s) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring malformed save file");
                return Ok(None);
            }
        };
        let meters = numeric_meters(&doc);
        if meters.is_none() {
            warn!(path = %self.path.display(), "save file has no meter object");
        }
        Ok(meters)
    }

    fn save(&mut self, values: &BTreeMap<String, f32>) -> Result<()> {
        let save = SaveFile {
            version: SAVE_VERSION,
            saved_at: Utc::now(),
            meters: values.clone(),
        };
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(&save)?;
        fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
        atomic_rename(&tmp, &self.path)?;
        Ok(())
    }
}
