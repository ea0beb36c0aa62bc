use crate::model::Rules;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fps_cap: u32,
    pub enable_color: bool,
    /// Save meters to disk after every change.
    pub persist: bool,
    pub rules: Rules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            enable_color: true,
            persist: true,
            rules: Rules::default(),
        }
    }
}

pub struct Paths {
    pub save_path: PathBuf,
    pub settings_path: PathBuf,
    pub log_path: PathBuf,
}

pub fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "petsim", "PetSim")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(Paths {
        save_path: dir.join("save.json"),
        settings_path: dir.join("settings.json"),
        log_path: dir.join("petsim.log"),
    })
}

/// Missing or malformed settings fall back to defaults.
pub fn load_settings(path: &Path) -> Settings {
    let Ok(s) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match serde_json::from_str::<Settings>(&s) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "using default settings");
            Settings::default()
        }
    }
}

pub fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

pub fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename-over-existing fails on Windows
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)
        .with_context(|| format!("renaming {} to {}", from.display(), to.display()))?;
    Ok(())
}
