use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use terraspread::SpreadPolicy;
use tracing::warn;

pub(crate) const DEFAULT_TICK_MS: u64 = 300;
pub(crate) const MIN_TICK_MS: u64 = 20;
pub(crate) const MAX_TICK_MS: u64 = 5_000;

/// Grow a terrain map in the terminal.
#[derive(Parser, Debug)]
#[command(version)]
pub(crate) struct Args {
    /// map rows (default: fit the terminal)
    #[arg(long)]
    pub(crate) rows: Option<usize>,

    /// map columns (default: fit the terminal)
    #[arg(long)]
    pub(crate) cols: Option<usize>,

    /// seed string; a random one is generated when omitted
    #[arg(long)]
    pub(crate) seed: Option<String>,

    /// milliseconds between simulation steps (overrides the settings file)
    #[arg(long)]
    pub(crate) ms: Option<u64>,

    /// settings file to read instead of the per-user one
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// write tracing output here (filter with RUST_LOG)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,

    /// start paused
    #[arg(long)]
    pub(crate) paused: bool,

    /// run this many steps without a terminal UI and print a census
    #[arg(long, value_name = "STEPS")]
    pub(crate) headless: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) tick_ms: u64,
    pub(crate) stop_when_stable: bool,
    pub(crate) policy: SpreadPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            stop_when_stable: true,
            policy: SpreadPolicy::default(),
        }
    }
}

impl Settings {
    pub(crate) fn clamped_tick_ms(&self) -> u64 {
        self.tick_ms.clamp(MIN_TICK_MS, MAX_TICK_MS)
    }
}

pub(crate) struct SettingsSource {
    pub(crate) path: PathBuf,
    /// Only the per-user file is written back on exit.
    pub(crate) persist: bool,
}

pub(crate) fn settings_source(args: &Args) -> Result<SettingsSource> {
    if let Some(path) = &args.config {
        return Ok(SettingsSource {
            path: path.clone(),
            persist: false,
        });
    }
    let proj = ProjectDirs::from("com", "terraspread", "Terraspread")
        .context("could not resolve project directories")?;
    let dir = proj.config_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(SettingsSource {
        path: dir.join("settings.json"),
        persist: true,
    })
}

pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    let settings = match fs::read_to_string(path) {
        Ok(s) => parse_settings(&s).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "ignoring unreadable settings");
            Settings::default()
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Settings::default(),
        Err(err) => {
            warn!(path = %path.display(), %err, "could not read settings");
            Settings::default()
        }
    };
    settings
        .policy
        .validate()
        .with_context(|| format!("invalid spread policy in {}", path.display()))?;
    Ok(settings)
}

pub(crate) fn parse_settings(s: &str) -> serde_json::Result<Settings> {
    serde_json::from_str(s)
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}
