use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment switch that selects embedding for one build.
pub const EMBED_ASSETS_VAR: &str = "EMBED_ASSETS";
const EMBED_ASSETS_ON: &str = "yes";

/// Whether asset references are inlined as data URIs or kept as paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedMode {
    Embedded,
    #[default]
    Linked,
}

impl EmbedMode {
    pub fn from_flag(embed: bool) -> Self {
        if embed {
            EmbedMode::Embedded
        } else {
            EmbedMode::Linked
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            EmbedMode::Embedded => EmbedMode::Linked,
            EmbedMode::Linked => EmbedMode::Embedded,
        }
    }

    pub fn is_embedded(self) -> bool {
        self == EmbedMode::Embedded
    }
}

impl fmt::Display for EmbedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedMode::Embedded => write!(f, "embedded"),
            EmbedMode::Linked => write!(f, "linked"),
        }
    }
}

/// Configuration read once at start-up and passed down explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbedConfig {
    pub mode: EmbedMode,
}

impl EmbedConfig {
    pub fn new(mode: EmbedMode) -> Self {
        EmbedConfig { mode }
    }

    /// Read `EMBED_ASSETS` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EmbedConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let embed = lookup(EMBED_ASSETS_VAR)
            .map(|value| value.trim().eq_ignore_ascii_case(EMBED_ASSETS_ON))
            .unwrap_or(false);
        let config = EmbedConfig::new(EmbedMode::from_flag(embed));
        log::debug!("{} resolved to {} mode", EMBED_ASSETS_VAR, config.mode);
        config
    }

    /// Apply a command-line override, if any.
    pub fn with_override(self, embed: Option<bool>) -> Self {
        match embed {
            Some(flag) => EmbedConfig::new(EmbedMode::from_flag(flag)),
            None => self,
        }
    }
}
