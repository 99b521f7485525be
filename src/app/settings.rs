use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::input::ChargeSettings;
use crate::errors::Result;
use crate::render::ShaderSettings;
use crate::scene::{GeyserSettings, HopSettings, OrbitSettings};

/// All tunables of a running scene. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub geyser: GeyserSettings,
    pub charge: ChargeSettings,
    pub hop: HopSettings,
    pub orbit: OrbitSettings,
    pub shaders: ShaderSettings,
}

impl EngineSettings {
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        let settings = Self::from_json_str(&source)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = EngineSettings::from_json_str(r#"{ "geyser": { "lifetime": 3.0 } }"#).unwrap();
        assert_eq!(settings.geyser.lifetime, 3.0);
        assert_eq!(settings.geyser.max_charge, 70.0);
        assert_eq!(settings.charge, ChargeSettings::default());
    }
}
