use std::fs;
use std::path::Path;

use crate::assets::raw::RawScene;
use crate::errors::Result;

/// Maps a resource path to typed import records.
///
/// The importer never parses files itself; any format with a loader that
/// produces a [`RawScene`] can feed it.
pub trait SceneLoader {
    fn load(&self, path: &Path) -> Result<RawScene>;
}

/// Reads [`RawScene`] records serialized as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSceneLoader;

impl JsonSceneLoader {
    pub fn parse(source: &str) -> Result<RawScene> {
        Ok(serde_json::from_str(source)?)
    }
}

impl SceneLoader for JsonSceneLoader {
    fn load(&self, path: &Path) -> Result<RawScene> {
        let source = fs::read_to_string(path)?;
        Self::parse(&source)
    }
}

impl<F> SceneLoader for F
where
    F: Fn(&Path) -> Result<RawScene>,
{
    fn load(&self, path: &Path) -> Result<RawScene> {
        self(path)
    }
}
