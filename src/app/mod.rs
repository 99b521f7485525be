//! Application layer
//!
//! - [`settings`]: [`EngineSettings`], the JSON-loadable configuration
//! - [`input`]: hold-to-charge input and the [`ChargePolicy`] seam
//! - [`driver`]: [`FrameDriver`], one update + render per frame

pub mod driver;
pub mod input;
pub mod settings;

pub use driver::FrameDriver;
pub use input::{ChargeController, ChargePolicy, ChargeSettings, LinearRamp};
pub use settings::EngineSettings;
