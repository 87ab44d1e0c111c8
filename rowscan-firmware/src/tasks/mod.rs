//! Embassy async tasks
//!
//! The scan task runs on the high-priority interrupt executor; everything
//! else runs on the thread executor and never touches the bus.

pub mod input;
pub mod pattern;
pub mod scan;
pub mod settings;
pub mod telemetry;

pub use input::input_task;
pub use pattern::pattern_task;
pub use scan::{scan_task, Engine, ScanBus};
pub use settings::settings_task;
pub use telemetry::telemetry_task;
