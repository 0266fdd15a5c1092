//! Embassy async tasks
//!
//! One periodic task per control component. Tasks share nothing but the
//! containers in `channels`.

pub mod button;
pub mod lifecycle;
pub mod pid;
pub mod safety;
pub mod sensor;
pub mod ssr;

pub use button::button_task;
pub use lifecycle::lifecycle_task;
pub use pid::pid_task;
pub use safety::safety_task;
pub use sensor::{sensor_task, SensorBus};
pub use ssr::{ssr_task, SsrLine};
