//! Hardware abstraction traits
//!
//! These traits define the seam between the scan engine and the
//! microcontroller. Every method here may be called from the scan interrupt,
//! so implementations must be short, constant-time and non-allocating.

pub mod bus;
pub mod clock;
pub mod timer;

pub use bus::{SelfTestPort, ShiftBus};
pub use clock::{ClockOutput, ClockProfile};
pub use timer::TickTimer;
