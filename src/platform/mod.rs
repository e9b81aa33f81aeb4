//! Platform abstraction layer
//!
//! Everything the simulation needs from the outside world:
//! - Drawing and input binding (`Frontend`, fed by replayed `GameEvent`s)
//! - Time (`Scheduler`, a virtual-clock fixed-delay timer)

pub mod frontend;
pub mod scheduler;

pub use frontend::{Frontend, LogFrontend, present};
pub use scheduler::Scheduler;
