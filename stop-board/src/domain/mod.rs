//! Domain types for the stop board.
//!
//! Stops and arrivals come from the remote directory and are never
//! mutated locally. Identifiers that end up in request paths are
//! validated at construction time.

mod arrival;
mod stop;

pub use arrival::{ArrivalRecord, ProcessedArrival, process, wait_minutes};
pub use stop::{InvalidStopId, Stop, StopId};
