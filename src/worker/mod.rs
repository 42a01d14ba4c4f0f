//! Worker module: the claim -> fetch -> update loop and its launchers
//!
//! The loop is written once (`lifecycle`). How many copies run, and
//! where, is a launcher concern:
//! - `pool`: tokio tasks inside this process
//! - `process`: separate OS processes tracked through a PID file

mod lifecycle;
mod pool;
pub mod process;
mod stop;

pub use lifecycle::{
    OnEmpty, StepOutcome, Worker, WorkerReport, WorkerState, DEFAULT_STORE_RETRY,
};
pub use pool::WorkerPool;
pub use process::{spawn_processes, stop_processes, SpawnOptions, StopReport, WORKER_FLAG};
pub use stop::{stop_channel, StopHandle, StopSignal};
