//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Window sweep: evicts elapsed rate-limit windows from the in-process
//!   fallback map at configured intervals

mod sweep;

pub use sweep::spawn_sweep_task;
