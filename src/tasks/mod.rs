//! Background Tasks Module
//!
//! Tasks that run periodically during server operation.
//!
//! # Tasks
//! - Disk Prune: Removes expired durable-tier entries at configured intervals

mod cleanup;

pub use cleanup::spawn_prune_task;
