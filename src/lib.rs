//! Simulation engine for a bank of lift cars: nearest-idle-car dispatch, a
//! per-car door and motion state machine driven by cancellable timers, and a
//! FIFO queue for calls no car can take yet.

pub mod config;
pub mod coordinator;
pub mod elevator;
pub mod shared;
pub mod shell;
