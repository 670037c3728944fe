//! Process lifecycle and orchestration.
//!
//! This module provides:
//! - Construction of new processes and their derived status and progress
//! - FlowManager, which serializes operations per process id over a store
//! - The per-process lock registry FlowManager uses

pub mod locks;
pub mod manager;
pub mod process;
