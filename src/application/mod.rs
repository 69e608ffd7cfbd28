//! Application layer - pipeline orchestration over the ports.

pub mod pipeline;
