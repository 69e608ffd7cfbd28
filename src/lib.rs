//! Listing Advisor - Conversational compliance assistant
//!
//! This crate implements a chat service that checks products against the
//! mandatory list and determines local-content certificate requirements
//! through a retrieval-grounded analysis pipeline.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
