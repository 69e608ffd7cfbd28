//! Adapters - concrete implementations of the ports plus the HTTP surface.

pub mod ai;
pub mod document;
pub mod http;
pub mod knowledge;
pub mod storage;
