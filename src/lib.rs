//! Core library for the multi-player Minesweeper server: the shared
//! [`board`], the wire [`protocol`], the per-connection [`connection`] loop,
//! the [`server`] accept loop, and the startup [`cli`]/[`loader`]/[`error`]
//! plumbing around them.

pub mod board;
pub mod cli;
pub mod connection;
pub mod error;
pub mod loader;
pub mod protocol;
pub mod server;
