//! Discord avatar lookup service
//!
//! Resolves a Discord user id to avatar, banner and account metadata by
//! asking the Discord API, and serves a small frontend that calls it.

pub mod config;
pub mod discord;
pub mod handler;
pub mod http;
pub mod identity;
pub mod logger;
pub mod server;
