//! Status-only Minecraft server: answers the server list handshake, status
//! request and ping, and turns away login attempts.

pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod telemetry;
pub mod threat;
pub mod utils;
