use std::{
    fmt::Display,
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use log::{debug, error, info, warn};

pub struct LodestoneLogger;

impl LodestoneLogger {
    pub fn preparing_socket(address: &str) {
        info!("Preparing socket {}", address);
    }

    pub fn listening(address: &SocketAddr) {
        info!("Listening on {}", address);
    }

    pub fn rate_limited(ip: &IpAddr, retry_after: Duration) {
        debug!("Rate-limited {ip} (retry after {retry_after:?})");
    }

    pub fn connection_limit_reached(addr: &SocketAddr) {
        debug!("Connection limit reached, dropping {addr}");
    }

    pub fn tcp_nodelay_failed(err: &std::io::Error) {
        error!("Failed to set TCP_NODELAY: {err}");
    }

    pub fn accept_failed(err: &std::io::Error) {
        warn!("Failed to accept connection: {err}");
    }

    pub fn new_connection(address: &SocketAddr) {
        info!("New connection {}", address);
    }

    pub fn legacy_ping(address: &SocketAddr) {
        debug!("Discarding legacy ping from {address}");
    }

    pub fn handshake_completed(elapsed_ms: u64, next_state: &str, hostname: &str, version: i32) {
        debug!(
            "Handshake completed in {}ms, next state: {}, host: {}, protocol: {}",
            elapsed_ms, next_state, hostname, version
        );
    }

    pub fn unknown_next_state(address: &SocketAddr, next_state: u8) {
        debug!("Ignoring handshake from {address} with next state {next_state}");
    }

    pub fn unexpected_packet(address: &SocketAddr, id: i32) {
        debug!("Ignoring packet {id:#04x} from {address} in status state");
    }

    pub fn login_rejected(address: &SocketAddr, with_message: bool) {
        if with_message {
            info!("Rejecting login from {address} with disconnect message");
        } else {
            info!("Closing login attempt from {address}");
        }
    }

    pub fn connection_closed(addr: &SocketAddr, reason: &dyn Display) {
        debug!("Connection {addr} closed: {reason}");
    }

    pub fn connection_error(client: &SocketAddr, err: &dyn Display) {
        if dotenvy::var("DO_NOT_LOG_CONNECTION_ERROR").is_ok() {
            return;
        }
        error!("connection error@{client}: {}", err);
    }

    pub fn stopping() {
        info!("Received signal, stopping...");
    }
}
