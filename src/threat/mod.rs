pub mod ratelimit;

use std::{future::IntoFuture, time::Duration};

use tokio::time::timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentTag {
    Handshake,
    Status,
}

/// What the server is waiting for and how long it will wait.
#[derive(Debug, Clone, Copy)]
pub struct ClientIntent {
    pub tag: IntentTag,
    pub duration: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientFail {
    #[error("Timeout waiting for {0:?}")]
    Stalled(IntentTag),
}

#[derive(Debug, Default)]
pub struct ThreatControlService;

impl ThreatControlService {
    pub fn new() -> Self {
        Self {}
    }

    /// A `timeout` wrapper that reports a stalled client as [`ClientFail`].
    pub async fn nuisance<F>(&self, future: F, intent: ClientIntent) -> anyhow::Result<F::Output>
    where
        F: IntoFuture,
    {
        match timeout(intent.duration, future.into_future()).await {
            Ok(v) => Ok(v),
            Err(_) => Err(ClientFail::Stalled(intent.tag).into()),
        }
    }
}
