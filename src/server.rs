use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use net::{
    frame_handshake, ConnectionState, Framed, LoginDisconnectS2c, PingResponder, StatusResponder,
};
use serde_json::json;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
    sync::{broadcast, Semaphore},
    time::timeout,
};

use crate::{
    config::LodestoneConfig,
    connection::{Connection, Greeting},
    error::ReportableError,
    logging::LodestoneLogger,
    metrics::HandshakeMetrics,
    telemetry::get_meter,
    threat::{
        ratelimit::{RateLimitResult, RateLimiterController},
        ClientIntent, IntentTag, ThreatControlService,
    },
};

const WRITE_TIMEOUT: Duration = Duration::from_secs(1);
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

pub struct Lodestone {
    config: LodestoneConfig,
    status: StatusResponder,
    /// JSON text component for rejected logins.
    login_disconnect: Option<String>,
    threat: ThreatControlService,
    metrics: HandshakeMetrics,
}

impl Lodestone {
    pub fn new(config: LodestoneConfig) -> anyhow::Result<Lodestone> {
        let status = StatusResponder::new(&config.status.to_payload()?)?;
        let login_disconnect = config
            .login
            .disconnect_message
            .as_ref()
            .map(|text| json!({ "text": text }).to_string());
        Ok(Lodestone {
            config,
            status,
            login_disconnect,
            threat: ThreatControlService::new(),
            metrics: HandshakeMetrics::new(&get_meter()),
        })
    }

    pub async fn start(&'static self, stop: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let listener_cfg = self.config.bind.to_owned();
        LodestoneLogger::preparing_socket(&listener_cfg);
        let address: SocketAddr = listener_cfg.parse()?;
        let listener = TcpListener::bind(address).await?;
        LodestoneLogger::listening(&listener.local_addr()?);
        self.serve(listener, stop).await
    }

    /// Accept loop. Returns when `stop` fires.
    pub async fn serve(
        &'static self,
        listener: TcpListener,
        mut stop: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_conn as usize));
        let rate_limiter: Arc<RateLimiterController<IpAddr>> = Arc::new(
            RateLimiterController::new(
                self.config.rate_limit,
                Duration::from_secs(self.config.cooldown),
            ),
        );

        let pruner = {
            let rate_limiter = rate_limiter.clone();
            tokio::spawn(async move {
                let mut tick = tokio::time::interval(PRUNE_INTERVAL);
                loop {
                    tick.tick().await;
                    rate_limiter.prune();
                }
            })
        };

        loop {
            let (client, addr) = tokio::select! {
                _ = stop.recv() => break,
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        LodestoneLogger::accept_failed(&err);
                        continue;
                    }
                },
            };

            if let RateLimitResult::Disallowed { retry_after } = rate_limiter.check(&addr.ip()) {
                LodestoneLogger::rate_limited(&addr.ip(), retry_after);
                drop(client);
                continue;
            }

            let permit = match semaphore.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    LodestoneLogger::connection_limit_reached(&addr);
                    drop(client);
                    continue;
                }
            };

            if dotenvy::var("NO_NODELAY").is_err() {
                if let Err(e) = client.set_nodelay(true) {
                    LodestoneLogger::tcp_nodelay_failed(&e);
                }
            }

            let lodestone = self;
            tokio::spawn(async move {
                lodestone
                    .handle_connection(Connection::new(client, addr))
                    .await;
                drop(permit);
            });
        }

        pruner.abort();
        Ok(())
    }

    /// Runs one connection to completion and logs how it ended.
    pub async fn handle_connection<S>(&self, connection: Connection<S>)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let address = *connection.addr();
        if let Err(e) = self.handle_handshake(connection).await {
            let re = ReportableError::from(e);
            if re.is_disconnect() || re.is_stalled() {
                LodestoneLogger::connection_closed(&address, &re);
            } else {
                LodestoneLogger::connection_error(&address, &re);
            }
        }
    }

    pub async fn handle_handshake<S>(&self, mut connection: Connection<S>) -> anyhow::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let address = *connection.addr();
        LodestoneLogger::new_connection(&address);
        self.metrics.record_open();
        let started = Instant::now();

        let intent = ClientIntent {
            tag: IntentTag::Handshake,
            duration: self.config.timeouts.handshake(),
        };
        let raw = match self
            .threat
            .nuisance(connection.recv_greeting(), intent)
            .await??
        {
            Greeting::Legacy => {
                LodestoneLogger::legacy_ping(&address);
                return Ok(());
            }
            Greeting::Handshake(raw) => raw,
        };

        let handshake = match frame_handshake(&raw, raw.len()) {
            Ok(Framed::Handshake(handshake)) => handshake,
            Ok(Framed::Legacy) => {
                LodestoneLogger::legacy_ping(&address);
                return Ok(());
            }
            Err(err) => {
                self.metrics.record_failure("handshake");
                return Err(err.into());
            }
        };

        let label = handshake.next_state.label();
        self.metrics.record_attempt(label);
        let Some(state) = ConnectionState::AwaitingHandshake.advance(&handshake) else {
            LodestoneLogger::unknown_next_state(&address, handshake.next_state.as_byte());
            self.metrics.record_failure(label);
            return Ok(());
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.metrics.record_duration(elapsed_ms, label);
        LodestoneLogger::handshake_completed(
            elapsed_ms,
            label,
            &handshake.stripped_hostname(),
            handshake.protocol_version,
        );

        match state {
            ConnectionState::StatusRequested => {
                let intent = ClientIntent {
                    tag: IntentTag::Status,
                    duration: self.config.timeouts.status(),
                };
                self.threat
                    .nuisance(self.serve_status(&mut connection), intent)
                    .await?
            }
            ConnectionState::LoginRequested => self.reject_login(&mut connection).await,
            ConnectionState::AwaitingHandshake => Ok(()),
        }
    }

    /// Status request then ping, in order. Other packets are skipped. The
    /// caller bounds the whole exchange with one deadline.
    async fn serve_status<S>(&self, connection: &mut Connection<S>) -> anyhow::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut status_sent = false;
        loop {
            let frame = connection.recv_frame().await?;

            if !status_sent {
                if let Some(response) = self.status.respond(&frame)? {
                    connection.send_raw(response).await?;
                    self.metrics.record_status();
                    status_sent = true;
                    continue;
                }
            }

            if let Some(pong) = PingResponder::respond(&frame)? {
                connection.send_raw(&pong).await?;
                self.metrics.record_ping();
                return Ok(());
            }

            LodestoneLogger::unexpected_packet(connection.addr(), frame.id);
        }
    }

    async fn reject_login<S>(&self, connection: &mut Connection<S>) -> anyhow::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        LodestoneLogger::login_rejected(connection.addr(), self.login_disconnect.is_some());
        if let Some(reason) = &self.login_disconnect {
            timeout(
                WRITE_TIMEOUT,
                connection.send(&LoginDisconnectS2c {
                    reason: reason.as_str(),
                }),
            )
            .await??;
        }
        connection.shutdown().await
    }
}
