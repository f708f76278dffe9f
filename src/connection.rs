use std::{io, io::ErrorKind, net::SocketAddr};

use bytes::BytesMut;
use net::{encode_packet, is_legacy_ping, PacketDecoder, PacketEncode, PacketFrame};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const MAX_CHUNK_SIZE: usize = 1024;

/// First thing a client sends.
#[derive(Debug, PartialEq, Eq)]
pub enum Greeting {
    /// Pre-Netty server list ping.
    Legacy,
    /// One complete frame, length prefix included.
    Handshake(Vec<u8>),
}

/// A client byte stream plus the frame reader that sits on top of it.
pub struct Connection<S> {
    address: SocketAddr,
    stream: S,
    dec: PacketDecoder,
    buf: BytesMut,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, address: SocketAddr) -> Self {
        Self {
            address,
            stream,
            dec: PacketDecoder::with_capacity(MAX_CHUNK_SIZE),
            buf: BytesMut::with_capacity(MAX_CHUNK_SIZE),
        }
    }

    pub fn addr(&self) -> &SocketAddr {
        &self.address
    }

    async fn fill(&mut self) -> anyhow::Result<()> {
        self.buf.clear();
        self.buf.reserve(MAX_CHUNK_SIZE);
        if self.stream.read_buf(&mut self.buf).await? == 0 {
            return Err(io::Error::from(ErrorKind::UnexpectedEof).into());
        }
        self.dec.queue_slice(&self.buf);
        Ok(())
    }

    /// Waits for the handshake frame, or recognises a legacy probe from its
    /// first byte.
    pub async fn recv_greeting(&mut self) -> anyhow::Result<Greeting> {
        loop {
            if self.dec.peek_first().is_some_and(is_legacy_ping) {
                return Ok(Greeting::Legacy);
            }
            if let Some(raw) = self.dec.try_next_raw()? {
                return Ok(Greeting::Handshake(raw));
            }
            self.fill().await?;
        }
    }

    pub async fn recv_frame(&mut self) -> anyhow::Result<PacketFrame> {
        loop {
            if let Some(frame) = self.dec.try_next_packet()? {
                return Ok(frame);
            }
            self.fill().await?;
        }
    }

    pub async fn send<P: PacketEncode>(&mut self, pkt: &P) -> anyhow::Result<()> {
        let mut bytes = Vec::new();
        encode_packet(&mut bytes, pkt)?;
        self.send_raw(&bytes).await
    }

    pub async fn send_raw(&mut self, pkt: &[u8]) -> anyhow::Result<()> {
        self.stream.write_all(pkt).await?;
        self.stream.flush().await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
