use std::net::{IpAddr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::time::{timeout, Duration};

use crate::error::ErrorKind;
use crate::packet::TftpPacket;
use crate::BLOCK_SIZE;

/// One bound datagram socket with timeout-driven retransmission.
///
/// The last datagram sent is kept so it can be resent whenever a receive
/// times out. TID filtering is the session's job; callers get every reply
/// together with its origin address.
pub struct RetryTransport {
    socket: UdpSocket,
    server_ip: IpAddr,
    timeout: Duration,
    max_retries: u8,
    last_sent: Option<(Vec<u8>, SocketAddr)>,
}

impl RetryTransport {
    pub async fn bind(
        local_port: u16,
        server_ip: IpAddr,
        timeout: Duration,
        max_retries: u8,
    ) -> Result<Self, ErrorKind> {
        let socket = UdpSocket::bind(("0.0.0.0", local_port))
            .await
            .map_err(|_| ErrorKind::SocketBindFailure)?;
        Ok(Self {
            socket,
            server_ip,
            timeout,
            max_retries,
            last_sent: None,
        })
    }

    /// Sends `pkt` to the server at `port` and records it for retransmission.
    pub async fn send(&mut self, pkt: &TftpPacket, port: u16) -> Result<(), ErrorKind> {
        let dest = SocketAddr::new(self.server_ip, port);
        let bytes = pkt.serialize();
        self.socket
            .send_to(&bytes, dest)
            .await
            .map_err(|_| ErrorKind::Timeout)?;
        self.last_sent = Some((bytes, dest));
        Ok(())
    }

    pub async fn send_and_await(
        &mut self,
        pkt: &TftpPacket,
        port: u16,
    ) -> Result<(TftpPacket, SocketAddr), ErrorKind> {
        self.send(pkt, port).await?;
        self.await_reply().await
    }

    /// Blocks for the next datagram. Each timeout resends the last packet;
    /// after `max_retries` consecutive timeouts the transfer is dead.
    pub async fn await_reply(&mut self) -> Result<(TftpPacket, SocketAddr), ErrorKind> {
        let mut buf = [0u8; 4 + BLOCK_SIZE as usize];
        let mut retries: u8 = 0;
        loop {
            let received = timeout(self.timeout, self.socket.recv_from(&mut buf)).await;
            match received {
                Ok(result) => {
                    let (num, addr) = result.map_err(|_| ErrorKind::Timeout)?;
                    let pkt = TftpPacket::deserialize(&buf[..num])
                        .map_err(|_| ErrorKind::Undefined)?;
                    return Ok((pkt, addr));
                }
                Err(_) => {
                    retries += 1;
                    if retries >= self.max_retries {
                        return Err(ErrorKind::Timeout);
                    }
                    println!("timeout, resending last packet");
                    self.resend().await?;
                }
            }
        }
    }

    async fn resend(&mut self) -> Result<(), ErrorKind> {
        if let Some((bytes, dest)) = &self.last_sent {
            self.socket
                .send_to(bytes, *dest)
                .await
                .map_err(|_| ErrorKind::Timeout)?;
        }
        Ok(())
    }
}
