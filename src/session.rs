use clap::ValueEnum;
use std::net::SocketAddr;
use tokio::time::Duration;

use crate::error::{ErrorKind, TransferError};
use crate::netascii;
use crate::packet::TftpPacket;
use crate::transport::RetryTransport;
use crate::{BLOCK_SIZE, MAX_TID_MISMATCH};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Octet,
    Netascii,
}

impl Mode {
    pub fn wire_name(self) -> &'static str {
        match self {
            Mode::Octet => "octet",
            Mode::Netascii => "netascii",
        }
    }
}

/// Yields the complete contents to upload.
pub trait ByteSource {
    fn read_all(&mut self) -> Result<Vec<u8>, ErrorKind>;
}

/// Accepts the complete downloaded contents for persistence.
pub trait ByteSink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ErrorKind>;
}

/// Drives exactly one upload or one download to completion or failure.
///
/// The socket is bound at construction and released when the session drops,
/// whichever way the transfer ends.
pub struct TransferSession {
    transport: RetryTransport,
    request_port: u16,
    mode: Mode,
    server_tid: Option<u16>,
    block: u16,
    bytes_transferred: u64,
}

impl TransferSession {
    pub async fn new(
        server: SocketAddr,
        local_port: u16,
        mode: Mode,
        timeout: Duration,
        max_retries: u8,
    ) -> Result<Self, TransferError> {
        let transport = RetryTransport::bind(local_port, server.ip(), timeout, max_retries)
            .await
            .map_err(|kind| kind.after(0))?;
        Ok(Self {
            transport,
            request_port: server.port(),
            mode,
            server_tid: None,
            block: 0,
            bytes_transferred: 0,
        })
    }

    /// Sends the source's contents to the server under `filename`.
    ///
    /// Returns the number of payload bytes acknowledged by the server.
    pub async fn upload(
        &mut self,
        filename: &str,
        source: &mut dyn ByteSource,
    ) -> Result<u64, TransferError> {
        let wrq = TftpPacket::Wrq {
            filename: filename.to_string(),
            mode: self.mode.wire_name().to_string(),
        };
        self.block = 0;
        let (reply, origin) = self
            .transport
            .send_and_await(&wrq, self.request_port)
            .await
            .map_err(|kind| kind.after(self.bytes_transferred))?;

        // the write request must be acknowledged with block 0
        if !matches!(reply, TftpPacket::Ack(0)) {
            return Err(extract_error(&reply).after(self.bytes_transferred));
        }
        let tid = origin.port();
        self.server_tid = Some(tid);

        let mut contents = source
            .read_all()
            .map_err(|kind| kind.after(self.bytes_transferred))?;
        if self.mode == Mode::Netascii {
            contents = netascii::encode(&contents);
        }

        for chunk in split_blocks(&contents) {
            self.block = self.block.wrapping_add(1);
            let data = TftpPacket::Data {
                block: self.block,
                data: chunk.to_vec(),
            };
            let (mut reply, mut origin) = self
                .transport
                .send_and_await(&data, tid)
                .await
                .map_err(|kind| kind.after(self.bytes_transferred))?;

            let mut mismatches: u8 = 0;
            while origin.port() != tid {
                mismatches += 1;
                if mismatches >= MAX_TID_MISMATCH {
                    return Err(ErrorKind::BadServerTid.after(self.bytes_transferred));
                }
                (reply, origin) = self
                    .transport
                    .await_reply()
                    .await
                    .map_err(|kind| kind.after(self.bytes_transferred))?;
            }

            match reply {
                TftpPacket::Ack(block) if block == self.block => {
                    self.bytes_transferred += chunk.len() as u64;
                }
                other => return Err(extract_error(&other).after(self.bytes_transferred)),
            }
        }
        Ok(self.bytes_transferred)
    }

    /// Retrieves `filename` from the server into the sink.
    ///
    /// Returns the number of payload bytes received.
    pub async fn download(
        &mut self,
        filename: &str,
        sink: &mut dyn ByteSink,
    ) -> Result<u64, TransferError> {
        let rrq = TftpPacket::Rrq {
            filename: filename.to_string(),
            mode: self.mode.wire_name().to_string(),
        };
        self.block = 1; // first expected data block
        let mut output: Vec<u8> = Vec::new();

        self.transport
            .send(&rrq, self.request_port)
            .await
            .map_err(|kind| kind.after(self.bytes_transferred))?;

        loop {
            let (mut reply, mut origin) = self
                .transport
                .await_reply()
                .await
                .map_err(|kind| kind.after(self.bytes_transferred))?;

            let tid = match self.server_tid {
                None => {
                    // first reply pins the server's transfer port
                    let tid = origin.port();
                    self.server_tid = Some(tid);
                    tid
                }
                Some(tid) => {
                    // packets from anyone else are dropped until the right
                    // peer answers
                    while origin.port() != tid {
                        (reply, origin) = self
                            .transport
                            .await_reply()
                            .await
                            .map_err(|kind| kind.after(self.bytes_transferred))?;
                    }
                    tid
                }
            };

            let data = match reply {
                TftpPacket::Data { block, data } if block == self.block => data,
                other => return Err(extract_error(&other).after(self.bytes_transferred)),
            };

            self.transport
                .send(&TftpPacket::Ack(self.block), tid)
                .await
                .map_err(|kind| kind.after(self.bytes_transferred))?;
            self.bytes_transferred += data.len() as u64;
            output.extend_from_slice(&data);
            self.block = self.block.wrapping_add(1);

            if data.len() < usize::from(BLOCK_SIZE) {
                break;
            }
        }

        if self.mode == Mode::Netascii {
            output = netascii::decode(&output);
        }
        sink.write_all(&output)
            .map_err(|kind| kind.after(self.bytes_transferred))?;
        Ok(self.bytes_transferred)
    }
}

/// Failure kind carried by a reply that broke the exchange.
fn extract_error(pkt: &TftpPacket) -> ErrorKind {
    match pkt {
        TftpPacket::Error { code, .. } => ErrorKind::from_code(*code as u8),
        _ => ErrorKind::Undefined,
    }
}

/// Consecutive 512-byte chunks; an exact multiple (or empty input) ends with
/// a zero-length chunk so the far side sees the terminal block.
fn split_blocks(bytes: &[u8]) -> Vec<&[u8]> {
    let mut blocks: Vec<&[u8]> = bytes.chunks(usize::from(BLOCK_SIZE)).collect();
    if bytes.len() % usize::from(BLOCK_SIZE) == 0 {
        blocks.push(&[]);
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_single_empty_block() {
        let blocks = split_blocks(&[]);
        assert_eq!(blocks, vec![&[] as &[u8]]);
    }

    #[test]
    fn short_input_yields_single_block() {
        let bytes = vec![1u8; 100];
        let blocks = split_blocks(&bytes);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 100);
    }

    #[test]
    fn exact_multiple_gains_trailing_empty_block() {
        let bytes = vec![0u8; 1024];
        let blocks = split_blocks(&bytes);
        assert_eq!(
            blocks.iter().map(|b| b.len()).collect::<Vec<_>>(),
            vec![512, 512, 0]
        );
    }

    #[test]
    fn remainder_becomes_final_short_block() {
        let bytes = vec![0u8; 1025];
        let blocks = split_blocks(&bytes);
        assert_eq!(
            blocks.iter().map(|b| b.len()).collect::<Vec<_>>(),
            vec![512, 512, 1]
        );
    }

    #[test]
    fn error_packet_code_low_byte_extracted() {
        let pkt = TftpPacket::Error {
            code: 0x0101, // only the low byte counts
            msg: String::new(),
        };
        assert_eq!(extract_error(&pkt), ErrorKind::FileNotFound);
    }

    #[test]
    fn non_error_reply_extracts_undefined() {
        assert_eq!(extract_error(&TftpPacket::Ack(3)), ErrorKind::Undefined);
        let data = TftpPacket::Data {
            block: 2,
            data: vec![],
        };
        assert_eq!(extract_error(&data), ErrorKind::Undefined);
    }

    #[test]
    fn mode_wire_names() {
        assert_eq!(Mode::Octet.wire_name(), "octet");
        assert_eq!(Mode::Netascii.wire_name(), "netascii");
    }
}
