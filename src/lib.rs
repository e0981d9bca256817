mod cli;
mod error;
pub mod netascii;
mod packet;
mod session;
mod transport;

pub use crate::cli::{Action, Cli};
pub use crate::error::{ErrorKind, TransferError};
pub use crate::packet::{PacketError, TftpPacket};
pub use crate::session::{ByteSink, ByteSource, Mode, TransferSession};
pub use crate::transport::RetryTransport;

pub const BLOCK_SIZE: u16 = 512; // RFC 1350
pub const TFTP_PORT: u16 = 69;

pub const DEF_TIMEOUT_SEC: u64 = 10;
pub const MAX_RETRY_COUNT: u8 = 5;
pub const MAX_TID_MISMATCH: u8 = 10;
