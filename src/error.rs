use thiserror::Error;

/// Everything that can end a transfer, local or remote.
///
/// Variants 0-7 mirror the protocol's ERROR packet codes; the rest are
/// client-side failures that share the same numeric reporting space.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("undefined error")]
    Undefined,
    #[error("file not found")]
    FileNotFound,
    #[error("access violation")]
    AccessViolation,
    #[error("disk full or allocation exceeded")]
    DiskFull,
    #[error("illegal TFTP operation")]
    IllegalOperation,
    #[error("unknown transfer ID")]
    UnknownTid,
    #[error("file already exists")]
    FileExists,
    #[error("no such user")]
    NoSuchUser,
    #[error("host not found")]
    HostNotFound,
    #[error("time out")]
    Timeout,
    #[error("bad server TID")]
    BadServerTid,
    #[error("unable to bind socket")]
    SocketBindFailure,
}

impl ErrorKind {
    /// Maps the low byte of a remote ERROR packet's code field.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ErrorKind::FileNotFound,
            2 => ErrorKind::AccessViolation,
            3 => ErrorKind::DiskFull,
            4 => ErrorKind::IllegalOperation,
            5 => ErrorKind::UnknownTid,
            6 => ErrorKind::FileExists,
            7 => ErrorKind::NoSuchUser,
            _ => ErrorKind::Undefined,
        }
    }

    /// Numeric code reported as the process exit status.
    pub fn code(self) -> u8 {
        match self {
            ErrorKind::Undefined => 0,
            ErrorKind::FileNotFound => 1,
            ErrorKind::AccessViolation => 2,
            ErrorKind::DiskFull => 3,
            ErrorKind::IllegalOperation => 4,
            ErrorKind::UnknownTid => 5,
            ErrorKind::FileExists => 6,
            ErrorKind::NoSuchUser => 7,
            ErrorKind::HostNotFound => 8,
            ErrorKind::Timeout => 9,
            ErrorKind::BadServerTid => 10,
            ErrorKind::SocketBindFailure => 11,
        }
    }

    /// Attaches the byte count reached when the failure struck.
    pub fn after(self, bytes_transferred: u64) -> TransferError {
        TransferError {
            kind: self,
            bytes_transferred,
        }
    }
}

/// A failed transfer: the kind of failure plus how far the transfer got.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{kind}")]
pub struct TransferError {
    pub kind: ErrorKind,
    pub bytes_transferred: u64,
}
