use std::str;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TftpPacket {
    Rrq { filename: String, mode: String },
    Wrq { filename: String, mode: String },
    Data { block: u16, data: Vec<u8> },
    Ack(u16),
    Error { code: u16, msg: String },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet length too short: {0} bytes")]
    TooShort(usize),
    #[error("invalid opcode: {0}")]
    InvalidOpcode(u16),
    #[error("missing cstr terminator")]
    MissingTerminator,
    #[error("invalid cstr encoding")]
    InvalidEncoding,
}

impl TftpPacket {
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = vec![0];

        match self {
            TftpPacket::Rrq { filename, mode } | TftpPacket::Wrq { filename, mode } => {
                if let TftpPacket::Rrq { .. } = self {
                    bytes.push(1);
                } else {
                    bytes.push(2);
                }
                bytes.extend(filename.as_bytes());
                bytes.push(0);
                bytes.extend(mode.as_bytes());
                bytes.push(0);
            }
            TftpPacket::Data { block, data } => {
                bytes.push(3);
                bytes.extend_from_slice(&block.to_be_bytes());
                bytes.extend_from_slice(data);
            }
            TftpPacket::Ack(block) => {
                bytes.push(4);
                bytes.extend_from_slice(&block.to_be_bytes());
            }
            TftpPacket::Error { code, msg } => {
                bytes.push(5);
                bytes.extend_from_slice(&code.to_be_bytes());
                bytes.extend_from_slice(msg.as_bytes());
                bytes.push(0);
            }
        }
        bytes
    }

    pub fn deserialize(buf: &[u8]) -> Result<Self, PacketError> {
        if buf.len() < 2 {
            return Err(PacketError::TooShort(buf.len()));
        }

        let opcode = u16::from_be_bytes([buf[0], buf[1]]);
        let pkt = match opcode {
            1 | 2 => {
                let filename = read_cstr(&buf[2..])?;
                let mode = read_cstr(&buf[2 + filename.len() + 1..])?;
                if opcode == 1 {
                    TftpPacket::Rrq { filename, mode }
                } else {
                    TftpPacket::Wrq { filename, mode }
                }
            }
            3 => {
                if buf.len() < 4 {
                    return Err(PacketError::TooShort(buf.len()));
                }
                TftpPacket::Data {
                    block: u16::from_be_bytes([buf[2], buf[3]]),
                    data: buf[4..].to_vec(),
                }
            }
            4 => {
                if buf.len() < 4 {
                    return Err(PacketError::TooShort(buf.len()));
                }
                TftpPacket::Ack(u16::from_be_bytes([buf[2], buf[3]]))
            }
            5 => {
                if buf.len() < 4 {
                    return Err(PacketError::TooShort(buf.len()));
                }
                TftpPacket::Error {
                    code: u16::from_be_bytes([buf[2], buf[3]]),
                    msg: read_cstr(&buf[4..])?,
                }
            }
            _ => {
                return Err(PacketError::InvalidOpcode(opcode));
            }
        };

        Ok(pkt)
    }
}

// C-style string: bytes up to the first \0
fn read_cstr(buf: &[u8]) -> Result<String, PacketError> {
    let pos = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or(PacketError::MissingTerminator)?;
    let s = str::from_utf8(&buf[..pos]).map_err(|_| PacketError::InvalidEncoding)?;
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrq_wire_layout() {
        let pkt = TftpPacket::Wrq {
            filename: "hello.txt".to_string(),
            mode: "octet".to_string(),
        };
        let mut expect = vec![0u8, 2];
        expect.extend(b"hello.txt");
        expect.push(0);
        expect.extend(b"octet");
        expect.push(0);
        assert_eq!(pkt.serialize(), expect);
    }

    #[test]
    fn rrq_round_trip() {
        let pkt = TftpPacket::Rrq {
            filename: "a/b/c.bin".to_string(),
            mode: "netascii".to_string(),
        };
        assert_eq!(TftpPacket::deserialize(&pkt.serialize()).unwrap(), pkt);
    }

    #[test]
    fn data_round_trip_across_payload_sizes() {
        for len in [0usize, 1, 100, 511, 512] {
            let pkt = TftpPacket::Data {
                block: 7,
                data: vec![0x5a; len],
            };
            let decoded = TftpPacket::deserialize(&pkt.serialize()).unwrap();
            assert_eq!(decoded, pkt, "payload length {len}");
        }
    }

    #[test]
    fn block_number_round_trip_extremes() {
        for block in [0u16, 1, 255, 256, 0x1234, 65534, 65535] {
            let bytes = TftpPacket::Ack(block).serialize();
            assert_eq!(bytes[2], (block >> 8) as u8);
            assert_eq!(bytes[3], (block & 0xff) as u8);
            assert_eq!(
                TftpPacket::deserialize(&bytes).unwrap(),
                TftpPacket::Ack(block)
            );
        }
    }

    #[test]
    fn block_number_wraps_after_max() {
        let next = 65535u16.wrapping_add(1);
        assert_eq!(next, 0);
        let pkt = TftpPacket::Data {
            block: next,
            data: vec![1, 2, 3],
        };
        assert_eq!(TftpPacket::deserialize(&pkt.serialize()).unwrap(), pkt);
    }

    #[test]
    fn error_packet_round_trip() {
        let pkt = TftpPacket::Error {
            code: 1,
            msg: "File not found".to_string(),
        };
        let bytes = pkt.serialize();
        assert_eq!(&bytes[..4], &[0, 5, 0, 1]);
        assert_eq!(*bytes.last().unwrap(), 0);
        assert_eq!(TftpPacket::deserialize(&bytes).unwrap(), pkt);
    }

    #[test]
    fn empty_and_one_byte_buffers_are_too_short() {
        assert_eq!(
            TftpPacket::deserialize(&[]),
            Err(PacketError::TooShort(0))
        );
        assert_eq!(
            TftpPacket::deserialize(&[0]),
            Err(PacketError::TooShort(1))
        );
    }

    #[test]
    fn truncated_data_ack_error_are_too_short() {
        for opcode in [3u8, 4, 5] {
            assert_eq!(
                TftpPacket::deserialize(&[0, opcode, 0]),
                Err(PacketError::TooShort(3))
            );
        }
    }

    #[test]
    fn unknown_opcode_rejected() {
        assert_eq!(
            TftpPacket::deserialize(&[0, 9, 0, 0]),
            Err(PacketError::InvalidOpcode(9))
        );
    }

    #[test]
    fn request_without_terminator_rejected() {
        // opcode 1 + filename bytes, no \0 anywhere
        assert_eq!(
            TftpPacket::deserialize(b"\x00\x01abc"),
            Err(PacketError::MissingTerminator)
        );
    }
}
