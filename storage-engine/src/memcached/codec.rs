use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

// Longest status or VALUE header line we accept before giving up on the stream
const MAX_LINE_LENGTH: usize = 8 * 1024;
const CRLF: &[u8] = b"\r\n";
const END: &[u8] = b"END\r\n";

/// Memcached text-protocol commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Get { key: String },
    Set { key: String, value: Bytes, exptime: u32 },
    Delete { key: String },
    FlushAll,
    Version,
}

/// One complete server reply. A `get` reply is folded into `Value` or `Miss`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Value(Bytes),
    Miss,
    Stored,
    NotStored,
    Deleted,
    NotFound,
    Ok,
    Version(String),
    /// ERROR, CLIENT_ERROR or SERVER_ERROR
    Error(String),
}

#[derive(Debug, Default)]
pub struct MemcachedCodec;

impl Encoder<Command> for MemcachedCodec {
    type Error = io::Error;

    fn encode(&mut self, command: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match command {
            Command::Get { key } => {
                dst.put_slice(format!("get {}\r\n", key).as_bytes());
            }
            Command::Set {
                key,
                value,
                exptime,
            } => {
                // set <key> <flags> <exptime> <bytes>\r\n<data>\r\n
                let header = format!("set {} 0 {} {}\r\n", key, exptime, value.len());
                dst.put_slice(header.as_bytes());
                dst.put_slice(&value);
                dst.put_slice(CRLF);
            }
            Command::Delete { key } => {
                dst.put_slice(format!("delete {}\r\n", key).as_bytes());
            }
            Command::FlushAll => dst.put_slice(b"flush_all\r\n"),
            Command::Version => dst.put_slice(b"version\r\n"),
        }
        Ok(())
    }
}

impl Decoder for MemcachedCodec {
    type Item = Reply;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(line_end) = src.windows(2).position(|w| w == CRLF) else {
            if src.len() > MAX_LINE_LENGTH {
                return Err(invalid_data("reply line too long"));
            }
            return Ok(None);
        };

        let line = std::str::from_utf8(&src[..line_end])
            .map_err(|_| invalid_data("reply line is not UTF-8"))?
            .to_string();

        if let Some(header) = line.strip_prefix("VALUE ") {
            // VALUE <key> <flags> <bytes> [<cas unique>]
            let len: usize = header
                .split(' ')
                .nth(2)
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| invalid_data("malformed VALUE header"))?;

            let needed = line_end + CRLF.len() + len + CRLF.len() + END.len();
            if src.len() < needed {
                src.reserve(needed - src.len());
                return Ok(None);
            }

            src.advance(line_end + CRLF.len());
            let data = src.split_to(len).freeze();
            if &src[..CRLF.len()] != CRLF || &src[CRLF.len()..CRLF.len() + END.len()] != END {
                return Err(invalid_data("VALUE block not terminated by END"));
            }
            src.advance(CRLF.len() + END.len());
            return Ok(Some(Reply::Value(data)));
        }

        src.advance(line_end + CRLF.len());

        let reply = match line.as_str() {
            "END" => Reply::Miss,
            "STORED" => Reply::Stored,
            "NOT_STORED" | "EXISTS" => Reply::NotStored,
            "DELETED" => Reply::Deleted,
            "NOT_FOUND" => Reply::NotFound,
            "OK" => Reply::Ok,
            "ERROR" => Reply::Error("ERROR".to_string()),
            other => {
                if let Some(version) = other.strip_prefix("VERSION ") {
                    Reply::Version(version.to_string())
                } else if other.starts_with("CLIENT_ERROR") || other.starts_with("SERVER_ERROR") {
                    Reply::Error(other.to_string())
                } else {
                    return Err(invalid_data(&format!("unexpected reply: {}", other)));
                }
            }
        };

        Ok(Some(reply))
    }
}

fn invalid_data(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}
