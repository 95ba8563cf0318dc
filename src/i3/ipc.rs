//! i3 / sway IPC framing.
//!
//! Every message, in both directions, is
//!
//! ```text
//! "i3-ipc" | payload length (u32) | message type (u32) | payload
//! ```
//!
//! with both integers in native byte order.  Replies carry the type of the
//! request; events have the high bit set.

use crate::error::ServiceError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const MAGIC: &[u8; 6] = b"i3-ipc";

pub const RUN_COMMAND: u32 = 0;
pub const GET_WORKSPACES: u32 = 1;
pub const SUBSCRIBE: u32 = 2;

/// Bit set on the type of every event message.
pub const EVENT_FLAG: u32 = 0x8000_0000;
pub const EVENT_WORKSPACE: u32 = EVENT_FLAG;

/// Upper bound on a payload we are willing to allocate for.
const MAX_PAYLOAD: u32 = 64 * 1024 * 1024;

/// Resolve the IPC socket path from `$I3SOCK`, then `$SWAYSOCK`.
pub fn socket_path_from_env() -> Result<PathBuf, ServiceError> {
    ["I3SOCK", "SWAYSOCK"]
        .iter()
        .find_map(|var| std::env::var_os(var).filter(|v| !v.is_empty()))
        .map(PathBuf::from)
        .ok_or_else(|| {
            ServiceError::ServiceUnavailable("neither I3SOCK nor SWAYSOCK is set".into())
        })
}

/// Write one framed message.
pub fn write_message<W: Write>(w: &mut W, kind: u32, payload: &[u8]) -> std::io::Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "payload too large"))?;
    let mut frame = Vec::with_capacity(MAGIC.len() + 8 + payload.len());
    frame.extend_from_slice(MAGIC);
    frame.extend_from_slice(&len.to_ne_bytes());
    frame.extend_from_slice(&kind.to_ne_bytes());
    frame.extend_from_slice(payload);
    w.write_all(&frame)?;
    w.flush()
}

/// Read one framed message.
///
/// Returns `Ok(None)` on a clean end of stream before the first header byte.
pub fn read_message<R: Read>(r: &mut R) -> Result<Option<(u32, Vec<u8>)>, ServiceError> {
    let mut header = [0u8; 14];
    let mut filled = 0;
    while filled < header.len() {
        match r.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(ServiceError::ServiceUnavailable(
                    "connection closed mid-header".into(),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ServiceError::ServiceUnavailable(format!("read: {}", e))),
        }
    }

    if &header[..6] != MAGIC {
        return Err(ServiceError::Protocol(format!(
            "bad magic {:?}",
            String::from_utf8_lossy(&header[..6])
        )));
    }
    let len = u32::from_ne_bytes([header[6], header[7], header[8], header[9]]);
    let kind = u32::from_ne_bytes([header[10], header[11], header[12], header[13]]);
    if len > MAX_PAYLOAD {
        return Err(ServiceError::Protocol(format!("payload of {} bytes", len)));
    }

    let mut payload = vec![0u8; len as usize];
    r.read_exact(&mut payload)
        .map_err(|e| ServiceError::ServiceUnavailable(format!("read payload: {}", e)))?;
    Ok(Some((kind, payload)))
}

/// Open a connection, send one request and return the payload of its reply.
///
/// Events that arrive before the reply (only possible on a subscribed
/// connection) are skipped.
pub fn request(path: &Path, kind: u32, payload: &str) -> Result<Vec<u8>, ServiceError> {
    let mut stream = std::os::unix::net::UnixStream::connect(path).map_err(|e| {
        ServiceError::ServiceUnavailable(format!("connect to {}: {}", path.display(), e))
    })?;
    write_message(&mut stream, kind, payload.as_bytes())
        .map_err(|e| ServiceError::ServiceUnavailable(format!("write: {}", e)))?;
    loop {
        match read_message(&mut stream)? {
            Some((k, body)) if k == kind => return Ok(body),
            Some((k, _)) if k & EVENT_FLAG != 0 => continue,
            Some((k, _)) => {
                return Err(ServiceError::Protocol(format!(
                    "expected reply type {}, got {}",
                    kind, k
                )))
            }
            None => {
                return Err(ServiceError::ServiceUnavailable(
                    "connection closed before reply".into(),
                ))
            }
        }
    }
}
