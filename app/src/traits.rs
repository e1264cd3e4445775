use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use error_stack::{Report, Result, ResultExt};

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;

use crate::landmarks::HandObservation;
use crate::GError;

/// Largest frame either side will accept (1 MiB).
pub const MAX_FRAME_LEN: u32 = 1_048_576;

/// Length-prefixed framing over a unix stream: a big-endian `u32` byte count
/// followed by the payload.
pub trait WantIpc {
    fn unix_stream(&self) -> &UnixStream;

    fn send_frame(&self, msg: &[u8]) -> Result<(), GError> {
        let msg_len = u32::try_from(msg.len()).change_context(GError::PayloadError)?;
        if msg_len > MAX_FRAME_LEN {
            return Err(Report::new(GError::PayloadError))
                .attach_printable(format!("Frame of {msg_len} bytes exceeds {MAX_FRAME_LEN}"));
        }

        self.unix_stream()
            .write_u32::<NetworkEndian>(msg_len)
            .change_context(GError::IpcError)?;
        self.unix_stream()
            .write_all(msg)
            .change_context(GError::IpcError)?;

        Ok(())
    }

    /// Returns `None` when the peer closed the stream between frames.
    fn recv_frame(&self) -> Result<Option<Vec<u8>>, GError> {
        let msg_len = match self.unix_stream().read_u32::<NetworkEndian>() {
            Ok(len) => len,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(Report::new(e).change_context(GError::IpcError)),
        };

        if msg_len > MAX_FRAME_LEN {
            return Err(Report::new(GError::PayloadError))
                .attach_printable(format!("Peer announced {msg_len} bytes, limit is {MAX_FRAME_LEN}"));
        }

        let mut msg = vec![0; msg_len as usize];
        self.unix_stream()
            .read_exact(&mut msg)
            .change_context(GError::IpcError)?;

        Ok(Some(msg))
    }

    fn send_u32(&self, data: u32) -> Result<(), GError> {
        self.unix_stream()
            .write_u32::<NetworkEndian>(data)
            .change_context(GError::IpcError)
    }
}

/// Anything that yields the hands seen in the next frame.
pub trait LandmarkSource {
    fn next_frame(&mut self) -> Result<Vec<HandObservation>, GError>;

    /// Live sources never run dry.
    fn is_exhausted(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct End(UnixStream);

    impl WantIpc for End {
        fn unix_stream(&self) -> &UnixStream {
            &self.0
        }
    }

    #[test]
    fn frames_survive_the_socket() {
        let (a, b) = UnixStream::pair().unwrap();
        let (a, b) = (End(a), End(b));

        a.send_frame(br#"{"op":"health"}"#).unwrap();
        a.send_frame(b"").unwrap();

        assert_eq!(b.recv_frame().unwrap().unwrap(), br#"{"op":"health"}"#);
        assert_eq!(b.recv_frame().unwrap().unwrap(), b"");

        drop(a);
        assert!(b.recv_frame().unwrap().is_none());
    }

    #[test]
    fn oversized_announcement_is_rejected() {
        let (a, b) = UnixStream::pair().unwrap();
        let (a, b) = (End(a), End(b));

        a.send_u32(MAX_FRAME_LEN + 1).unwrap();
        assert!(b.recv_frame().is_err());
    }
}
