use std::{
    fs,
    os::unix::net::{UnixListener, UnixStream},
    path::{Path, PathBuf},
    sync::Arc,
};

use error_stack::{Report, Result, ResultExt};
use serde::{de::DeserializeOwned, Serialize};
use threadpool::ThreadPool;
use tracing::{debug, info, warn};

use crate::{api::Service, config::ServerConfig, game::MoveSource, traits::WantIpc, GError};

/// One accepted client; answers frames until the peer hangs up.
pub struct Connection {
    unix_stream: UnixStream,
}

impl Connection {
    pub fn new(unix_stream: UnixStream) -> Self {
        Self { unix_stream }
    }

    pub fn serve<M: MoveSource>(&self, service: &Service<M>) -> Result<(), GError> {
        while let Some(msg) = self.recv_frame()? {
            let res = service.handle_bytes(&msg);
            let bytes = serde_json::to_vec(&res).change_context(GError::PayloadError)?;
            self.send_frame(&bytes)?;
        }
        Ok(())
    }
}

impl WantIpc for Connection {
    fn unix_stream(&self) -> &UnixStream {
        &self.unix_stream
    }
}

pub struct Server<M> {
    listener: UnixListener,
    path: PathBuf,
    pool: ThreadPool,
    service: Arc<Service<M>>,
}

impl<M: MoveSource + Send + 'static> Server<M> {
    pub fn bind(config: &ServerConfig, service: Service<M>) -> Result<Self, GError> {
        let path = config.socket.clone();
        if fs::metadata(&path).is_ok() {
            info!(path = %path.display(), "socket is already present, deleting");
            fs::remove_file(&path)
                .change_context(GError::IpcError)
                .attach_printable("Couldn't remove stale socket")?;
        }

        let listener = UnixListener::bind(&path)
            .change_context(GError::IpcError)
            .attach_printable_lazy(|| format!("Couldn't bind {}", path.display()))?;

        Ok(Self {
            listener,
            path,
            pool: ThreadPool::new(config.workers.max(1)),
            service: Arc::new(service),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn run(&self) -> Result<(), GError> {
        info!(path = %self.path.display(), workers = self.pool.max_count(), "serving");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.dispatch(stream),
                Err(e) => warn!(error = %e, "accept failed"),
            }
        }

        Err(Report::new(GError::IpcError)).attach_printable("Listener stopped accepting")
    }

    /// Every worker is holding a connection; new clients queue until one
    /// hangs up.
    pub fn is_saturated(&self) -> bool {
        self.pool.active_count() >= self.pool.max_count()
    }

    fn dispatch(&self, stream: UnixStream) {
        if self.is_saturated() {
            debug!(
                workers = self.pool.max_count(),
                queued = self.pool.queued_count(),
                "all workers busy, client waits for a free one"
            );
        }

        let service = self.service.clone();
        self.pool.execute(move || {
            let conn = Connection::new(stream);
            match conn.serve(&service) {
                Ok(()) => debug!("client disconnected"),
                Err(e) => warn!(error = ?e, "connection dropped"),
            }
        });
    }
}

/// Blocking request/response client for the server above.
pub struct Client {
    unix_stream: UnixStream,
}

impl Client {
    pub fn connect(addr: impl AsRef<Path>) -> Result<Self, GError> {
        let unix_stream = UnixStream::connect(addr.as_ref()).change_context(GError::IpcError)?;
        Ok(Self { unix_stream })
    }

    pub fn request<Req: Serialize, Res: DeserializeOwned>(&self, req: &Req) -> Result<Res, GError> {
        let msg = serde_json::to_vec(req).change_context(GError::PayloadError)?;
        self.request_raw(&msg)
    }

    pub fn request_raw<Res: DeserializeOwned>(&self, msg: &[u8]) -> Result<Res, GError> {
        self.send_frame(msg)?;
        let res = self
            .recv_frame()?
            .ok_or_else(|| Report::new(GError::IpcError))
            .attach_printable("Server closed the connection")?;
        serde_json::from_slice(&res).change_context(GError::PayloadError)
    }
}

impl WantIpc for Client {
    fn unix_stream(&self) -> &UnixStream {
        &self.unix_stream
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;
    use crate::models::{Classifier, Move};

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        for _ in 0..200 {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn open_connection_holds_a_worker() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ServerConfig {
            socket: dir.path().join("rps.sock"),
            workers: 1,
        };
        let server = Server::bind(&config, Service::new(Classifier::default(), || Move::Rock)).unwrap();
        assert!(!server.is_saturated());

        let (ours, theirs) = UnixStream::pair().unwrap();
        server.dispatch(theirs);
        assert!(wait_for(|| server.is_saturated()));

        drop(ours);
        assert!(wait_for(|| !server.is_saturated()));
    }
}
