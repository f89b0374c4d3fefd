//! Control channel: the Unix socket clients open to reach the device.
//!
//! # Responsibilities
//! - Bind the configured socket path
//! - Refuse to start over a socket that a live instance still answers on
//! - Clear a stale socket file left behind by a crashed instance
//! - Remove the socket file on unbind

use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};

use crate::config::ControlConfig;

/// Errors raised while binding the control channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Another instance is serving on this path.
    #[error("control channel {0} is already served by another instance")]
    InUse(PathBuf),

    /// Something other than a socket occupies the path.
    #[error("{0} exists and is not a socket")]
    NotASocket(PathBuf),

    /// The existing socket could not be checked for a live instance.
    #[error("failed to inspect existing socket {path}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to clear a stale socket file.
    #[error("failed to remove stale socket {path}: {source}")]
    Stale {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to bind the socket.
    #[error("failed to bind control channel {path}: {source}")]
    Bind {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A bound control channel.
#[derive(Debug)]
pub struct ControlChannel {
    inner: UnixListener,
    path: PathBuf,
}

impl ControlChannel {
    /// Bind to the configured socket path.
    pub async fn bind(config: &ControlConfig) -> Result<Self, ChannelError> {
        let path = config.socket_path.clone();

        match std::fs::symlink_metadata(&path) {
            Ok(meta) if !meta.file_type().is_socket() => {
                return Err(ChannelError::NotASocket(path));
            }
            Ok(_) => Self::clear_stale(&path).await?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(ChannelError::Inspect { path, source }),
        }

        let inner = UnixListener::bind(&path).map_err(|source| ChannelError::Bind {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), "Control channel bound");
        Ok(Self { inner, path })
    }

    /// Remove a socket file only if nothing is listening behind it.
    async fn clear_stale(path: &Path) -> Result<(), ChannelError> {
        match UnixStream::connect(path).await {
            Ok(_) => Err(ChannelError::InUse(path.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                tracing::warn!(path = %path.display(), "Removing stale control socket");
                std::fs::remove_file(path).map_err(|source| ChannelError::Stale {
                    path: path.to_path_buf(),
                    source,
                })
            }
            Err(source) => Err(ChannelError::Inspect {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Accept the next client connection.
    pub async fn accept(&self) -> std::io::Result<UnixStream> {
        let (stream, _) = self.inner.accept().await?;
        Ok(stream)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the listener and remove the socket file.
    pub fn unbind(self) {
        let Self { inner, path } = self;
        drop(inner);
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::info!(path = %path.display(), "Control channel removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove control socket"),
        }
    }
}
