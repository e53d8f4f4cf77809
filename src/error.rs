use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unable to read {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to parse {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Destination answer outside of `dev` and `www`.
    #[error("unknown destination \"{0}\", expected \"dev\" or \"www\"")]
    UnknownDestination(String),

    #[error("unknown hook \"{0}\", expected one of: start, stop, restart, finalize_update")]
    UnknownHook(String),

    #[error("unknown role \"{0}\", expected one of: web, app, db")]
    UnknownRole(String),

    #[error("release directory is empty")]
    EmptyRelease,

    #[error("unable to read answer: {0}")]
    Prompt(#[source] io::Error),

    #[error("unable to connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("ssh transport to {host} failed: {source}")]
    Transport {
        host: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("authentication of {user}@{host} failed: {reason}")]
    Auth {
        user: String,
        host: String,
        reason: String,
    },

    #[cfg(not(feature = "ssh"))]
    #[error("this build has no ssh support, rebuild with the \"ssh\" feature")]
    TransportUnavailable,

    /// The remote shell session exited with a non-zero status.
    #[error("`{command}` on {host} exited with status {status}")]
    RemoteCommand {
        host: String,
        command: String,
        status: i32,
    },
}

impl Error {
    pub fn transport<E>(host: &str, source: E) -> Error
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Error::Transport {
            host: host.to_owned(),
            source: source.into(),
        }
    }
}
