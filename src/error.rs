/// Errors surfaced by the repaint library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration, image grid, palette or credential list.
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure talking to the game server.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a status the caller doesn't handle.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
