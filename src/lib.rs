//! Keeps a region of a shared pixel canvas in sync with a reference image,
//! one account at a time.

pub mod account;
pub mod clock;
pub mod config;
pub mod coords;
pub mod error;
pub mod image;
pub mod logging;
pub mod painter;
pub mod remote;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use account::Account;
pub use error::{Error, Result};
pub use remote::{CanvasApi, RemoteCanvas};
pub use scheduler::Scheduler;
pub use tokio;
pub use url;
