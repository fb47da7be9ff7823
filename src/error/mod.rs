mod config;
mod harness;
mod io;
mod snippet;

pub use config::ConfigError;
pub use harness::HarnessFault;
pub use io::IoError;
pub use snippet::SnippetError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snippet(#[from] SnippetError),

    #[error(transparent)]
    Harness(#[from] HarnessFault),
}

pub type Result<T> = std::result::Result<T, Error>;
