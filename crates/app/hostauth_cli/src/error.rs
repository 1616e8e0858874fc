use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("Json::{}", .0)]
    Json(#[from] serde_json::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("Setup::{}", .0)]
    Setup(#[from] hostauth_client::SetupError),

    #[error("{}", .0)]
    Client(#[from] hostauth_core::ClientError),
}
