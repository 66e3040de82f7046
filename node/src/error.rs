use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("verification error: {0}")]
    Verification(#[from] veritag_verification::VerificationError),

    #[error("source error: {0}")]
    Source(#[from] veritag_store::SourceError),

    #[error("gateway error: {0}")]
    Gateway(#[from] veritag_gateway::GatewayError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("verification task failed: {0}")]
    Task(String),

    #[error("HTTP server error: {0}")]
    Server(String),
}
