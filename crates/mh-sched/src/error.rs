use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("failed to {op} CPU affinity: {source}")]
    Affinity {
        op: &'static str,
        #[source]
        source: nix::Error,
    },
    #[error("core {core} is outside the supported CPU set")]
    CoreOutOfRange { core: usize },
    #[error("no online cores reported")]
    NoCores,
    #[error("failed to {op} real-time priority: {source}")]
    Priority {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("CPU affinity is not supported on this platform")]
    Unsupported,
}

pub type Result<T> = std::result::Result<T, SchedError>;
