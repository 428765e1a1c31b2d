use thiserror::Error;

#[derive(Error, Debug)]
pub enum Neo3Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Precision error: {0}")]
    Precision(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Neo3Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Neo3Error::Validation(message.into())
    }
}

impl From<serde_json::Error> for Neo3Error {
    fn from(e: serde_json::Error) -> Self {
        Neo3Error::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Neo3Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_display_carries_code() {
        let err = Neo3Error::Rpc {
            code: -32602,
            message: "Invalid params".to_string(),
        };
        assert_eq!(err.to_string(), "RPC error -32602: Invalid params");
    }
}
