#[derive(Debug, thiserror::Error)]
pub enum HteError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("logic error: {0}")]
    Logic(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_variant_and_message() {
        let err = HteError::Config("missing OPENAI_API_KEY".to_string());
        assert_eq!(err.to_string(), "configuration error: missing OPENAI_API_KEY");
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: HteError = io_err.into();
        assert!(matches!(err, HteError::Io(_)));
    }
}
