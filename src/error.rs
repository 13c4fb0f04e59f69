use thiserror::Error;

pub type Result<T> = std::result::Result<T, PatternError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    #[error("no strategy selected for slot '{slot}'")]
    NoStrategySelected { slot: String },

    #[error("'{layer}' is already part of the chain it would wrap")]
    CyclicChain { layer: String },

    #[error("unknown strategy '{name}' (available: {})", .available.join(", "))]
    UnknownStrategy { name: String, available: Vec<String> },

    #[error("a strategy named '{name}' is already registered")]
    DuplicateStrategy { name: String },

    #[error("operation '{operation}' failed: {message}")]
    Failed { operation: String, message: String },

    #[error("no copies of '{title}' left to borrow")]
    NoCopiesAvailable { title: String },

    #[error("'{borrower}' has not borrowed '{title}'")]
    NotBorrowed { title: String, borrower: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PatternError {
    pub fn no_strategy(slot: impl Into<String>) -> Self {
        Self::NoStrategySelected { slot: slot.into() }
    }

    pub fn cyclic(layer: impl Into<String>) -> Self {
        Self::CyclicChain {
            layer: layer.into(),
        }
    }

    /// Failure raised by an operation's own logic.
    pub fn failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<toml::de::Error> for PatternError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
