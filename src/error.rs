use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    /// Malformed declarative input; fatal to the compile or edit call.
    #[error("definition error: {0}")]
    Definition(String),

    /// Two distinct commands resolved to the same key within one instance.
    #[error("key conflict in {prefix}: `{key}` is bound to both {first} and {second}")]
    Conflict {
        prefix: String,
        key: String,
        first: String,
        second: String,
    },

    #[error("read failed: {0}")]
    Read(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("{0} is undefined")]
    UndefinedKey(String),

    #[error("unknown prefix: {0}")]
    UnknownPrefix(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("cannot locate {0}")]
    Locator(String),

    #[error("no menu is active")]
    Inactive,

    #[error("command {command} failed: {message}")]
    Command { command: String, message: String },
}

impl MenuError {
    pub fn definition(msg: impl Into<String>) -> Self {
        MenuError::Definition(msg.into())
    }

    /// Errors that surface to the caller instead of being converted into an
    /// emergency teardown.
    pub fn is_hard(&self) -> bool {
        matches!(self, MenuError::Definition(_) | MenuError::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, MenuError>;
