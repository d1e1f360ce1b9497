//! Command Errors
//!
//! Every failure a command can report to a client. The `Display` form of
//! each variant is the exact error line that goes out on the wire.

use thiserror::Error;

/// Errors returned by the command layer, the keyspace and the value types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),

    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongNumberOfArguments(&'static str),

    /// An argument declared as an integer did not parse.
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,

    /// An argument declared as a float did not parse.
    #[error("ERR value is not a valid float")]
    NotAFloat,

    #[error("ERR syntax error")]
    Syntax,

    /// The key holds a value that lacks the requested capability.
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    InvalidValueType,

    #[error("ERR hash value is not an integer")]
    FieldNotInteger,

    #[error("ERR hash value is not a float")]
    FieldNotFloat,

    #[error("ERR no such key")]
    NoSuchKey,

    #[error("ERR index out of range")]
    IndexOutOfRange,

    #[error("ERR invalid expire time in '{0}' command")]
    InvalidExpireTime(&'static str),

    #[error("ERR increment or decrement would overflow")]
    Overflow,

    #[error("ERR increment would produce NaN or Infinity")]
    NanOrInfinity,

    #[error("ERR offset is out of range")]
    OffsetOutOfRange,

    /// The key was removed from the keyspace between lookup and lock.
    /// The dispatcher re-resolves the key and runs the command again, so
    /// this never reaches a client.
    #[error("ERR key was removed concurrently")]
    KeyDetached,
}

/// Result type returned by command bodies.
pub type CommandResult<T = crate::protocol::RespValue> = Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_lines() {
        assert_eq!(
            CommandError::WrongNumberOfArguments("hset").to_string(),
            "ERR wrong number of arguments for 'hset' command"
        );
        assert_eq!(
            CommandError::InvalidValueType.to_string(),
            "WRONGTYPE Operation against a key holding the wrong kind of value"
        );
        assert_eq!(
            CommandError::UnknownCommand("nope".into()).to_string(),
            "ERR unknown command 'nope'"
        );
    }
}
