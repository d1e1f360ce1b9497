//! Command Definitions
//!
//! A [`Command`] couples a name, an argument contract ([`ArgDef`]) and a
//! body. Every invocation goes through the same pipeline:
//!
//! ```text
//!   raw args ──► arity ──► ints / floats ──► validate ──► acquire ──► body
//! ```
//!
//! The first failing stage ends the invocation with its error. Bodies come
//! in two shapes, chosen at registration:
//!
//! - **single-key**: the key is resolved with the command's
//!   [`DefaultPolicy`] before the body runs. The body only takes the
//!   per-key lock, so it can never delete the key.
//! - **database**: the body gets the [`Database`] and resolves keys itself.
//!   Commands that may delete a key, or touch several, use this shape.

use crate::error::{CommandError, CommandResult};
use crate::protocol::RespValue;
use crate::storage::{Database, DefaultPolicy, KeyHandle};
use bytes::Bytes;
use tracing::trace;

/// Extra structural check run after numeric parsing.
pub type ValidateFn = fn(&Args) -> CommandResult<()>;

/// Body of a single-key command.
pub type SingleKeyFn = fn(&KeyHandle, &Args) -> CommandResult;

/// Body of a database command.
pub type DatabaseFn = fn(&Database, &Args) -> CommandResult;

/// The argument contract of a command. Positions count from the first
/// argument after the command name.
#[derive(Debug, Clone, Copy)]
pub struct ArgDef {
    pub min_args: usize,
    /// `None` means unbounded.
    pub max_args: Option<usize>,
    pub int_indices: &'static [usize],
    pub float_indices: &'static [usize],
    pub validate: Option<ValidateFn>,
}

impl ArgDef {
    pub const fn range(min_args: usize, max_args: usize) -> Self {
        Self {
            min_args,
            max_args: Some(max_args),
            int_indices: &[],
            float_indices: &[],
            validate: None,
        }
    }

    pub const fn exact(n: usize) -> Self {
        Self::range(n, n)
    }

    pub const fn at_least(min_args: usize) -> Self {
        Self {
            min_args,
            max_args: None,
            int_indices: &[],
            float_indices: &[],
            validate: None,
        }
    }

    pub const fn ints(mut self, indices: &'static [usize]) -> Self {
        self.int_indices = indices;
        self
    }

    pub const fn floats(mut self, indices: &'static [usize]) -> Self {
        self.float_indices = indices;
        self
    }

    pub const fn validate(mut self, check: ValidateFn) -> Self {
        self.validate = Some(check);
        self
    }

    /// Checks arity, parses numeric positions and runs the validator.
    pub fn parse(&self, name: &'static str, raw: Vec<Bytes>) -> CommandResult<Args> {
        let count = raw.len();
        if count < self.min_args || self.max_args.is_some_and(|max| count > max) {
            return Err(CommandError::WrongNumberOfArguments(name));
        }

        let ints = self
            .int_indices
            .iter()
            .filter_map(|&i| raw.get(i))
            .map(|token| parse_int(token))
            .collect::<CommandResult<Vec<_>>>()?;

        let floats = self
            .float_indices
            .iter()
            .filter_map(|&i| raw.get(i))
            .map(|token| parse_float(token))
            .collect::<CommandResult<Vec<_>>>()?;

        let args = Args { raw, ints, floats };
        if let Some(check) = self.validate {
            check(&args)?;
        }
        Ok(args)
    }
}

fn parse_int(token: &[u8]) -> CommandResult<i64> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(CommandError::NotAnInteger)
}

fn parse_float(token: &[u8]) -> CommandResult<f64> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|f| f.is_finite())
        .ok_or(CommandError::NotAFloat)
}

/// Validated arguments of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub raw: Vec<Bytes>,
    /// Parsed integers, in the order of [`ArgDef::int_indices`].
    pub ints: Vec<i64>,
    /// Parsed floats, in the order of [`ArgDef::float_indices`].
    pub floats: Vec<f64>,
}

impl Args {
    /// The key name, i.e. the first argument.
    pub fn key(&self) -> &Bytes {
        &self.raw[0]
    }

    pub fn get(&self, index: usize) -> &Bytes {
        &self.raw[index]
    }

    /// Arguments from `index` on.
    pub fn rest(&self, index: usize) -> &[Bytes] {
        self.raw.get(index..).unwrap_or(&[])
    }

    pub fn int(&self, nth: usize) -> i64 {
        self.ints[nth]
    }

    pub fn float(&self, nth: usize) -> f64 {
        self.floats[nth]
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum Body {
    SingleKey {
        policy: DefaultPolicy,
        run: SingleKeyFn,
    },
    Database(DatabaseFn),
}

/// A registered command.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    name: &'static str,
    def: ArgDef,
    body: Body,
}

impl Command {
    /// A command that operates on the key named by its first argument.
    pub const fn single_key(
        name: &'static str,
        def: ArgDef,
        policy: DefaultPolicy,
        run: SingleKeyFn,
    ) -> Self {
        assert!(def.min_args >= 1, "single-key commands need a key argument");
        Self {
            name,
            def,
            body: Body::SingleKey { policy, run },
        }
    }

    /// A command that resolves its own keys against the database.
    pub const fn database(name: &'static str, def: ArgDef, run: DatabaseFn) -> Self {
        Self {
            name,
            def,
            body: Body::Database(run),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arg_def(&self) -> &ArgDef {
        &self.def
    }

    /// Runs the full pipeline for one invocation.
    pub fn call(&self, db: &Database, raw: Vec<Bytes>) -> CommandResult {
        let args = self.def.parse(self.name, raw)?;

        loop {
            let result = match self.body {
                Body::SingleKey { policy, run } => {
                    let key = db.get_key(args.key(), policy)?;
                    run(&key, &args)
                }
                Body::Database(run) => run(db, &args),
            };

            match result {
                Err(CommandError::KeyDetached) => {
                    trace!(command = self.name, "Key removed concurrently, retrying");
                }
                result => return result,
            }
        }
    }
}

/// Float replies go out as bulk strings in shortest round-trip form.
pub fn float_reply(value: f64) -> RespValue {
    RespValue::bulk_string(value.to_string())
}
