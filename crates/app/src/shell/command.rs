//! Shell command parsing.

use std::{num::NonZeroUsize, str::FromStr};

use thiserror::Error;

/// Errors raised while parsing a shell line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command word is not known.
    #[error("unknown command `{0}`, type `help` for a list of commands")]
    Unknown(String),

    /// A required argument is missing.
    #[error("usage: {0}")]
    Usage(&'static str),

    /// The cart position is not a positive number.
    #[error("`{0}` is not a cart position")]
    InvalidPosition(String),
}

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the whole catalog.
    List,

    /// Show products whose name contains the term.
    Search(String),

    /// Add one unit of a product to the cart.
    Add(String),

    /// Remove the entry at a 1-based cart position.
    Remove(NonZeroUsize),

    /// Show the cart.
    Cart,

    /// Check out under the given buyer name.
    Checkout(String),

    /// Reload the catalog from the inventory service.
    Refresh,

    /// Show the command list.
    Help,

    /// Leave the shell.
    Quit,

    /// Blank line.
    Empty,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_ascii_lowercase().as_str() {
            "" => Ok(Self::Empty),
            "list" | "ls" => Ok(Self::List),
            "search" | "find" => Ok(Self::Search(rest.to_string())),
            "add" => required(rest, "add <product-id>").map(Self::Add),
            "remove" | "rm" => {
                let position = required(rest, "remove <cart-position>")?;

                position
                    .parse()
                    .map(Self::Remove)
                    .map_err(|_err| CommandError::InvalidPosition(position))
            }
            "cart" => Ok(Self::Cart),
            "checkout" => Ok(Self::Checkout(rest.to_string())),
            "refresh" => Ok(Self::Refresh),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn required(argument: &str, usage: &'static str) -> Result<String, CommandError> {
    if argument.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(argument.to_string())
    }
}
