//! Subcommand implementations.

pub mod cart;
pub mod pay;

use thiserror::Error;

/// Errors raised while parsing command arguments.
#[derive(Debug, Error)]
pub enum ArgError {
    /// `--meta` value without `=`.
    #[error("Invalid metadata `{0}`, expected key=value")]
    InvalidMetadata(String),

    /// Link item that is not `product` or `product:quantity`.
    #[error("Invalid item `{0}`, expected product or product:quantity")]
    InvalidItem(String),
}

/// Parse a `key=value` pair.
pub fn parse_key_value(raw: &str) -> Result<(String, String), ArgError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| ArgError::InvalidMetadata(raw.to_owned()))?;
    if key.is_empty() {
        return Err(ArgError::InvalidMetadata(raw.to_owned()));
    }
    Ok((key.to_owned(), value.to_owned()))
}

/// Parse `product` or `product:quantity`.
pub fn parse_item(raw: &str) -> Result<(String, u32), ArgError> {
    match raw.split_once(':') {
        None if !raw.is_empty() => Ok((raw.to_owned(), 1)),
        Some((id, quantity)) if !id.is_empty() => quantity
            .parse()
            .map(|q| (id.to_owned(), q))
            .map_err(|_| ArgError::InvalidItem(raw.to_owned())),
        _ => Err(ArgError::InvalidItem(raw.to_owned())),
    }
}
