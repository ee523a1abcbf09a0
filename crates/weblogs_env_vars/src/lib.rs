//! Access to the environment variables that configure a processing run.
//!
//! All lookups go through [dotenvy], so values from a `.env` file in the
//! current or a parent directory are visible as well. Unset variables are
//! reported as `None`, other failures (like non-unicode values) as errors.

use anyhow::{Context, anyhow};
use secrecy::SecretString;
use std::error::Error;
use std::str::FromStr;

/// Reads an environment variable, returning `Ok(None)` if it isn't set.
#[track_caller]
pub fn var(key: &str) -> anyhow::Result<Option<String>> {
    match dotenvy::var(key) {
        Ok(content) => Ok(Some(content)),
        Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(None),
        Err(error) => {
            Err(error).with_context(|| format!("Failed to read {key} environment variable"))
        }
    }
}

/// Reads an environment variable that has to be set.
#[track_caller]
pub fn required_var(key: &str) -> anyhow::Result<String> {
    var(key)?.ok_or_else(|| missing(key))
}

/// Reads an environment variable that holds a credential.
///
/// The value is wrapped in a [SecretString] so that it can't accidentally end
/// up in log output.
#[track_caller]
pub fn required_secret(key: &str) -> anyhow::Result<SecretString> {
    required_var(key).map(SecretString::from)
}

/// Reads an environment variable and parses it with [FromStr], if it is set.
#[track_caller]
pub fn var_parsed<R>(key: &str) -> anyhow::Result<Option<R>>
where
    R: FromStr,
    R::Err: Error + Send + Sync + 'static,
{
    let Some(content) = var(key)? else {
        return Ok(None);
    };

    let value = content
        .parse()
        .with_context(|| format!("Failed to parse {key} environment variable"))?;

    Ok(Some(value))
}

/// Reads an environment variable that has to be set and parses it with
/// [FromStr].
#[track_caller]
pub fn required_var_parsed<R>(key: &str) -> anyhow::Result<R>
where
    R: FromStr,
    R::Err: Error + Send + Sync + 'static,
{
    var_parsed(key)?.ok_or_else(|| missing(key))
}

fn missing(key: &str) -> anyhow::Error {
    anyhow!("Failed to find required {key} environment variable")
}
