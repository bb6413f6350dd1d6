//! Batch parsing over many inputs
//!
//! Parsers are immutable `Send + Sync` values, so one parser can serve any
//! number of inputs at once. With the `parallel` feature enabled the batch
//! runs on rayon's work-stealing pool; without it the same functions run
//! the inputs sequentially, in the same order either way.
//!
//! ```toml
//! [dependencies]
//! combinol = { version = "0.2", features = ["parallel"] }
//! ```

use crate::parser::{parse_str, Parser};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Parse each UTF-8 input with the same parser; results keep the input
/// order. Failures render as they would from [`crate::parse`].
#[cfg(feature = "parallel")]
pub fn parse_batch<T>(inputs: &[&str], parser: &Parser<T>) -> Vec<Result<T, String>>
where
    T: Send + 'static,
{
    inputs
        .par_iter()
        .map(|input| parse_str(input, parser))
        .collect()
}

/// Sequential fallback used when the `parallel` feature is disabled.
#[cfg(not(feature = "parallel"))]
pub fn parse_batch<T>(inputs: &[&str], parser: &Parser<T>) -> Vec<Result<T, String>>
where
    T: Send + 'static,
{
    inputs
        .iter()
        .map(|input| parse_str(input, parser))
        .collect()
}

/// [`parse_batch`] over owned inputs.
#[cfg(feature = "parallel")]
pub fn parse_batch_owned<T>(inputs: Vec<String>, parser: &Parser<T>) -> Vec<Result<T, String>>
where
    T: Send + 'static,
{
    inputs
        .into_par_iter()
        .map(|input| parse_str(&input, parser))
        .collect()
}

/// Sequential fallback used when the `parallel` feature is disabled.
#[cfg(not(feature = "parallel"))]
pub fn parse_batch_owned<T>(inputs: Vec<String>, parser: &Parser<T>) -> Vec<Result<T, String>>
where
    T: Send + 'static,
{
    inputs
        .into_iter()
        .map(|input| parse_str(&input, parser))
        .collect()
}
