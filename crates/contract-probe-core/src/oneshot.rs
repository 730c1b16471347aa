// crates/contract-probe-core/src/oneshot.rs
// ============================================================================
// Module: One-Shot Result Checker
// Description: Bounded assertions over single-result async producers.
// Purpose: Verify "exactly one value, accepted by a predicate, then done".
// Dependencies: thiserror, tokio, tokio-stream
// ============================================================================

//! ## Overview
//! [`expect_single_value`] consumes a stream of `Result` items and succeeds
//! only when the first item is `Ok`, the check accepts it, and the stream then
//! completes without a second item. [`expect_single_future`] is the same
//! check for a producer that can only ever yield once. The timeout bounds the
//! whole check, including waiting for completion after the first value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use thiserror::Error;
use tokio_stream::Stream;
use tokio_stream::StreamExt;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Ways a one-shot check can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OneShotError<E> {
    /// The producer completed without any value.
    #[error("expected exactly one value, producer completed empty")]
    Empty,
    /// The producer yielded an error as its first item.
    #[error("expected a value, producer failed: {0}")]
    Producer(E),
    /// The check rejected the value.
    #[error("value rejected: {0}")]
    Rejected(String),
    /// The producer yielded more than one value.
    #[error("expected completion after the first value, got a second item")]
    SecondValue,
    /// The producer did not finish within the bound.
    #[error("producer did not complete within {} ms", .0.as_millis())]
    TimedOut(Duration),
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Expects `stream` to yield exactly one accepted value, then complete.
///
/// Returns the value on success.
///
/// # Errors
///
/// Returns [`OneShotError`] naming the violated expectation.
pub async fn expect_single_value<S, T, E, F>(
    stream: S,
    timeout: Duration,
    check: F,
) -> Result<T, OneShotError<E>>
where
    S: Stream<Item = Result<T, E>>,
    F: FnOnce(&T) -> Result<(), String>,
{
    let verify = async move {
        let mut stream = pin!(stream);
        let value = match stream.next().await {
            None => return Err(OneShotError::Empty),
            Some(Err(err)) => return Err(OneShotError::Producer(err)),
            Some(Ok(value)) => value,
        };
        check(&value).map_err(OneShotError::Rejected)?;
        if stream.next().await.is_some() {
            return Err(OneShotError::SecondValue);
        }
        Ok(value)
    };
    tokio::time::timeout(timeout, verify).await.map_err(|_| OneShotError::TimedOut(timeout))?
}

/// Expects `future` to resolve to an accepted value within `timeout`.
///
/// # Errors
///
/// Returns [`OneShotError`] naming the violated expectation.
pub async fn expect_single_future<Fut, T, E, F>(
    future: Fut,
    timeout: Duration,
    check: F,
) -> Result<T, OneShotError<E>>
where
    Fut: Future<Output = Result<T, E>>,
    F: FnOnce(&T) -> Result<(), String>,
{
    let value = tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| OneShotError::TimedOut(timeout))?
        .map_err(OneShotError::Producer)?;
    check(&value).map_err(OneShotError::Rejected)?;
    Ok(value)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
