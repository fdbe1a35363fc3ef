//! Asynchronous utilities for use with Tokio.
//!
//! Extraction itself is synchronous and CPU-bound, so the glue here is mostly
//! about moving that work off the async executor and streaming records in
//! and out.

use std::{panic, pin::Pin};

use futures::Stream;

use crate::prelude::*;

pub mod io;
pub mod size_hint;

/// A type alias for a boxed future. This is used to make it easier to work with
/// with complex futures.
pub type BoxedFuture<Output> = Pin<Box<dyn Future<Output = Output> + Send>>;

/// A type alias for a boxed stream. This is used to make it easier to work
/// streams that return complex types.
pub type BoxedStream<Item> = Pin<Box<dyn Stream<Item = Item> + Send>>;

/// Run a synchronous function on Tokio's blocking thread pool.
///
/// If `f` panics, the panic is resumed in the caller, so that bugs in
/// extraction code aren't reported as ordinary errors.
pub async fn spawn_blocking_propagating_panics<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => Ok(value),
        Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
        Err(err) => Err(err).context("blocking task was cancelled"),
    }
}
