//! Asynchronous utilities for use with Tokio.
//!
//! Extraction itself is synchronous. We only use async code for reading and
//! writing files and record streams, and we keep that plumbing here.

use std::pin::Pin;

use futures::Stream;

pub mod io;

/// A type alias for a boxed stream. This is used to make it easier to work
/// streams that return complex types.
pub type BoxedStream<Item> = Pin<Box<dyn Stream<Item = Item> + Send>>;
