//! In-process intake queue: cloneable submit handle plus a batching consumer.

mod consumer;
mod handle;

pub use consumer::*;
pub use handle::*;
