//! Background execution: the bounded job pool and the catch-up queue.

pub(crate) mod catch_up;
pub mod pool;

pub use pool::JobPool;
