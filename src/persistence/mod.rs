//! Background write-back of collection snapshots.
//!
//! Mutations never wait on storage. The catalog hands each freshly encoded
//! snapshot to a [`PersistenceWorker`], which owns a thread that drains the
//! queue and writes to the [`KeyValueStore`](crate::KeyValueStore). Failed
//! writes are logged and counted, never retried.

mod worker;

pub use worker::{PersistenceStats, PersistenceWorker};
