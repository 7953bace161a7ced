//! Concurrent traversal engine
//!
//! # Architecture
//!
//! ```text
//!                  ┌────────────────────────────┐
//!                  │      WalkCoordinator       │
//!                  │  producer loop: pop LIFO   │
//!                  │  frontier → submit task    │
//!                  └─────────────┬──────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        │                       │                       │
//!  ┌─────▼─────┐           ┌─────▼─────┐           ┌─────▼─────┐
//!  │  Worker 1 │           │  Worker 2 │           │  Worker N │
//!  │   scan    │           │   scan    │           │   scan    │
//!  └─────┬─────┘           └─────┬─────┘           └─────┬─────┘
//!        │                       │                       │
//!        └───────────────────────┼───────────────────────┘
//!                                │ merge (single lock)
//!                  ┌─────────────▼──────────────┐
//!                  │ completed map + deferred   │
//!                  │ credits + frontier         │
//!                  └────────────────────────────┘
//! ```
//!
//! Termination: frontier empty and zero active scan tasks.

pub mod coordinator;
pub mod frontier;
pub mod pool;

pub use coordinator::{WalkCoordinator, WalkProgress, WalkResult};
pub use frontier::{Frontier, FrontierEntry};
pub use pool::ThreadPool;
