//! Namespace walker
//!
//! This module implements a strictly level-ordered walk over a
//! [`NamespaceClient`](crate::hdfs::NamespaceClient), streaming matching
//! entries to the caller while it keeps exploring.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │      LevelWalker        │
//!                     │  - root stat + summary  │
//!                     │    on caller's thread   │
//!                     └───────────┬─────────────┘
//!                                 │ spawn
//!                     ┌───────────▼─────────────┐
//!                     │   level-walker thread   │
//!                     │  - LISTSTATUS per dir   │
//!                     │  - filter, summarize    │
//!                     └───────────┬─────────────┘
//!                                 │ bounded(1)
//!                     ┌───────────▼─────────────┐
//!                     │       WalkStream        │
//!                     │  - consumer iterator    │
//!                     └─────────────────────────┘
//! ```

pub mod entry;
pub mod filter;
pub mod level;

pub use entry::EntryDescriptor;
pub use filter::{in_window, TimeWindow, WalkOptions};
pub use level::{LevelWalker, WalkStats, WalkStream};
