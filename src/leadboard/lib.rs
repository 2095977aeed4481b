//! # Leadboard Architecture
//!
//! Leadboard is the **UI-agnostic core of a lead and campaign dashboard**: the
//! data model, a cached asynchronous query layer over it, and the view state
//! that decides which filters and sorts are active. The bundled binary is one
//! possible client; a web or desktop front end would sit on the same API.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (cli/, wired by main.rs)                               │
//! │  - Parses arguments, prints tables, installs logging        │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs)                                               │
//! │  - Owns the query client and the view-state store           │
//! │  - Turns view state into query parameters                   │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                              │
//!                 ▼                              ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Query (query.rs, cache.rs)   │ │  View state (state.rs)    │
//! │  - One cache per operation    │ │  - Single writer          │
//! │  - Staleness, coalescing      │ │  - Persists a subset      │
//! └───────────────────────────────┘ └───────────────────────────┘
//!                 │                              │
//!                 ▼                              │
//! ┌───────────────────────────────┐              │
//! │  Commands (commands/*.rs)     │              │
//! │  - Filter, sort, paginate,    │              │
//! │    aggregate. Pure.           │              │
//! └───────────────────────────────┘              │
//!                 │                              ▼
//!                 ▼                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (store/)                                           │
//! │  - DataSource: seed records (read-only)                     │
//! │  - StatePersistence: JSON file or in-memory                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never exits the
//! process. Diagnostics go through `tracing`; installing a subscriber is the
//! client's job.
//!
//! ## Concurrency
//!
//! Queries are `async` and meant for a single-threaded executor. The only
//! suspension point is the simulated source latency. Concurrent calls for one
//! cache key share a single fetch.
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: unit and property tests of the query semantics. Most tests live here.
//! 2. **Cache / Query**: paused-clock tokio tests for staleness, coalescing and
//!    invalidation, with a counting data source.
//! 3. **State**: restart simulation through a shared in-memory persistence.
//! 4. **CLI** (`tests/`): the binary against a temporary data directory.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`cache`]: Keyed memoization with staleness and coalescing
//! - [`commands`]: Filtering, sorting, pagination and aggregation
//! - [`config`]: Timing configuration
//! - [`error`]: Error types
//! - [`init`]: Data directory resolution and context setup
//! - [`model`]: `Lead`, `Campaign` and their enumerations
//! - [`query`]: The seven cached read operations and the dashboard summary
//! - [`state`]: The view-state store
//! - [`store`]: Data source and state persistence backends
//! - `cli`: Argument parsing, printing and logging setup for the binary (not part of the lib API)

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod model;
pub mod query;
pub mod state;
pub mod store;
