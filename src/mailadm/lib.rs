//! # mailadm Architecture
//!
//! mailadm is a **UI-agnostic library** for administering email-hosting
//! resources: domains, mailboxes, users, broadcasts and usage reports. The
//! terminal client in `cli/` is one consumer of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders tables and messages            │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Turns raw arguments into selectors                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic per collection, returns CmdResult         │
//! │  - Lists go through the table pipeline (table/)             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait over the whole Dataset                   │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Table Pipeline
//!
//! Every listing runs the same steps over an in-memory collection:
//! search, then column filters, then a stable sort, then pagination, then
//! cell rendering. See [`table`]. The pipeline never fails: a row missing a
//! field simply does not match.
//!
//! ## No I/O in the Core
//!
//! From `api.rs` inward, code takes Rust values and returns Rust values. It
//! never writes to stdout or stderr and never exits the process. Destructive
//! commands ask for confirmation through a callback supplied by the client.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade
//! - [`commands`]: one module per collection, plus dashboard, reports, config and init
//! - [`table`]: search, filter, sort, paginate, render
//! - [`store`]: storage abstraction and implementations
//! - [`model`]: record types and their closed enumerations
//! - [`seed`]: the sample dataset a new install starts from
//! - [`selector`]: id / natural-key selectors
//! - [`config`]: `config.json` handling
//! - [`error`]: error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod seed;
pub mod selector;
pub mod store;
pub mod table;
