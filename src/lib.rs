//! Quotebook - Quote catalog with categories, import/export and remote sync
//!
//! Quotebook keeps an ordered catalog of `{text, category}` quotes, lets a
//! user draw a random quote from a category, add new ones, exchange the
//! catalog as a JSON file, and poll a remote collection endpoint for more.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │              CLI (clap)          HTTP API (axum)             │
//! └───────────────────────────┬──────────────────────────────────┘
//!                             │
//! ┌───────────────────────────▼──────────────────────────────────┐
//! │                         QuoteApp                              │
//! │  ┌────────────────┐ ┌───────────────┐ ┌───────────────────┐  │
//! │  │  Quote Store   │ │ Session Cache │ │   Sync Adapter    │  │
//! │  │ add / merge    │ │ last category │ │ pull / push       │  │
//! │  │ load / save    │ │ last quote    │ │ Idle / Syncing    │  │
//! │  └───────┬────────┘ └───────┬───────┘ └─────────┬─────────┘  │
//! └──────────┼──────────────────┼───────────────────┼────────────┘
//!            │                  │                   │
//!     persistent slot     session slot      remote endpoint
//!     (quotes.json)       (file/memory)     (GET / POST)
//! ```
//!
//! ## Modules
//!
//! - [`quote`]: quote record, catalog dedup, category index
//! - [`storage`]: key-value slots, quote store, session cache
//! - [`transfer`]: JSON import and export
//! - [`sync`]: remote source, sync adapter, poller
//! - [`app`]: application context shared by the CLI and the API
//! - [`api`]: HTTP API
//! - [`config`]: Configuration management

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod quote;
pub mod storage;
pub mod sync;
pub mod transfer;

pub use app::{QuoteApp, SessionScope};
pub use config::QuotebookConfig;
pub use error::{Error, Result};
