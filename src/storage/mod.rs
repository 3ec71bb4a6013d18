//! Key-value storage areas and the stores built on them
//!
//! - [`slot`]: the `Slot` trait with file-backed and in-memory areas
//! - [`quotes`]: the quote store, sole writer of the catalog slot
//! - [`session`]: best-effort session cache

pub mod quotes;
pub mod session;
pub mod slot;

pub use quotes::{Commit, QuoteStore};
pub use session::{SessionCache, SessionSnapshot};
pub use slot::{FileSlot, MemorySlot, Slot};
