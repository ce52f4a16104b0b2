//! Domain models for the library.
//!
//! # Core Concepts
//!
//! ## Permanent Entities
//!
//! - [`Node`]: An entry in the world tree. Folders group other nodes, files are
//!   the selectable units of knowledge. A file may be paired with a memo file
//!   that holds the creator's note.
//! - [`MemoryCrystal`]: An immutable snapshot of one completed reflection cycle.
//!   Once integrated it is appended to the chronicle and never changes.
//!
//! ## Ephemeral Entities
//!
//! - [`ThoughtReply`]: The parsed output of one generation call. It lives in the
//!   library state until the next cycle replaces it or integration clears it.

mod crystal;
mod node;

pub use crystal::*;
pub use node::*;
