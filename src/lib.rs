//! # mmap-eq: fast byte-for-byte file equality via memory mapping
//!
//! This crate answers one question: do two files have byte-identical
//! contents? It is built for very large files (multi-GiB media) where
//! stream-based comparison is slow: both files are mapped in bounded
//! windows and compared sequentially, stopping at the first differing byte.
//!
//! ## Guarantees
//!
//! - **Size short-circuit**: differently sized files are decided from
//!   metadata alone, in constant time, without opening either file.
//! - **Bounded memory**: at most two windows are mapped at any instant,
//!   each no larger than the configured maximum window size.
//! - **No lingering locks**: every mapping is released synchronously and
//!   every handle closed on every exit path, so the caller can delete or
//!   rewrite both files immediately after the call returns.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mmap_eq::contents_equal;
//!
//! if contents_equal("video_a.mkv", "video_b.mkv")? {
//!     println!("identical contents");
//! }
//! # Ok::<(), mmap_eq::MmapEqError>(())
//! ```
//!
//! ## Modules
//!
//! - [`errors`]: Error types for all comparison operations
//! - [`utils`]: Page size and bounds-checking helpers
//! - [`window`]: Bounded read-only mapped windows with deterministic release
//! - [`compare`]: The windowed comparator and convenience function

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/mmap-eq")]

pub mod compare;
pub mod errors;
pub mod utils;
pub mod window;

pub use compare::{contents_equal, ContentComparator, DEFAULT_MAX_WINDOW};
pub use errors::{IoPhase, MmapEqError};
pub use window::MappedWindow;
