//! # seglog storage
//!
//! The two file formats a seglog segment is built from.
//!
//! A segment pairs a [`Store`] with an [`Index`]:
//!
//! - The store is an append-only file of length-prefixed frames. It knows
//!   nothing about what the frame payloads mean.
//! - The index is an append-only file of fixed-width entries mapping a
//!   segment-relative record number to the byte position of its frame in
//!   the store.
//!
//! ## File Formats
//!
//! ```text
//! store:  | len (8, BE) | payload (len) | len (8, BE) | payload (len) | ...
//! index:  | rel (4, BE) | pos (8, BE) | rel (4, BE) | pos (8, BE) | ...
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use seglog_storage::{Index, Store};
//! use std::path::Path;
//!
//! let store = Store::open(Path::new("0.store")).unwrap();
//! let index = Index::open(Path::new("0.index"), 1024).unwrap();
//!
//! let (_, pos) = store.append(b"hello").unwrap();
//! index.write(0, pos).unwrap();
//!
//! let (_, pos) = index.read(-1).unwrap();
//! assert_eq!(store.read(pos).unwrap(), b"hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod index;
mod store;

pub use error::{StorageError, StorageResult};
pub use index::{Index, INDEX_ENTRY_WIDTH};
pub use store::{read_frame, Store, LEN_WIDTH};
