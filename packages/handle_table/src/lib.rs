#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A table that hands out small integer handles to caller data and reuses freed handles before
//! growing.
//!
//! Subsystems that create objects dynamically (sockets, sessions, file descriptors) often want to
//! refer to them by a stable small integer instead of by reference. [`HandleTable`] provides
//! exactly that: each handle names one [`Slot`] in a growable table, and the table always hands
//! out the lowest free handle so the range of live handles stays compact.
//!
//! # Key Features
//!
//! - **Lowest-free reuse**: freed handles are reused, lowest first, before the table grows
//! - **Chunked growth**: capacity grows in fixed chunks (16 slots by default, configurable)
//! - **Lazy storage**: no memory is held while no handle is live; freeing the last handle
//!   releases everything
//! - **High-water mark**: [`free()`][HandleTable::free] reports one past the greatest live
//!   handle, bounding scans over all live handles
//! - **Fallible allocation**: running out of memory is reported as [`Error::AllocationFailed`]
//!   and leaves the table untouched
//! - **Payload entries**: [`allocate_entry()`][HandleTable::allocate_entry] allocates a handle
//!   together with a zero-filled payload block, all-or-nothing
//!
//! # Examples
//!
//! ```rust
//! use std::num::NonZero;
//!
//! use handle_table::HandleTable;
//!
//! let mut table = HandleTable::<&str>::builder()
//!     .chunk_size(NonZero::new(4).unwrap())
//!     .build();
//!
//! let a = table.insert("a").unwrap();
//! let b = table.insert("b").unwrap();
//! let c = table.insert("c").unwrap();
//! assert_eq!((a, b, c), (0, 1, 2));
//!
//! // The mark stays at 3 because handle 2 is still live.
//! assert_eq!(table.free(b), 3);
//!
//! // Handle 1 is the lowest free one, so it is reused.
//! assert_eq!(table.insert("d").unwrap(), 1);
//!
//! for handle in 0..table.high_water_mark() {
//!     if let Some(value) = table.get(handle) {
//!         println!("{handle}: {value}");
//!     }
//! }
//! # table.free(a);
//! # table.free(1);
//! # table.free(c);
//! ```

mod builder;
mod drop_policy;
mod entry;
mod error;
mod slot;
mod table;

pub use builder::*;
pub use drop_policy::*;
pub use entry::*;
pub use error::*;
pub use slot::*;
pub use table::*;
