use std::num::NonZero;

use crate::{Error, HandleTable, Result};

/// A payload block that can be created zero-filled with a given size in bytes, without
/// aborting on allocation failure.
///
/// Implemented for the byte buffer types callers typically keep per handle. Implement it for your
/// own block type to use it with [`HandleTable::allocate_entry()`].
pub trait ZeroedPayload: Sized {
    /// Creates a zero-filled block of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the memory could not be obtained.
    fn try_zeroed(size: NonZero<usize>) -> Result<Self>;
}

impl ZeroedPayload for Vec<u8> {
    fn try_zeroed(size: NonZero<usize>) -> Result<Self> {
        let mut block = Self::new();

        block
            .try_reserve_exact(size.get())
            .map_err(|source| Error::AllocationFailed {
                what: "entry payload",
                source,
            })?;

        block.resize(size.get(), 0);

        Ok(block)
    }
}

impl ZeroedPayload for Box<[u8]> {
    fn try_zeroed(size: NonZero<usize>) -> Result<Self> {
        Vec::try_zeroed(size).map(Vec::into_boxed_slice)
    }
}

impl<T: ZeroedPayload> HandleTable<T> {
    /// Allocates a handle together with a zero-filled payload of `payload_size` bytes stored in
    /// its slot, and raises `max_seen` to cover the new handle.
    ///
    /// With a `payload_size` of zero no payload is created and the slot is left reserved.
    ///
    /// `max_seen` is owned by the caller and only ever grows: after the call it is at least
    /// `handle + 1`. It is independent of the table's own capacity, so callers can use it to size
    /// parallel arrays indexed by handle.
    ///
    /// The call is all-or-nothing: on error, neither the table nor `max_seen` has changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if either the payload or the handle could not be
    /// allocated.
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_table::HandleTable;
    ///
    /// let mut sessions = HandleTable::<Vec<u8>>::new();
    /// let mut max_seen = 0;
    ///
    /// let handle = sessions.allocate_entry(&mut max_seen, 32).unwrap();
    ///
    /// assert_eq!(handle, 0);
    /// assert_eq!(max_seen, 1);
    /// assert_eq!(sessions.get(handle), Some(&vec![0; 32]));
    /// # sessions.free(handle);
    /// ```
    pub fn allocate_entry(&mut self, max_seen: &mut usize, payload_size: usize) -> Result<usize> {
        // The payload comes first so that its failure cannot disturb the table at all, not even
        // by growing it.
        let payload = NonZero::new(payload_size)
            .map(T::try_zeroed)
            .transpose()?;

        let handle = self.allocate()?;

        if let Some(payload) = payload {
            let previous = self.set(handle, payload);
            debug_assert!(previous.is_none(), "a fresh handle cannot already hold a value");
        }

        if handle >= *max_seen {
            *max_seen = handle
                .checked_add(1)
                .expect("handle is below capacity, which fits in memory");
        }

        Ok(handle)
    }
}
