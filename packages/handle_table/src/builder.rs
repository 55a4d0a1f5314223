use std::marker::PhantomData;
use std::num::NonZero;

use crate::{DEFAULT_CHUNK_SIZE, DropPolicy, HandleTable};

/// Builder for creating an instance of [`HandleTable`].
///
/// You only need to use this builder if you want to customize the table configuration.
/// The default configuration used by [`HandleTable::new()`][1] is sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use std::num::NonZero;
///
/// use handle_table::{DropPolicy, HandleTable};
///
/// let table = HandleTable::<String>::builder()
///     .chunk_size(NonZero::new(64).unwrap())
///     .drop_policy(DropPolicy::MayDropItems)
///     .build();
///
/// assert_eq!(table.chunk_size().get(), 64);
/// ```
///
/// [1]: HandleTable::new
#[must_use]
pub struct HandleTableBuilder<T> {
    chunk_size: NonZero<usize>,
    drop_policy: DropPolicy,

    _item: PhantomData<T>,
}

impl<T> std::fmt::Debug for HandleTableBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleTableBuilder")
            .field(
                "item_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field("chunk_size", &self.chunk_size)
            .field("drop_policy", &self.drop_policy)
            .finish()
    }
}

impl<T> HandleTableBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            drop_policy: DropPolicy::default(),
            _item: PhantomData,
        }
    }

    /// Sets the number of slots the table adds each time it runs out of vacant slots.
    ///
    /// The first allocation creates exactly one chunk; capacity is always a multiple of this.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::num::NonZero;
    ///
    /// use handle_table::HandleTable;
    ///
    /// let mut table = HandleTable::<u32>::builder()
    ///     .chunk_size(NonZero::new(4).unwrap())
    ///     .build();
    ///
    /// _ = table.insert(1).unwrap();
    /// assert_eq!(table.capacity(), 4);
    /// ```
    pub fn chunk_size(mut self, chunk_size: NonZero<usize>) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the table. This governs how
    /// to treat live handles when the table is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use handle_table::{DropPolicy, HandleTable};
    ///
    /// let table = HandleTable::<u32>::builder()
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    /// ```
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds the handle table with the specified configuration.
    ///
    /// The table starts out absent and allocates nothing until the first handle is requested.
    ///
    /// # Examples
    ///
    /// ```
    /// use handle_table::HandleTable;
    ///
    /// let table = HandleTable::<u32>::builder().build();
    /// assert!(!table.is_allocated());
    /// ```
    #[must_use]
    pub fn build(self) -> HandleTable<T> {
        HandleTable::new_inner(self.chunk_size, self.drop_policy)
    }
}
