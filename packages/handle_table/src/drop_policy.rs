/// Determines what happens when a table that still has live handles is dropped.
///
/// By default, the table drops the values stored in its slots along with itself.
///
/// # Examples
///
/// ```
/// use handle_table::{DropPolicy, HandleTable};
///
/// // The drop policy is set at table creation time.
/// let table = HandleTable::<u32>::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
///
/// assert_eq!(table.drop_policy(), DropPolicy::MustNotDropItems);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// Live handles are released and their slot values dropped together with the table.
    /// This is the default.
    #[default]
    MayDropItems,

    /// The table will panic if any handle is still allocated when it is dropped.
    ///
    /// Use this when handles are referenced from outside the table (for example stored in
    /// parallel arrays or handed to another subsystem) and every one of them is expected to be
    /// freed explicitly before the table goes away.
    MustNotDropItems,
}
