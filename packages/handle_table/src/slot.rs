/// One position in the storage of a [`HandleTable`][crate::HandleTable].
///
/// A slot whose handle is allocated is either [`Reserved`][Slot::Reserved] (the handle exists but
/// the caller has not stored anything in it yet) or [`Occupied`][Slot::Occupied]. Both count as
/// live for the purposes of handle validity and the high-water mark.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum Slot<T> {
    /// No handle is allocated at this index.
    #[default]
    Vacant,

    /// The handle is allocated but holds no value.
    Reserved,

    /// The handle is allocated and holds a value.
    Occupied(T),
}

impl<T> Slot<T> {
    /// Whether no handle is allocated at this slot.
    #[must_use]
    pub fn is_vacant(&self) -> bool {
        matches!(self, Self::Vacant)
    }

    /// Whether a handle is allocated at this slot, with or without a value.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.is_vacant()
    }

    /// The value stored in the slot, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Occupied(value) => Some(value),
            Self::Vacant | Self::Reserved => None,
        }
    }

    /// The value stored in the slot, if any.
    #[must_use]
    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Occupied(value) => Some(value),
            Self::Vacant | Self::Reserved => None,
        }
    }

    /// Consumes the slot, returning its value if it had one.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Occupied(value) => Some(value),
            Self::Vacant | Self::Reserved => None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn liveness_by_state() {
        assert!(Slot::<u8>::Vacant.is_vacant());
        assert!(!Slot::<u8>::Vacant.is_live());

        assert!(Slot::<u8>::Reserved.is_live());
        assert!(Slot::Occupied(5_u8).is_live());
    }

    #[test]
    fn only_occupied_has_value() {
        assert_eq!(Slot::<u8>::Vacant.value(), None);
        assert_eq!(Slot::<u8>::Reserved.value(), None);
        assert_eq!(Slot::Occupied(5_u8).value(), Some(&5));

        let mut slot = Slot::Occupied(5_u8);
        *slot.value_mut().unwrap() = 6;
        assert_eq!(slot.into_value(), Some(6));
    }

    #[test]
    fn default_is_vacant() {
        assert!(Slot::<String>::default().is_vacant());
    }
}
