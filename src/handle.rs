use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        ///
        /// Handles are 1-based; the value 0 is reserved for `INVALID`. A
        /// handle is only a number until a `Molecule` checks it against its
        /// current bounds, so any value can be built and none is trusted.
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(usize);

        impl $name {
            pub const INVALID: Self = Self(0);

            /// Wraps a raw handle value without checking it.
            pub const fn from_raw(raw: usize) -> Self {
                Self(raw)
            }

            /// The handle for a 0-based index.
            pub const fn from_index(index: usize) -> Self {
                Self(index + 1)
            }

            pub const fn raw(self) -> usize {
                self.0
            }

            pub const fn is_invalid(self) -> bool {
                self.0 == 0
            }

            /// The 0-based index this handle names, before bounds checking.
            pub(crate) fn index(self) -> Option<usize> {
                self.0.checked_sub(1)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter) -> FmtResult {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter) -> FmtResult {
                write!(f, "{}", self.0)
            }
        }
    };
}

handle!(
    /// Opaque reference to an atom of a `Molecule`.
    AtomId,
    "a"
);
handle!(
    /// Opaque reference to a bond of a `Molecule`.
    BondId,
    "b"
);
handle!(
    /// Opaque reference to a stereo descriptor of a `Molecule`.
    StereoId,
    "s"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing() {
        assert_eq!(AtomId::from_index(0).raw(), 1);
        assert_eq!(AtomId::from_index(4).index(), Some(4));
        assert_eq!(AtomId::INVALID.index(), None);
        assert!(BondId::default().is_invalid());
        assert_eq!(format!("{:?}", StereoId::from_raw(3)), "s3");
    }
}
