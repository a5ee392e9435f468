// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A declarative macro for the flag sets used by descriptors and commands.
//!
//! Flag sets generated here are plain `Copy` newtypes over an integer, so they
//! can be stored inside command packets and compared cheaply during replay.

/// Defines a flag-set newtype with set operations and a readable `Debug` output.
#[macro_export]
#[doc(hidden)]
macro_rules! vesta_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// An empty set of flags.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Creates a flag set from raw bits, keeping bits that match no named flag.
            pub const fn from_bits_retain(bits: $ty) -> Self {
                Self { bits }
            }

            /// Returns the raw value of the flag set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` when no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if all flags in `other` are contained within `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if any flag in `other` is contained within `self`.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Inserts the flags in `other` into `self`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Removes the flags in `other` from `self`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            /// Returns a copy of `self` with `other` inserted.
            #[must_use]
            pub const fn with(mut self, other: Self) -> Self {
                self.bits |= other.bits;
                self
            }

            /// Returns a copy of `self` with `other` removed.
            #[must_use]
            pub const fn without(mut self, other: Self) -> Self {
                self.bits &= !other.bits;
                self
            }
        }

        impl ::core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl ::core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl ::core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl ::core::ops::BitAndAssign for $name {
            fn bitand_assign(&mut self, other: Self) {
                self.bits &= other.bits;
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                let mut remaining = self.bits;
                let mut first = true;

                write!(f, "{} {{ ", stringify!($name))?;
                $(
                    let flag: $ty = $flag_value;
                    if flag != 0 && (remaining & flag) == flag {
                        if !first {
                            write!(f, " | ")?;
                        }
                        write!(f, "{}", stringify!($flag_name))?;
                        remaining &= !flag;
                        first = false;
                    }
                )*
                if remaining != 0 {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "UNKNOWN({:#x})", remaining)?;
                    first = false;
                }
                if first {
                    write!(f, "EMPTY")?;
                }
                write!(f, " }}")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::vesta_bitflags;

    vesta_bitflags! {
        /// Flags used to exercise the macro.
        pub struct ClearFlagsForTest: u32 {
            const COLOR = 1 << 0;
            const DEPTH = 1 << 1;
            const STENCIL = 1 << 2;
            const COLOR_DEPTH = Self::COLOR.bits() | Self::DEPTH.bits();
        }
    }

    #[test]
    fn empty_set_prints_empty() {
        let flags = ClearFlagsForTest::EMPTY;
        assert!(flags.is_empty());
        assert_eq!(ClearFlagsForTest::default(), flags);
        assert_eq!(format!("{flags:?}"), "ClearFlagsForTest { EMPTY }");
    }

    #[test]
    fn combined_constant_contains_its_parts() {
        let flags = ClearFlagsForTest::COLOR_DEPTH;
        assert!(flags.contains(ClearFlagsForTest::COLOR));
        assert!(flags.contains(ClearFlagsForTest::DEPTH));
        assert!(!flags.contains(ClearFlagsForTest::STENCIL));
        assert_eq!(format!("{flags:?}"), "ClearFlagsForTest { COLOR | DEPTH }");
    }

    #[test]
    fn unknown_bits_are_retained_and_reported() {
        let flags = ClearFlagsForTest::from_bits_retain(0b1001);
        assert_eq!(flags.bits(), 0b1001);
        assert_eq!(
            format!("{flags:?}"),
            "ClearFlagsForTest { COLOR | UNKNOWN(0x8) }"
        );
    }

    #[test]
    fn insert_remove_with_without() {
        let mut flags = ClearFlagsForTest::COLOR;
        flags.insert(ClearFlagsForTest::STENCIL);
        assert!(flags.intersects(ClearFlagsForTest::STENCIL));
        flags.remove(ClearFlagsForTest::COLOR);
        assert_eq!(flags, ClearFlagsForTest::STENCIL);

        let with = flags.with(ClearFlagsForTest::DEPTH);
        assert_eq!(with.bits(), 0b110);
        assert_eq!(with.without(ClearFlagsForTest::STENCIL), ClearFlagsForTest::DEPTH);
        assert_eq!(
            (with & ClearFlagsForTest::DEPTH) | ClearFlagsForTest::COLOR,
            ClearFlagsForTest::COLOR_DEPTH
        );
    }
}
