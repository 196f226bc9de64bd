use serde::{Deserialize, Serialize};

use crate::{LayoutError, Malformed};

// -----------------------------------------------------------------------------
// Target

/// The data model primitives and pointers are sized against.
///
/// Can be loaded from configuration:
///
/// ```
/// use mv_layout::Target;
///
/// let target: Target = serde_json::from_str(r#"{ "pointer_size": 4, "max_align": 4 }"#).unwrap();
/// assert_eq!(target, Target::ILP32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Byte size of a pointer, and of one machine word.
    pub pointer_size: usize,
    /// The largest alignment a scalar is given, e.g. `int64` on a 32-bit target.
    pub max_align: usize,
}

impl Target {
    /// 64-bit pointers, 8-byte scalars aligned to 8.
    pub const LP64: Self = Self {
        pointer_size: 8,
        max_align: 8,
    };

    /// 32-bit pointers, 8-byte scalars aligned to 4.
    pub const ILP32: Self = Self {
        pointer_size: 4,
        max_align: 4,
    };

    /// The data model of the compiling machine.
    pub const HOST: Self = Self {
        pointer_size: size_of::<usize>(),
        max_align: align_of::<u64>(),
    };

    /// Checks both fields are non-zero powers of two.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.pointer_size.is_power_of_two() && self.max_align.is_power_of_two() {
            Ok(())
        } else {
            Err(LayoutError::malformed(
                "<target>",
                Malformed::InvalidTarget {
                    pointer_size: self.pointer_size,
                    max_align: self.max_align,
                },
            ))
        }
    }

    /// Alignment of a word-sized value.
    #[inline]
    pub const fn word_align(&self) -> usize {
        self.scalar_align(self.pointer_size)
    }

    /// Alignment given to a scalar that asks for `align`.
    #[inline]
    pub const fn scalar_align(&self, align: usize) -> usize {
        if align < self.max_align {
            align
        } else {
            self.max_align
        }
    }
}

impl Default for Target {
    #[inline]
    fn default() -> Self {
        Self::HOST
    }
}

#[cfg(test)]
mod tests {
    use super::Target;
    use crate::{LayoutError, Malformed};

    #[test]
    fn presets_are_valid() {
        for target in [Target::LP64, Target::ILP32, Target::HOST] {
            assert!(target.validate().is_ok());
        }
        assert_eq!(Target::ILP32.scalar_align(8), 4);
        assert_eq!(Target::LP64.scalar_align(8), 8);
        assert_eq!(Target::LP64.scalar_align(2), 2);
    }

    #[test]
    fn invalid_target_is_malformed() {
        let bad = Target {
            pointer_size: 6,
            max_align: 8,
        };
        assert!(matches!(
            bad.validate(),
            Err(LayoutError::MalformedDescriptor {
                reason: Malformed::InvalidTarget { pointer_size: 6, .. },
                ..
            })
        ));
    }

    #[test]
    fn loads_from_ron() {
        let target: Target = ron::from_str("(pointer_size: 8, max_align: 8)").unwrap();
        assert_eq!(target, Target::LP64);
    }
}
