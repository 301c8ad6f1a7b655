//! Resolver configuration.
//!
//! `TargetWidths` fixes the concrete bit widths the classifier and the
//! narrowing checker reason about; `ResolverConfig` bundles them with the
//! diagnostic settings and the continuation policy.

use cdecl_diagnostic::DiagnosticConfig;
use cdecl_ir::{CharSign, IntWidth, Signedness, Type};

/// Concrete widths of the integer types.
///
/// The defaults are the guaranteed minimums, except `int`, which is treated
/// as 32 bits.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TargetWidths {
    pub char_bits: u32,
    pub short_bits: u32,
    pub int_bits: u32,
    pub long_bits: u32,
    pub long_long_bits: u32,
    /// Whether plain `char` has the range of `signed char`.
    pub char_is_signed: bool,
}

impl Default for TargetWidths {
    fn default() -> Self {
        TargetWidths {
            char_bits: 8,
            short_bits: 16,
            int_bits: 32,
            long_bits: 32,
            long_long_bits: 64,
            char_is_signed: true,
        }
    }
}

impl TargetWidths {
    /// An LP64 target (`long` is 64 bits).
    pub fn lp64() -> Self {
        TargetWidths {
            long_bits: 64,
            ..Self::default()
        }
    }

    pub fn bits(&self, width: IntWidth) -> u32 {
        match width {
            IntWidth::Short => self.short_bits,
            IntWidth::Int => self.int_bits,
            IntWidth::Long => self.long_bits,
            IntWidth::LongLong => self.long_long_bits,
        }
    }

    /// Inclusive value range of an integral type, or `None` for any other type.
    pub fn integer_range(&self, ty: &Type) -> Option<(i128, i128)> {
        match ty.strip_alias() {
            Type::Bool => Some((0, 1)),
            Type::Char(sign) => {
                let signed = match sign {
                    CharSign::Plain => self.char_is_signed,
                    CharSign::Signed => true,
                    CharSign::Unsigned => false,
                };
                Some(range_of(self.char_bits, signed))
            }
            Type::Integer { width, signedness } => {
                Some(range_of(self.bits(*width), signedness.is_signed()))
            }
            _ => None,
        }
    }

    /// Whether a non-negative literal value fits the given integer type.
    pub fn fits(&self, width: IntWidth, signedness: Signedness, value: i128) -> bool {
        let (min, max) = range_of(self.bits(width), signedness.is_signed());
        (min..=max).contains(&value)
    }
}

fn range_of(bits: u32, signed: bool) -> (i128, i128) {
    if signed {
        let half = 1i128 << (bits - 1);
        (-half, half - 1)
    } else {
        (0, (1i128 << bits) - 1)
    }
}

/// Top-level configuration for one analysis run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ResolverConfig {
    pub widths: TargetWidths,
    pub diagnostics: DiagnosticConfig,
    /// Stop analyzing a unit at its first error instead of collecting more.
    pub abort_on_first_error: bool,
}

impl ResolverConfig {
    #[must_use]
    pub fn with_widths(mut self, widths: TargetWidths) -> Self {
        self.widths = widths;
        self
    }

    #[must_use]
    pub fn aborting(mut self) -> Self {
        self.abort_on_first_error = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ranges() {
        let widths = TargetWidths::default();
        assert_eq!(widths.integer_range(&Type::int()), Some((-2_147_483_648, 2_147_483_647)));
        assert_eq!(widths.integer_range(&Type::uint()), Some((0, 4_294_967_295)));
        assert_eq!(widths.integer_range(&Type::char()), Some((-128, 127)));
        assert_eq!(widths.integer_range(&Type::Bool), Some((0, 1)));
        assert_eq!(widths.integer_range(&Type::double()), None);
    }

    #[test]
    fn unsigned_plain_char_target() {
        let widths = TargetWidths {
            char_is_signed: false,
            ..TargetWidths::default()
        };
        assert_eq!(widths.integer_range(&Type::char()), Some((0, 255)));
    }

    #[test]
    fn lp64_long_is_wide() {
        let widths = TargetWidths::lp64();
        assert!(widths.fits(IntWidth::Long, Signedness::Signed, 1 << 40));
        assert!(!TargetWidths::default().fits(IntWidth::Long, Signedness::Signed, 1 << 40));
    }

    #[test]
    fn unsigned_long_long_max_fits() {
        let widths = TargetWidths::default();
        assert!(widths.fits(IntWidth::LongLong, Signedness::Unsigned, i128::from(u64::MAX)));
        assert!(!widths.fits(IntWidth::LongLong, Signedness::Signed, i128::from(u64::MAX)));
    }
}
