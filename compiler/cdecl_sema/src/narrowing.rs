//! Narrowing conversion checks.
//!
//! A conversion is narrowing when the target cannot represent every value
//! the source can hold. Known constants get a second chance: a constant that
//! fits the target is not narrowed, whatever its type.

use cdecl_ir::{ConstValue, FloatPrecision, Type};

use crate::config::TargetWidths;

/// A narrowing conversion, with both types canonicalized.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct NarrowingError {
    pub source: Type,
    pub target: Type,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct NarrowingChecker {
    widths: TargetWidths,
}

impl NarrowingChecker {
    pub fn new(widths: TargetWidths) -> Self {
        NarrowingChecker { widths }
    }

    /// Check a conversion from `source` (with an optionally known constant
    /// value) to `target`.
    pub fn check(
        &self,
        source: &Type,
        value: Option<ConstValue>,
        target: &Type,
    ) -> Result<(), NarrowingError> {
        let source = source.object_type().canonical();
        let target = target.object_type().canonical();

        let narrowing = if source.is_integral() && target.is_integral() {
            self.integer_narrows(&source, value, &target)
        } else if source.is_floating() && target.is_floating() {
            float_narrows(&source, value, &target)
        } else {
            // float -> integer and integer -> float narrow unconditionally;
            // every other pairing is not an arithmetic conversion at all
            (source.is_floating() && target.is_integral())
                || (source.is_integral() && target.is_floating())
        };

        if narrowing {
            tracing::trace!(?source, ?target, "narrowing conversion");
            Err(NarrowingError { source, target })
        } else {
            Ok(())
        }
    }

    pub fn is_narrowing(&self, source: &Type, value: Option<ConstValue>, target: &Type) -> bool {
        self.check(source, value, target).is_err()
    }

    fn integer_narrows(&self, source: &Type, value: Option<ConstValue>, target: &Type) -> bool {
        let (Some((src_min, src_max)), Some((dst_min, dst_max))) = (
            self.widths.integer_range(source),
            self.widths.integer_range(target),
        ) else {
            return false;
        };
        if dst_min <= src_min && src_max <= dst_max {
            return false;
        }
        match value {
            Some(ConstValue::Int(v)) => !(dst_min..=dst_max).contains(&v),
            _ => true,
        }
    }
}

fn float_narrows(source: &Type, value: Option<ConstValue>, target: &Type) -> bool {
    let (Type::Float(from), Type::Float(to)) = (source, target) else {
        return false;
    };
    if from <= to {
        return false;
    }
    match value {
        Some(ConstValue::Float(v)) => !exactly_representable(v, *to),
        _ => true,
    }
}

/// Constants are held as `f64`, so only a `float` target can lose bits.
fn exactly_representable(value: f64, precision: FloatPrecision) -> bool {
    if !value.is_finite() {
        return false;
    }
    match precision {
        FloatPrecision::Float => round_trips_through_f32(value),
        FloatPrecision::Double | FloatPrecision::LongDouble => true,
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::float_cmp,
    reason = "an exact round-trip is what is being tested"
)]
fn round_trips_through_f32(value: f64) -> bool {
    let narrowed = value as f32;
    narrowed.is_finite() && f64::from(narrowed) == value
}
