//! Literal classification.
//!
//! Turns a raw literal spelling into its type and value. Integer literals
//! select their type from a candidate list picked by suffix and base;
//! character literals decode escapes; floating literals pick a precision from
//! their suffix.

use cdecl_ir::{
    ConstValue, FloatPrecision, IntBase, IntWidth, Literal, LiteralKind, Signedness, Type,
};

use crate::config::TargetWidths;
use crate::error::{LiteralError, LiteralErrorKind};

/// The result of classifying a literal.
#[derive(Clone, PartialEq, Debug)]
pub struct Classified {
    pub ty: Type,
    pub value: ConstValue,
    /// Multi-character literal; valid but discouraged.
    pub multi_char: bool,
}

/// Integer suffix, with letter case already normalized.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SuffixClass {
    None,
    Unsigned,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
}

impl SuffixClass {
    /// Parse an integer suffix. `u` may come first or last; `ll` must not
    /// mix case.
    pub fn parse(suffix: &str) -> Option<SuffixClass> {
        let (unsigned, rest) = match suffix
            .strip_prefix(['u', 'U'])
            .or_else(|| suffix.strip_suffix(['u', 'U']))
        {
            Some(rest) => (true, rest),
            None => (false, suffix),
        };
        let class = match (unsigned, rest) {
            (false, "") => SuffixClass::None,
            (true, "") => SuffixClass::Unsigned,
            (false, "l" | "L") => SuffixClass::Long,
            (true, "l" | "L") => SuffixClass::UnsignedLong,
            (false, "ll" | "LL") => SuffixClass::LongLong,
            (true, "ll" | "LL") => SuffixClass::UnsignedLongLong,
            _ => return None,
        };
        Some(class)
    }
}

/// Decimal literals never become unsigned without a `u` suffix.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BaseClass {
    Decimal,
    Prefixed,
}

impl From<IntBase> for BaseClass {
    fn from(base: IntBase) -> Self {
        match base {
            IntBase::Decimal => BaseClass::Decimal,
            IntBase::Octal | IntBase::Hex | IntBase::Binary => BaseClass::Prefixed,
        }
    }
}

/// Candidate types for an integer literal, in the order they are tried.
pub fn candidates(suffix: SuffixClass, base: BaseClass) -> &'static [(IntWidth, Signedness)] {
    use IntWidth::{Int, Long, LongLong};
    use Signedness::{Signed, Unsigned};

    match (suffix, base) {
        (SuffixClass::None, BaseClass::Decimal) => {
            &[(Int, Signed), (Long, Signed), (LongLong, Signed)]
        }
        (SuffixClass::None, BaseClass::Prefixed) => &[
            (Int, Signed),
            (Int, Unsigned),
            (Long, Signed),
            (Long, Unsigned),
            (LongLong, Signed),
            (LongLong, Unsigned),
        ],
        (SuffixClass::Unsigned, _) => &[(Int, Unsigned), (Long, Unsigned), (LongLong, Unsigned)],
        (SuffixClass::Long, BaseClass::Decimal) => &[(Long, Signed), (LongLong, Signed)],
        (SuffixClass::Long, BaseClass::Prefixed) => &[
            (Long, Signed),
            (Long, Unsigned),
            (LongLong, Signed),
            (LongLong, Unsigned),
        ],
        (SuffixClass::UnsignedLong, _) => &[(Long, Unsigned), (LongLong, Unsigned)],
        (SuffixClass::LongLong, BaseClass::Decimal) => &[(LongLong, Signed)],
        (SuffixClass::LongLong, BaseClass::Prefixed) => &[(LongLong, Signed), (LongLong, Unsigned)],
        (SuffixClass::UnsignedLongLong, _) => &[(LongLong, Unsigned)],
    }
}

/// Encoding prefix of a character literal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
enum Encoding {
    Narrow,
    Utf8,
    Utf16,
    Utf32,
    Wide,
}

impl Encoding {
    fn split(text: &str) -> (Encoding, &str) {
        if let Some(rest) = text.strip_prefix("u8") {
            (Encoding::Utf8, rest)
        } else if let Some(rest) = text.strip_prefix('u') {
            (Encoding::Utf16, rest)
        } else if let Some(rest) = text.strip_prefix('U') {
            (Encoding::Utf32, rest)
        } else if let Some(rest) = text.strip_prefix('L') {
            (Encoding::Wide, rest)
        } else {
            (Encoding::Narrow, text)
        }
    }

    /// Largest value a single code unit of this encoding can hold.
    fn max_unit(self) -> u32 {
        match self {
            Encoding::Narrow | Encoding::Utf8 => 0xFF,
            Encoding::Utf16 => 0xFFFF,
            Encoding::Utf32 | Encoding::Wide => u32::MAX,
        }
    }

    fn is_byte_oriented(self) -> bool {
        matches!(self, Encoding::Narrow | Encoding::Utf8)
    }
}

/// One decoded element of a character literal body.
#[derive(Copy, Clone, Debug)]
enum Unit {
    /// A source character or universal character name.
    Char(u32),
    /// An octal or hex escape: a raw code unit value.
    Raw(u32),
}

/// Classifies literals against a fixed set of target widths.
#[derive(Copy, Clone, Debug, Default)]
pub struct LiteralClassifier {
    widths: TargetWidths,
}

impl LiteralClassifier {
    pub fn new(widths: TargetWidths) -> Self {
        LiteralClassifier { widths }
    }

    pub fn classify(&self, lit: &Literal) -> Result<Classified, LiteralError> {
        if lit.body().is_none() {
            return Err(LiteralError::new(
                lit.span,
                LiteralErrorKind::InvalidSuffix {
                    suffix: lit.suffix.clone(),
                },
            ));
        }
        match lit.kind {
            LiteralKind::Integer => self.classify_integer(lit),
            LiteralKind::Character => self.classify_character(lit),
            LiteralKind::Floating => classify_floating(lit),
        }
    }

    fn classify_integer(&self, lit: &Literal) -> Result<Classified, LiteralError> {
        let base = lit.base.unwrap_or_else(|| IntBase::detect(&lit.text));
        let suffix = SuffixClass::parse(&lit.suffix).ok_or_else(|| {
            LiteralError::new(
                lit.span,
                LiteralErrorKind::InvalidSuffix {
                    suffix: lit.suffix.clone(),
                },
            )
        })?;
        let Some(value) = integer_value(lit, base)? else {
            return Err(LiteralError::overflow(lit.span, &lit.text));
        };

        candidates(suffix, base.into())
            .iter()
            .find(|&&(width, signedness)| self.widths.fits(width, signedness, value))
            .map(|&(width, signedness)| Classified {
                ty: Type::integer(width, signedness),
                value: ConstValue::Int(value),
                multi_char: false,
            })
            .ok_or_else(|| LiteralError::overflow(lit.span, &lit.text))
    }

    fn classify_character(&self, lit: &Literal) -> Result<Classified, LiteralError> {
        let err = |kind| LiteralError::new(lit.span, kind);
        let (encoding, rest) = Encoding::split(&lit.text);
        let body = rest
            .strip_prefix('\'')
            .and_then(|r| r.strip_suffix('\''))
            .ok_or_else(|| err(LiteralErrorKind::UnterminatedChar))?;

        let units = decode_units(body).map_err(err)?;
        let mut values: Vec<u32> = Vec::with_capacity(units.len());
        for unit in units {
            match unit {
                Unit::Raw(value) if value > encoding.max_unit() => {
                    return Err(err(LiteralErrorKind::EscapeOutOfRange { value }));
                }
                Unit::Raw(value) => values.push(value),
                Unit::Char(cp) if encoding.is_byte_oriented() && cp > 0x7F => {
                    let ch = char::from_u32(cp)
                        .ok_or_else(|| err(LiteralErrorKind::InvalidCodePoint { value: cp }))?;
                    let mut buf = [0u8; 4];
                    values.extend(ch.encode_utf8(&mut buf).bytes().map(u32::from));
                }
                Unit::Char(cp) => values.push(cp),
            }
        }

        match values.as_slice() {
            [] => Err(err(LiteralErrorKind::EmptyCharLiteral)),
            [value] => Ok(Classified {
                ty: Type::char(),
                value: ConstValue::Int(self.char_value(encoding, *value)),
                multi_char: false,
            }),
            _ if encoding != Encoding::Narrow => Err(err(LiteralErrorKind::PrefixedMultiChar)),
            _ => {
                // Packed big-endian; only the last four units survive in 32 bits.
                let packed = values
                    .iter()
                    .fold(0u32, |acc, &v| (acc << 8) | (v & 0xFF));
                Ok(Classified {
                    ty: Type::int(),
                    value: ConstValue::Int(i128::from(i32::from_be_bytes(packed.to_be_bytes()))),
                    multi_char: true,
                })
            }
        }
    }

    /// Narrow literals above 0x7F wrap when plain `char` is signed.
    fn char_value(&self, encoding: Encoding, unit: u32) -> i128 {
        let value = i128::from(unit);
        if encoding.is_byte_oriented() && self.widths.char_is_signed {
            let bound = 1i128 << (self.widths.char_bits - 1);
            if value >= bound {
                return value - (bound << 1);
            }
        }
        value
    }
}

/// Parse the digits of an integer literal. `Ok(None)` means the value does
/// not fit the accumulator at all.
fn integer_value(lit: &Literal, base: IntBase) -> Result<Option<i128>, LiteralError> {
    let digits = lit.digits();
    if digits.is_empty() {
        return Err(LiteralError::new(
            lit.span,
            LiteralErrorKind::MissingDigits { base },
        ));
    }
    check_separators(digits, |c| c.is_ascii_alphanumeric())
        .map_err(|kind| LiteralError::new(lit.span, kind))?;

    let radix = base.radix();
    let mut value: Option<i128> = Some(0);
    for (i, c) in digits.char_indices() {
        if c == '\'' {
            continue;
        }
        let Some(digit) = c.to_digit(radix) else {
            let tail = &digits[i..];
            let kind = if tail.chars().all(|c| c.is_ascii_alphabetic()) {
                LiteralErrorKind::InvalidSuffix {
                    suffix: format!("{tail}{}", lit.suffix),
                }
            } else {
                LiteralErrorKind::InvalidDigit { digit: c, base }
            };
            return Err(LiteralError::new(lit.span, kind));
        };
        value = value
            .and_then(|v| v.checked_mul(i128::from(radix)))
            .and_then(|v| v.checked_add(i128::from(digit)));
    }
    Ok(value)
}

/// A digit separator must sit between two digits.
fn check_separators(text: &str, is_digit: impl Fn(char) -> bool) -> Result<(), LiteralErrorKind> {
    let chars: Vec<char> = text.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c != '\'' {
            continue;
        }
        let before = i.checked_sub(1).and_then(|j| chars.get(j));
        let after = chars.get(i + 1);
        let between_digits = matches!((before, after), (Some(&b), Some(&a)) if is_digit(b) && is_digit(a));
        if !between_digits {
            return Err(LiteralErrorKind::MisplacedSeparator);
        }
    }
    Ok(())
}

/// Decode the body of a character literal into units.
fn decode_units(body: &str) -> Result<Vec<Unit>, LiteralErrorKind> {
    let mut units = Vec::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            if c == '\'' || c == '\n' {
                return Err(LiteralErrorKind::UnterminatedChar);
            }
            units.push(Unit::Char(u32::from(c)));
            continue;
        }

        let Some(escape) = chars.next() else {
            return Err(LiteralErrorKind::UnterminatedChar);
        };
        let unit = match escape {
            '\'' | '"' | '?' | '\\' => Unit::Char(u32::from(escape)),
            'a' => Unit::Char(0x07),
            'b' => Unit::Char(0x08),
            'f' => Unit::Char(0x0C),
            'n' => Unit::Char(0x0A),
            'r' => Unit::Char(0x0D),
            't' => Unit::Char(0x09),
            'v' => Unit::Char(0x0B),
            '0'..='7' => {
                let mut value = escape.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                Unit::Raw(value)
            }
            'x' => {
                let mut value: Option<u32> = Some(0);
                let mut count = 0usize;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(16)) {
                    value = value
                        .and_then(|v| v.checked_mul(16))
                        .and_then(|v| v.checked_add(d));
                    count += 1;
                    chars.next();
                }
                if count == 0 {
                    return Err(LiteralErrorKind::EscapeDigitCount {
                        escape,
                        expected: 1,
                        found: 0,
                    });
                }
                Unit::Raw(value.ok_or(LiteralErrorKind::EscapeOutOfRange { value: u32::MAX })?)
            }
            'u' | 'U' => {
                let expected = if escape == 'u' { 4 } else { 8 };
                let mut value: u64 = 0;
                let mut found = 0usize;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(16)) {
                    value = (value << 4) | u64::from(d);
                    found += 1;
                    chars.next();
                    if found > expected {
                        break;
                    }
                }
                if found != expected {
                    return Err(LiteralErrorKind::EscapeDigitCount {
                        escape,
                        expected,
                        found,
                    });
                }
                let value = u32::try_from(value)
                    .map_err(|_| LiteralErrorKind::InvalidCodePoint { value: u32::MAX })?;
                if char::from_u32(value).is_none() {
                    return Err(LiteralErrorKind::InvalidCodePoint { value });
                }
                Unit::Char(value)
            }
            other => return Err(LiteralErrorKind::UnknownEscape { escape: other }),
        };
        units.push(unit);
    }
    Ok(units)
}

fn classify_floating(lit: &Literal) -> Result<Classified, LiteralError> {
    let err = |kind| LiteralError::new(lit.span, kind);
    let text = lit.text.as_str();
    if text.starts_with("0x") || text.starts_with("0X") {
        return Err(err(LiteralErrorKind::HexFloat));
    }

    let precision = match lit.suffix.as_str() {
        "" => FloatPrecision::Double,
        "f" | "F" => FloatPrecision::Float,
        "l" | "L" => FloatPrecision::LongDouble,
        other => {
            return Err(err(LiteralErrorKind::InvalidSuffix {
                suffix: other.to_owned(),
            }))
        }
    };

    let body = lit
        .body()
        .ok_or_else(|| err(LiteralErrorKind::MalformedFloat))?;
    check_separators(body, |c| c.is_ascii_digit()).map_err(err)?;
    let cleaned: String = body.chars().filter(|&c| c != '\'').collect();
    if !is_float_spelling(&cleaned) {
        return Err(err(LiteralErrorKind::MalformedFloat));
    }
    let value: f64 = cleaned
        .parse()
        .map_err(|_| err(LiteralErrorKind::MalformedFloat))?;

    let value = match precision {
        FloatPrecision::Float => round_to_float(value),
        FloatPrecision::Double | FloatPrecision::LongDouble => value,
    };
    if !value.is_finite() {
        return Err(LiteralError::overflow(lit.span, text));
    }

    Ok(Classified {
        ty: Type::Float(precision),
        value: ConstValue::Float(value),
        multi_char: false,
    })
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "a float literal's value is its value rounded to float"
)]
fn round_to_float(value: f64) -> f64 {
    f64::from(value as f32)
}

/// `digits [. digits] [e [+-] digits]`, with at least one mantissa digit and
/// either a point or an exponent.
fn is_float_spelling(text: &str) -> bool {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(i) => (&text[..i], Some(&text[i + 1..])),
        None => (text, None),
    };

    let mut parts = mantissa.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next();
    let digits_ok = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !digits_ok(whole) || !fraction.is_none_or(digits_ok) {
        return false;
    }
    if whole.is_empty() && fraction.is_none_or(str::is_empty) {
        return false;
    }

    match exponent {
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && digits_ok(digits)
        }
        None => fraction.is_some(),
    }
}
