//! Kubernetes resource quantities
//!
//! Quantities are kept exactly at nano-unit precision together with the
//! format they were written in, so they can be compared numerically and
//! rendered back in canonical form (`500m`, `2`, `128Mi`, `1e3`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const NANOS_PER_UNIT: i128 = 1_000_000_000;
const NANOS_PER_MILLI: i128 = 1_000_000;

/// Largest power of ten representable in a u128
const MAX_POW10: i64 = 38;

/// Canonical rendering may scale the mantissa by up to 100
const MAX_NANOS: u128 = (i128::MAX / 100) as u128;

const BINARY_SUFFIXES: [&str; 7] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

/// Errors produced while parsing a quantity string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity is empty")]
    Empty,

    #[error("invalid number in quantity '{0}'")]
    InvalidNumber(String),

    #[error("unknown suffix '{suffix}' in quantity '{input}'")]
    InvalidSuffix { input: String, suffix: String },

    #[error("quantity '{0}' is out of range")]
    OutOfRange(String),
}

/// Notation a quantity was written in, used when rendering it back
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum QuantityFormat {
    /// Decimal SI suffixes: n, u, m, k, M, G, T, P, E
    #[default]
    DecimalSI,
    /// Binary suffixes: Ki, Mi, Gi, Ti, Pi, Ei
    BinarySI,
    /// Scientific notation: 1e3, 5E-3
    DecimalExponent,
}

/// A resource amount such as a CPU or memory limit
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceQuantity {
    nanos: i128,
    format: QuantityFormat,
}

impl ResourceQuantity {
    /// The zero quantity, used when a limit or request is not set
    pub const fn zero() -> Self {
        Self {
            nanos: 0,
            format: QuantityFormat::DecimalSI,
        }
    }

    /// Build a decimal quantity from a milli-unit count
    pub fn from_milli(millis: i64) -> Self {
        Self {
            nanos: i128::from(millis) * NANOS_PER_MILLI,
            format: QuantityFormat::DecimalSI,
        }
    }

    #[cfg(test)]
    pub fn format(&self) -> QuantityFormat {
        self.format
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    /// Value in milli-units, rounded up
    pub fn milli_value(&self) -> i128 {
        div_round_up(self.nanos, NANOS_PER_MILLI)
    }

    /// Value in whole units, rounded up
    #[cfg(test)]
    pub fn value(&self) -> i128 {
        div_round_up(self.nanos, NANOS_PER_UNIT)
    }

    /// Mantissa and power-of-ten exponent, exponent a multiple of 3
    fn decimal_parts(&self) -> (i128, i32) {
        let mut mantissa = self.nanos;
        let mut exponent: i32 = -9;
        while mantissa != 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            exponent += 1;
        }
        while exponent.rem_euclid(3) != 0 {
            mantissa *= 10;
            exponent -= 1;
        }
        (mantissa, exponent)
    }

    /// Whole units and power of 1024, if the value has an exact binary form
    fn binary_parts(&self) -> Option<(i128, usize)> {
        if self.nanos % NANOS_PER_UNIT != 0 {
            return None;
        }
        let mut units = self.nanos / NANOS_PER_UNIT;
        if units.abs() < 1024 {
            return None;
        }
        let mut power = 0;
        while power < BINARY_SUFFIXES.len() - 1 && units % 1024 == 0 {
            units /= 1024;
            power += 1;
        }
        Some((units, power))
    }

    fn fmt_decimal(&self, f: &mut fmt::Formatter<'_>, format: QuantityFormat) -> fmt::Result {
        let (mantissa, exponent) = self.decimal_parts();
        if format == QuantityFormat::DecimalExponent {
            return match exponent {
                0 => write!(f, "{}", mantissa),
                _ => write!(f, "{}e{}", mantissa, exponent),
            };
        }
        match decimal_suffix(exponent) {
            Some(suffix) => write!(f, "{}{}", mantissa, suffix),
            None => write!(f, "{}e{}", mantissa, exponent),
        }
    }
}

/// Divide, rounding any remainder away from zero
fn div_round_up(value: i128, divisor: i128) -> i128 {
    let quotient = value / divisor;
    match value % divisor {
        0 => quotient,
        _ if value > 0 => quotient + 1,
        _ => quotient - 1,
    }
}

fn decimal_suffix(exponent: i32) -> Option<&'static str> {
    let suffix = match exponent {
        -9 => "n",
        -6 => "u",
        -3 => "m",
        0 => "",
        3 => "k",
        6 => "M",
        9 => "G",
        12 => "T",
        15 => "P",
        18 => "E",
        _ => return None,
    };
    Some(suffix)
}

/// Parse a suffix into (format, power of 1024, power of ten)
fn parse_suffix(suffix: &str) -> Option<(QuantityFormat, u32, i64)> {
    let decimal = |exp: i64| Some((QuantityFormat::DecimalSI, 0, exp));
    let binary = |pow: u32| Some((QuantityFormat::BinarySI, pow, 0));
    match suffix {
        "n" => decimal(-9),
        "u" => decimal(-6),
        "m" => decimal(-3),
        "" => decimal(0),
        "k" => decimal(3),
        "M" => decimal(6),
        "G" => decimal(9),
        "T" => decimal(12),
        "P" => decimal(15),
        "E" => decimal(18),
        "Ki" => binary(1),
        "Mi" => binary(2),
        "Gi" => binary(3),
        "Ti" => binary(4),
        "Pi" => binary(5),
        "Ei" => binary(6),
        _ => {
            let exponent = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            let exponent = exponent.parse::<i32>().ok()?;
            Some((QuantityFormat::DecimalExponent, 0, i64::from(exponent)))
        }
    }
}

impl FromStr for ResourceQuantity {
    type Err = QuantityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(QuantityError::Empty);
        }
        let out_of_range = || QuantityError::OutOfRange(input.to_string());

        let (negative, unsigned) = if let Some(rest) = input.strip_prefix('-') {
            (true, rest)
        } else {
            (false, input.strip_prefix('+').unwrap_or(input))
        };

        let number_len = unsigned
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(unsigned.len());
        let (number, suffix) = unsigned.split_at(number_len);
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(QuantityError::InvalidNumber(input.to_string()));
        }

        let (format, binary_power, decimal_power) =
            parse_suffix(suffix).ok_or_else(|| QuantityError::InvalidSuffix {
                input: input.to_string(),
                suffix: suffix.to_string(),
            })?;

        let mut digits: u128 = 0;
        for c in whole.chars().chain(fraction.chars()).skip_while(|c| *c == '0') {
            let digit = u128::from(c as u8 - b'0');
            digits = digits
                .checked_mul(10)
                .and_then(|d| d.checked_add(digit))
                .ok_or_else(out_of_range)?;
        }

        let scaled = digits
            .checked_mul(1024u128.pow(binary_power))
            .ok_or_else(out_of_range)?;

        // Shift from the written precision to nano units
        let shift = decimal_power + 9 - fraction.len() as i64;
        let magnitude = if scaled == 0 {
            0
        } else if shift >= 0 {
            if shift > MAX_POW10 {
                return Err(out_of_range());
            }
            scaled
                .checked_mul(10u128.pow(shift as u32))
                .ok_or_else(out_of_range)?
        } else if -shift > MAX_POW10 {
            1
        } else {
            let divisor = 10u128.pow((-shift) as u32);
            scaled / divisor + u128::from(scaled % divisor != 0)
        };

        if magnitude > MAX_NANOS {
            return Err(out_of_range());
        }
        let nanos = magnitude as i128;

        Ok(Self {
            nanos: if negative { -nanos } else { nanos },
            format,
        })
    }
}

impl fmt::Display for ResourceQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nanos == 0 {
            return f.write_str("0");
        }
        match self.format {
            QuantityFormat::BinarySI => match self.binary_parts() {
                Some((units, power)) => write!(f, "{}{}", units, BINARY_SUFFIXES[power]),
                None => self.fmt_decimal(f, QuantityFormat::DecimalSI),
            },
            format => self.fmt_decimal(f, format),
        }
    }
}

impl PartialEq for ResourceQuantity {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for ResourceQuantity {}

impl PartialOrd for ResourceQuantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResourceQuantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nanos.cmp(&other.nanos)
    }
}
