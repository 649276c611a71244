//! Integer literal base conversion.

/// Base an integer literal is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    /// `0x…`
    Hexadecimal,
    /// `0…`
    Octal,
    /// Anything else.
    Decimal,
}

impl Radix {
    /// Description of a conversion to this base.
    pub fn description(self) -> &'static str {
        match self {
            Radix::Hexadecimal => "Convert to Hexadecimal",
            Radix::Octal => "Convert to Octal",
            Radix::Decimal => "Convert to Decimal",
        }
    }
}

/// One offered conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Target base.
    pub radix: Radix,
    /// Replacement for the significant digits.
    pub replacement: String,
}

/// A decoded integer literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerLiteral {
    /// Characters before the type suffix (`u`, `l`, …).
    pub digits: String,
    /// Number of characters in `digits`.
    pub digits_len: usize,
    /// Base the literal is written in.
    pub radix: Radix,
    /// Decoded value.
    pub value: u64,
}

impl IntegerLiteral {
    /// Decode an integer literal spelling. Floating-point spellings, invalid digits and values
    /// that do not fit in 64 bits decode to `None`.
    pub fn parse(spelling: &str) -> Option<Self> {
        let lower = spelling.to_ascii_lowercase();
        let is_hex = lower.starts_with("0x");
        if lower.contains('.') || (!is_hex && lower.contains('e')) || (is_hex && lower.contains('p')) {
            return None;
        }

        let digits = spelling.trim_end_matches(|c: char| !c.is_ascii_hexdigit());
        if digits.is_empty() {
            return None;
        }
        let (radix, body, base) = if let Some(hex) = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            (Radix::Hexadecimal, hex, 16)
        } else if digits.len() > 1 && digits.starts_with('0') {
            (Radix::Octal, &digits[1..], 8)
        } else {
            (Radix::Decimal, digits, 10)
        };
        let value = u64::from_str_radix(body, base).ok()?;
        Some(Self {
            digits: digits.to_string(),
            digits_len: digits.chars().count(),
            radix,
            value,
        })
    }

    /// Conversions offered for this literal, in hex, octal, decimal order.
    ///
    /// Hex is offered unless the literal already is hex. Octal needs a non-zero value and a
    /// literal not already written in octal. Decimal needs a non-zero value or a hex literal, and
    /// a literal that is not already a multi-digit decimal. A conversion that would reproduce the
    /// literal is dropped.
    pub fn conversions(&self) -> Vec<Conversion> {
        let mut out = Vec::new();
        if self.radix != Radix::Hexadecimal {
            out.push(Conversion {
                radix: Radix::Hexadecimal,
                replacement: format!("0x{:X}", self.value),
            });
        }
        if self.value != 0 && self.radix != Radix::Octal {
            out.push(Conversion {
                radix: Radix::Octal,
                replacement: format!("0{:o}", self.value),
            });
        }
        let multi_digit_decimal = self.radix == Radix::Decimal && self.digits_len > 1;
        if (self.value != 0 || self.radix == Radix::Hexadecimal) && !multi_digit_decimal {
            out.push(Conversion {
                radix: Radix::Decimal,
                replacement: self.value.to_string(),
            });
        }
        out.retain(|c| c.replacement != self.digits);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offered(spelling: &str) -> Vec<String> {
        IntegerLiteral::parse(spelling)
            .map(|lit| lit.conversions().into_iter().map(|c| c.replacement).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_decimal_literal() {
        assert_eq!(offered("32"), vec!["0x20", "040"]);
    }

    #[test]
    fn test_hex_literal() {
        assert_eq!(offered("0x20"), vec!["040", "32"]);
        assert_eq!(offered("0X1f"), vec!["037", "31"]);
    }

    #[test]
    fn test_octal_literal() {
        assert_eq!(offered("040"), vec!["0x20", "32"]);
    }

    #[test]
    fn test_zero_only_converts_to_hex() {
        assert_eq!(offered("0"), vec!["0x0"]);
        assert_eq!(offered("0x0"), vec!["0"]);
    }

    #[test]
    fn test_single_digit_never_reproduces_itself() {
        assert_eq!(offered("7"), vec!["0x7", "07"]);
    }

    #[test]
    fn test_suffixes_are_kept_out_of_the_digits() {
        let lit = IntegerLiteral::parse("10UL").unwrap();
        assert_eq!(lit.digits, "10");
        assert_eq!(lit.digits_len, 2);
        assert_eq!(offered("10u"), vec!["0xA", "012"]);
        // `f` is a hex digit, so hex literals keep it.
        assert_eq!(IntegerLiteral::parse("0xFu").unwrap().value, 15);
    }

    #[test]
    fn test_rejected_literals() {
        assert_eq!(IntegerLiteral::parse("0783"), None);
        assert_eq!(IntegerLiteral::parse("1.5"), None);
        assert_eq!(IntegerLiteral::parse("1e5"), None);
        assert_eq!(IntegerLiteral::parse("99999999999999999999"), None);
    }

    #[test]
    fn test_conversions_preserve_value() {
        for spelling in ["1", "8", "255", "0x7fff", "0777", "123456789"] {
            let lit = IntegerLiteral::parse(spelling).unwrap();
            for conversion in lit.conversions() {
                assert_ne!(conversion.replacement, lit.digits);
                let back = IntegerLiteral::parse(&conversion.replacement).unwrap();
                assert_eq!(back.value, lit.value, "{spelling} -> {}", conversion.replacement);
            }
        }
    }
}
