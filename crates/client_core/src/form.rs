use shared::{
    domain::{FieldKey, NormalizedVector, FIELD_COUNT},
    error::{UnknownField, ValidationError},
};

/// Raw text for each of the 13 inputs, exactly as typed. Every field starts empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormModel {
    values: [String; FIELD_COUNT],
}

impl FormModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// No validation happens here; it is deferred to submission.
    pub fn set_field(&mut self, key: FieldKey, raw: impl Into<String>) {
        self.values[key as usize] = raw.into();
    }

    pub fn set_field_by_name(
        &mut self,
        name: &str,
        raw: impl Into<String>,
    ) -> Result<(), UnknownField> {
        let key: FieldKey = name.parse()?;
        self.set_field(key, raw);
        Ok(())
    }

    pub fn raw_value(&self, key: FieldKey) -> &str {
        &self.values[key as usize]
    }

    /// Fields in declaration order with their raw text.
    pub fn fields(&self) -> impl Iterator<Item = (FieldKey, &str)> + '_ {
        FieldKey::ALL.into_iter().map(|key| (key, self.raw_value(key)))
    }

    /// Categorical inputs are only required to be numeric here; an out-of-domain code such as
    /// `sex = "7"` is forwarded to the scorer unchanged.
    pub fn validate_and_normalize(&self) -> Result<NormalizedVector, ValidationError> {
        let mut values = [0.0; FIELD_COUNT];
        for (slot, key) in values.iter_mut().zip(FieldKey::CANONICAL_ORDER) {
            let raw = self.raw_value(key);
            *slot = parse_number(raw).ok_or_else(|| ValidationError::NonNumeric {
                field: key,
                raw: raw.to_string(),
            })?;
        }
        Ok(NormalizedVector::new(values))
    }
}

/// Lenient numeric parsing in the style of a browser number input: surrounding whitespace is
/// ignored, decimal and exponent forms are accepted, as are unsigned `0x`/`0o`/`0b` integers.
/// Blank text and non-finite results are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value = match radix_literal(trimmed) {
        Some((digits, radix)) => radix_value(digits, radix)?,
        None => trimmed.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

fn radix_literal(text: &str) -> Option<(&str, u32)> {
    let (prefix, digits) = text.split_at_checked(2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((digits, radix))
}

/// Unsigned digits in `radix`, accumulated as a float so literals wider than 64 bits still parse.
fn radix_value(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, ch| {
        ch.to_digit(radix)
            .map(|digit| acc * f64::from(radix) + f64::from(digit))
    })
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
