//! Lenient parsing of numeric form input.
//!
//! Both helpers accept surrounding whitespace and a decimal comma. Anything
//! that is not a finite, non-negative number yields zero, which every caller
//! treats as "not recorded".

#[must_use]
pub fn parse_non_negative_int(value: &str) -> u32 {
    let normalized = normalize(value);
    if let Ok(parsed) = normalized.parse::<u32>() {
        return parsed;
    }
    // Inputs like "12.0" or "12,7" come from number fields and keep their integer part.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    match normalized.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed >= 0. && parsed <= f64::from(u32::MAX) => {
            parsed.trunc() as u32
        }
        _ => 0,
    }
}

#[must_use]
pub fn parse_non_negative_float(value: &str) -> f32 {
    match normalize(value).parse::<f32>() {
        Ok(parsed) if parsed.is_finite() && parsed >= 0. => parsed,
        _ => 0.,
    }
}

fn normalize(value: &str) -> String {
    value.replace(',', ".").trim().to_string()
}
