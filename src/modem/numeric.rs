//! Positional decoder for the short numeric fields embedded in modem
//! notification text (HTTP status digits, declared receive lengths, hex
//! content lengths).
//!
//! Caller-bounded contract: inputs are short runs of valid digits — at most
//! three digits for a status code, a handful for a length field. There is no
//! sign handling and no overflow checking; the framing layer validates and
//! caps field lengths before calling in.

/// Decode a digit run in `base` (10 or 16, hex digits lowercase `a`–`f`)
/// into its positional value, Σ digit(i) · base^(len−1−i). An empty field
/// decodes to 0.
pub fn parse_digits(field: &[u8], base: u32) -> u32 {
    let mut value = 0u32;
    for &d in field {
        let digit = if d > b'9' {
            u32::from(d) - u32::from(b'a') + 10
        } else {
            u32::from(d) - u32::from(b'0')
        };
        value = value * base + digit;
    }
    value
}

/// True when every byte is a decimal digit. Vacuously true for empty fields.
pub fn all_decimal(field: &[u8]) -> bool {
    field.iter().all(u8::is_ascii_digit)
}

/// True when every byte is a lowercase hex digit.
pub fn all_lower_hex(field: &[u8]) -> bool {
    field
        .iter()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(b))
}
