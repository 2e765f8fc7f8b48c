use super::CanonicalError;

/// Format a finite float the way ECMAScript's `Number.prototype.toString`
/// does, so hashes agree with routers that canonicalize in JavaScript.
///
/// - shortest digits that round-trip
/// - integral values carry no fraction
/// - exponent notation when the decimal exponent is `>= 21` or `<= -7`
/// - negative zero prints as `0`
pub(super) fn format_f64(value: f64) -> Result<String, CanonicalError> {
    if !value.is_finite() {
        return Err(CanonicalError::non_canonical(format!("non-finite number {value}")));
    }
    if value == 0.0 {
        return Ok("0".to_owned());
    }

    let sign = if value.is_sign_negative() { "-" } else { "" };

    // `{:e}` yields the shortest round-trip digits, e.g. `1.2345e-7`.
    let sci = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return Err(CanonicalError::non_canonical(format!("unformattable number {value}")));
    };
    let exponent: i32 = exponent
        .parse()
        .map_err(|_| CanonicalError::non_canonical(format!("unformattable number {value}")))?;

    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat(n.unsigned_abs() as usize))
    } else {
        let e = n - 1;
        let e_sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{e_sign}{}", e.unsigned_abs())
        } else {
            format!("{first}.{rest}e{e_sign}{}", e.unsigned_abs())
        }
    };

    Ok(format!("{sign}{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_ecmascript_number_to_string() {
        let cases: &[(f64, &str)] = &[
            (0.2, "0.2"),
            (1.0, "1"),
            (-1.0, "-1"),
            (-0.0, "0"),
            (100.0, "100"),
            (1234.5, "1234.5"),
            (0.1 + 0.2, "0.30000000000000004"),
            (0.000001, "0.000001"),
            (0.0000001, "1e-7"),
            (1.5e-7, "1.5e-7"),
            (123456789012345680000.0, "123456789012345680000"),
            (1e21, "1e+21"),
            (1.25e22, "1.25e+22"),
            (-2.5e-10, "-2.5e-10"),
            (1730000000000.0, "1730000000000"),
            (f64::MAX, "1.7976931348623157e+308"),
            (f64::MIN_POSITIVE, "2.2250738585072014e-308"),
        ];

        for (value, expected) in cases {
            assert_eq!(format_f64(*value).unwrap(), *expected, "formatting {value:?}");
        }
    }

    #[test]
    fn rejects_non_finite() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(format_f64(value).unwrap_err().is_non_canonical());
        }
    }
}
