//! Render values as descriptor text.
//!
//! Free-format lines use [`format_integer`] and [`format_real`], which give
//! the shortest text that reads back to the same value. Table cells go
//! through [`render_column`], which applies the column's formatter and pads
//! the result to the column width.
use error_stack::Report;
use ryu_floating_decimal::d2d;

use crate::error::{DResult, DescriptorError};
use crate::format_specs::ColumnSpec;
use crate::value::Value;

/// Decimal text of an integer
pub fn format_integer(v: i64) -> String {
    let mut b = itoa::Buffer::new();
    b.format(v).to_string()
}

/// Shortest text that reads back to `v`.
///
/// Numbers whose decimal point position lies between -4 and 16 are written
/// without an exponent and always carry a fractional part (`5000.0`,
/// `0.25`). Others use a lower case exponent with a sign and at least two
/// digits (`1e-05`, `1.5e+16`).
pub fn format_real(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }

    let sign = if v.is_sign_negative() { "-" } else { "" };
    if v == 0.0 {
        return format!("{sign}0.0");
    }

    let decimal = d2d(v.abs());
    let mut mantissa = decimal.mantissa;
    let mut exponent = decimal.exponent;
    while mantissa % 10 == 0 {
        mantissa /= 10;
        exponent += 1;
    }

    let mut b = itoa::Buffer::new();
    let digits = b.format(mantissa);
    let ndigits = digits.len() as i32;
    let decpt = ndigits + exponent;

    let body = if decpt > -4 && decpt <= 16 {
        if decpt <= 0 {
            format!("0.{}{digits}", "0".repeat((-decpt) as usize))
        } else if decpt >= ndigits {
            format!("{digits}{}.0", "0".repeat((decpt - ndigits) as usize))
        } else {
            let (int_part, frac_part) = digits.split_at(decpt as usize);
            format!("{int_part}.{frac_part}")
        }
    } else {
        let (lead, rest) = digits.split_at(1);
        let exp = decpt - 1;
        if rest.is_empty() {
            format!("{lead}e{}", format_exponent(exp))
        } else {
            format!("{lead}.{rest}e{}", format_exponent(exp))
        }
    };

    format!("{sign}{body}")
}

/// Fixed notation with `precision` decimals, e.g. `format_real_fixed(0.8, 2) == "0.80"`
pub fn format_real_fixed(v: f64, precision: u32) -> String {
    format!("{v:.*}", precision as usize)
}

/// Scientific notation with `precision` decimals and an upper case exponent of
/// at least two digits, e.g. `format_real_exp(5000.0, 4) == "5.0000E+03"`.
pub fn format_real_exp(v: f64, precision: u32) -> String {
    let s = format!("{v:.*E}", precision as usize);
    match s.split_once('E') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => format!("{mantissa}E{}", format_exponent(exp)),
            Err(_) => s,
        },
        // NaN and infinities have no exponent
        None => s,
    }
}

fn format_exponent(exp: i32) -> String {
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{sign}{:02}", exp.abs())
}

/// Render one table cell.
///
/// `None` gives a blank cell of the column width. Character columns are left
/// aligned and numeric columns right aligned. A rendered value wider than the
/// column, or a value whose kind the column cannot hold, is an error.
pub fn render_column(spec: &ColumnSpec, value: Option<&Value>) -> DResult<String> {
    let width = spec.width() as usize;
    let value = match value {
        Some(v) => v,
        None => return Ok(" ".repeat(width)),
    };

    let (text, left_align) = match (spec, value) {
        (ColumnSpec::Char { width: _ }, Value::Str(s)) => (s.clone(), true),
        (ColumnSpec::Integer { width: _ }, Value::Int(i)) => (format_integer(*i), false),
        (ColumnSpec::Fixed { width: _, precision }, Value::Float(f)) => (format_real_fixed(*f, *precision), false),
        (ColumnSpec::Fixed { width: _, precision }, Value::Int(i)) => (format_real_fixed(*i as f64, *precision), false),
        (ColumnSpec::Exp { width: _, precision }, Value::Float(f)) => (format_real_exp(*f, *precision), false),
        (ColumnSpec::Exp { width: _, precision }, Value::Int(i)) => (format_real_exp(*i as f64, *precision), false),
        (spec, value) => {
            return Err(Report::new(DescriptorError::serialization(format!(
                "a {} value cannot be written with the '{spec}' format", value.kind()
            ))));
        }
    };

    let nchar = text.chars().count();
    if nchar > width {
        return Err(Report::new(DescriptorError::serialization(format!(
            "'{text}' does not fit in the {width} characters of a '{spec}' column"
        ))));
    }

    if left_align {
        Ok(format!("{text:<width$}"))
    } else {
        Ok(format!("{text:>width$}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer() {
        assert_eq!(format_integer(0), "0");
        assert_eq!(format_integer(-1), "-1");
        assert_eq!(format_integer(999999), "999999");
    }

    #[test]
    fn test_real_shortest() {
        assert_eq!(format_real(5000.0), "5000.0");
        assert_eq!(format_real(0.25), "0.25");
        assert_eq!(format_real(-999.9), "-999.9");
        assert_eq!(format_real(0.0), "0.0");
        assert_eq!(format_real(-0.0), "-0.0");
        assert_eq!(format_real(0.0001), "0.0001");
        assert_eq!(format_real(1e-05), "1e-05");
        assert_eq!(format_real(1.5e16), "1.5e+16");
        assert_eq!(format_real(1e16), "1e+16");
        assert_eq!(format_real(1234567890123456.0), "1234567890123456.0");
        assert_eq!(format_real(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_real(f64::NAN), "nan");
        assert_eq!(format_real(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_real_shortest_reads_back() {
        for v in [3.14, -1e-300, 6.02e23, 123456.789, 1.0 / 3.0] {
            let s = format_real(v);
            let back: f64 = s.parse().unwrap();
            assert_eq!(back, v, "{s} did not read back as {v}");
        }
    }

    #[test]
    fn test_real_fixed() {
        assert_eq!(format_real_fixed(0.8, 2), "0.80");
        assert_eq!(format_real_fixed(-9.0, 1), "-9.0");
        assert_eq!(format_real_fixed(1.0, 3), "1.000");
    }

    #[test]
    fn test_real_exp() {
        assert_eq!(format_real_exp(5000.0, 4), "5.0000E+03");
        assert_eq!(format_real_exp(1e-4, 1), "1.0E-04");
        assert_eq!(format_real_exp(-2.5e-20, 1), "-2.5E-20");
        assert_eq!(format_real_exp(0.0, 1), "0.0E+00");
        assert_eq!(format_real_exp(3.14e120, 3), "3.140E+120");
    }

    #[test]
    fn test_char_column() -> DResult<()> {
        let spec = ColumnSpec::Char { width: 10 };
        let s = render_column(&spec, Some(&Value::Str("TRACER".to_string())))?;
        assert_eq!(s, "TRACER    ");

        let e = render_column(&spec, Some(&Value::Str("MUCH_TOO_LONG".to_string())));
        assert!(e.is_err(), "An overlong string did not return an error");
        Ok(())
    }

    #[test]
    fn test_numeric_columns() -> DResult<()> {
        let s = render_column(&ColumnSpec::Integer { width: 2 }, Some(&Value::Int(7)))?;
        assert_eq!(s, " 7");

        let s = render_column(&ColumnSpec::Fixed { width: 6, precision: 2 }, Some(&Value::Float(0.8)))?;
        assert_eq!(s, "  0.80");

        let s = render_column(&ColumnSpec::Exp { width: 11, precision: 1 }, Some(&Value::Float(1e-4)))?;
        assert_eq!(s, "    1.0E-04");

        let s = render_column(&ColumnSpec::Fixed { width: 7, precision: 3 }, Some(&Value::Int(1)))?;
        assert_eq!(s, "  1.000");

        let e = render_column(&ColumnSpec::Integer { width: 1 }, Some(&Value::Int(10)));
        assert!(e.is_err(), "An overlong integer did not return an error");

        let e = render_column(&ColumnSpec::Integer { width: 4 }, Some(&Value::Float(1.0)));
        assert!(e.is_err(), "A real in an integer column did not return an error");
        Ok(())
    }

    #[test]
    fn test_blank_column() -> DResult<()> {
        let s = render_column(&ColumnSpec::Fixed { width: 6, precision: 2 }, None)?;
        assert_eq!(s, "      ");
        Ok(())
    }
}
