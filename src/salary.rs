use thiserror::Error;
use tracing::warn;

const CURRENCY_SYMBOLS: [char; 4] = ['₹', '$', '€', '£'];
const RANGE_SEPARATOR: &str = " - ";
const FROM_MARKER: &str = "From";
const UP_TO_MARKER: &str = "Up to";


#[derive(Debug, Error, PartialEq)]
pub(crate) enum SalaryError {
    #[error("no amount found in {0:?}")]
    MissingAmount(String),

    #[error("{0:?} is not a number")]
    InvalidAmount(String),
}


/// The shapes a salary can be written in on a results page
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SalaryExpr {
    /// `₹20,000 - ₹30,000 a month`
    Range { low: f64, high: f64 },
    /// `From ₹25,000 a month`
    From(f64),
    /// `Up to ₹8,000 a month`
    UpTo(f64),
    /// `₹15,000 a month`
    Exact(f64),
}


impl SalaryExpr {
    pub(crate) fn parse(text: &str) -> Result<Self, SalaryError> {
        let cleaned: String = text
            .chars()
            .filter(|c| *c != ',' && !CURRENCY_SYMBOLS.contains(c))
            .collect();
        let cleaned = cleaned.trim();

        if let Some((low, high)) = cleaned.split_once(RANGE_SEPARATOR) {
            return Ok(Self::Range {
                low: parse_amount(low.trim())?,
                // Drops the period qualifier, eg. "a month"
                high: parse_amount(first_token(high)?)?
            });
        }
        if let Some(rest) = cleaned.strip_prefix(FROM_MARKER) {
            return Ok(Self::From(parse_amount(first_token(rest)?)?));
        }
        if let Some(rest) = cleaned.strip_prefix(UP_TO_MARKER) {
            return Ok(Self::UpTo(parse_amount(first_token(rest)?)?));
        }
        Ok(Self::Exact(parse_amount(first_token(cleaned)?)?))
    }

    /// A single number that stands in for the whole expression
    pub(crate) fn value(self) -> f64 {
        match self {
            Self::Range { low, high } => (low + high) / 2.0,
            Self::From(x) | Self::UpTo(x) | Self::Exact(x) => x
        }
    }
}


fn first_token(text: &str) -> Result<&str, SalaryError> {
    text
        .split_whitespace()
        .next()
        .ok_or_else(|| SalaryError::MissingAmount(text.to_string()))
}


fn parse_amount(token: &str) -> Result<f64, SalaryError> {
    if token.is_empty() {
        return Err(SalaryError::MissingAmount(token.to_string()));
    }
    token
        .parse()
        .map_err(|_| SalaryError::InvalidAmount(token.to_string()))
}


/// Normalizes a salary string to one number, or 0 if it cannot be read
pub(crate) fn extract_average_salary(text: &str) -> f64 {
    match SalaryExpr::parse(text) {
        Ok(expr) => expr.value(),
        Err(e) => {
            warn!("Error extracting salary: {e}");
            0.0
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_averaged() {
        assert_eq!(extract_average_salary("₹20,000 - ₹30,000 a month"), 25000.0);
        assert_eq!(
            SalaryExpr::parse("₹20,000 - ₹30,000 a month"),
            Ok(SalaryExpr::Range { low: 20000.0, high: 30000.0 })
        );
    }

    #[test]
    fn lower_bound_only() {
        assert_eq!(extract_average_salary("From ₹25,000 a month"), 25000.0);
        assert_eq!(SalaryExpr::parse("From ₹25,000 a month"), Ok(SalaryExpr::From(25000.0)));
    }

    #[test]
    fn upper_bound_only() {
        assert_eq!(extract_average_salary("Up to ₹8,000 a month"), 8000.0);
        assert_eq!(SalaryExpr::parse("Up to ₹8,000 a month"), Ok(SalaryExpr::UpTo(8000.0)));
    }

    #[test]
    fn exact_amount_uses_first_token() {
        assert_eq!(SalaryExpr::parse("₹15,000 a month"), Ok(SalaryExpr::Exact(15000.0)));
        assert_eq!(extract_average_salary("$1,200.50 an hour"), 1200.5);
    }

    #[test]
    fn garbage_is_zero() {
        assert_eq!(extract_average_salary("garbage"), 0.0);
        assert_eq!(
            SalaryExpr::parse("garbage"),
            Err(SalaryError::InvalidAmount("garbage".into()))
        );
    }

    #[test]
    fn empty_text_is_zero() {
        assert_eq!(extract_average_salary(""), 0.0);
        assert!(matches!(SalaryExpr::parse("₹"), Err(SalaryError::MissingAmount(_))));
        assert!(matches!(SalaryExpr::parse("From"), Err(SalaryError::MissingAmount(_))));
    }

    #[test]
    fn bad_range_bound_is_zero() {
        assert_eq!(extract_average_salary("₹20,000 - negotiable"), 0.0);
        assert_eq!(extract_average_salary("Competitive - ₹30,000 a month"), 0.0);
    }
}
