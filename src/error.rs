//! Error type shared by the library

use std::fmt;

/// Failures raised by the Plinko core
///
/// Everything here is local and recoverable: callers fall back to a
/// placeholder board rather than aborting the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PlinkoError {
    /// A radius, board dimension or column width that is zero, negative or not finite
    InvalidGeometry { what: &'static str, value: f32 },
    /// The catalog resource could not be read
    Catalog(String),
}

impl PlinkoError {
    /// Reject `value` unless it is a finite, strictly positive length
    pub fn check_positive(what: &'static str, value: f32) -> Result<f32, PlinkoError> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(PlinkoError::InvalidGeometry { what, value })
        }
    }
}

impl fmt::Display for PlinkoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlinkoError::InvalidGeometry { what, value } => {
                write!(f, "invalid geometry: {} must be positive, got {}", what, value)
            }
            PlinkoError::Catalog(msg) => write!(f, "catalog unavailable: {}", msg),
        }
    }
}

impl std::error::Error for PlinkoError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_positive() {
        assert_eq!(PlinkoError::check_positive("radius", 3.0), Ok(3.0));
        assert!(PlinkoError::check_positive("radius", 0.0).is_err());
        assert!(PlinkoError::check_positive("radius", -1.0).is_err());
        assert!(PlinkoError::check_positive("radius", f32::NAN).is_err());
        assert!(PlinkoError::check_positive("radius", f32::INFINITY).is_err());
    }

    #[test]
    fn test_display() {
        let err = PlinkoError::InvalidGeometry { what: "ball radius", value: -2.0 };
        assert_eq!(err.to_string(), "invalid geometry: ball radius must be positive, got -2");
    }
}
