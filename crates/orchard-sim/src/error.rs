use std::fmt;

/// An invalid value in [`OrchardConfig`](crate::OrchardConfig) or one of its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    /// Dotted path of the offending field, e.g. `"buildings.distance"`.
    pub field: &'static str,
    pub message: String,
}

impl ConfigError {
    pub(crate) fn new(field: &'static str, msg: impl Into<String>) -> Self {
        Self { field, message: msg.into() }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid orchard config `{}`: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Returns an error unless `lo <= hi` and both ends are finite.
pub(crate) fn check_range(
    field: &'static str,
    range: &std::ops::Range<f32>,
) -> Result<(), ConfigError> {
    if !range.start.is_finite() || !range.end.is_finite() {
        return Err(ConfigError::new(field, "range bounds must be finite"));
    }
    if range.start >= range.end {
        return Err(ConfigError::new(
            field,
            format!("empty range {}..{}", range.start, range.end),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_field() {
        let e = ConfigError::new("gravity", "must be positive");
        assert_eq!(e.to_string(), "invalid orchard config `gravity`: must be positive");
    }

    #[test]
    fn range_checks() {
        assert!(check_range("r", &(1.0..2.0)).is_ok());
        assert!(check_range("r", &(2.0..2.0)).is_err());
        assert!(check_range("r", &(3.0..2.0)).is_err());
        assert!(check_range("r", &(0.0..f32::INFINITY)).is_err());
    }
}
