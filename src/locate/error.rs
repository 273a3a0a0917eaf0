use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for locate operations.
pub type LocateResult<T> = Result<T, LocateError>;

/// Which of the two input images a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Main,
    Sub,
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRole::Main => f.write_str("main image"),
            ImageRole::Sub => f.write_str("sub image"),
        }
    }
}

/// A single pre-flight check that failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{which} path not found: {}", .path.display())]
    PathNotFound { which: ImageRole, path: PathBuf },

    #[error("invalid parameter '{name}' = {value}: expected {expected}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Every pre-flight violation found in one pass. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Returns `None` for an empty list so an empty aggregate can't exist.
    pub fn new(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn has_missing_path(&self, role: ImageRole) -> bool {
        self.0
            .iter()
            .any(|e| matches!(e, ValidationError::PathNotFound { which, .. } if *which == role))
    }

    pub fn has_invalid_parameter(&self, param: &str) -> bool {
        self.0
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidParameter { name, .. } if *name == param))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid argument(s): ", self.0.len())?;
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The error type for the match-and-deduplicate pipeline.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("Arguments were not valid: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{which} path not found: {}", .path.display())]
    PathNotFound { which: ImageRole, path: PathBuf },

    #[error("Failed to decode {which} at {}: {source}", .path.display())]
    ImageDecode {
        which: ImageRole,
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to write annotated image {}: {source}", .path.display())]
    AnnotationWrite {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("{which} has zero width or height")]
    EmptyImage { which: ImageRole },

    #[error("Sub image {sub_width}x{sub_height} is larger than main image {main_width}x{main_height}")]
    TemplateTooLarge {
        sub_width: u32,
        sub_height: u32,
        main_width: u32,
        main_height: u32,
    },
}

impl LocateError {
    /// The aggregated pre-flight violations, if this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            LocateError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_aggregate_is_rejected() {
        assert!(ValidationErrors::new(Vec::new()).is_none());
    }

    #[test]
    fn test_aggregate_display_lists_every_violation() {
        let errors = ValidationErrors::new(vec![
            ValidationError::PathNotFound {
                which: ImageRole::Main,
                path: PathBuf::from("missing.png"),
            },
            ValidationError::InvalidParameter {
                name: "confidence",
                value: 1.5,
                expected: "a value within [0, 1]",
            },
        ])
        .unwrap();

        let text = LocateError::from(errors).to_string();
        assert!(text.contains("2 invalid argument(s)"), "got: {text}");
        assert!(text.contains("main image path not found: missing.png"));
        assert!(text.contains("'confidence' = 1.5"));
    }

    #[test]
    fn test_lookup_helpers() {
        let errors = ValidationErrors::new(vec![ValidationError::PathNotFound {
            which: ImageRole::Sub,
            path: PathBuf::from("a.png"),
        }])
        .unwrap();

        assert!(errors.has_missing_path(ImageRole::Sub));
        assert!(!errors.has_missing_path(ImageRole::Main));
        assert!(!errors.has_invalid_parameter("confidence"));
    }
}
