use core::fmt;

/// Result alias for `centroid`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by distance, clustering and compression primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty.
    EmptyInput,

    /// Feature dimension mismatch between two inputs.
    ShapeMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Fewer samples than requested clusters.
    InsufficientSamples {
        /// Requested cluster count.
        requested: usize,
        /// Number of samples.
        n_items: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// Generic error with message.
    Other(String),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::ShapeMismatch { expected, found } => {
                write!(f, "shape mismatch: expected dimension {expected}, found {found}")
            }
            Error::InsufficientSamples { requested, n_items } => {
                write!(f, "cannot create {requested} clusters from {n_items} samples")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = Error::ShapeMismatch {
            expected: 3,
            found: 2,
        };
        assert_eq!(e.to_string(), "shape mismatch: expected dimension 3, found 2");

        let e = Error::InsufficientSamples {
            requested: 5,
            n_items: 2,
        };
        assert!(e.to_string().contains("5 clusters"));

        let e = Error::invalid("tol", "must be finite");
        assert_eq!(e.to_string(), "invalid parameter 'tol': must be finite");
    }
}
