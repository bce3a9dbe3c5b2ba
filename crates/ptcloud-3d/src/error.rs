/// An error type for point set construction and queries.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PointSetError {
    /// An attribute array or grid shape does not agree with the point count.
    #[error("{what} has {actual} entries but {expected} were expected")]
    ShapeMismatch {
        /// The offending array.
        what: &'static str,
        /// The required number of entries.
        expected: usize,
        /// The number of entries provided.
        actual: usize,
    },

    /// A query or selection argument is malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A grid-only operation was requested on a flat point set.
    #[error("{0} requires an organized point set")]
    OrganizedOnlyOperation(&'static str),
}
