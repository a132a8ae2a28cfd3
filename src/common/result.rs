use crate::common::error::TaggerError;

/// Result alias used throughout the crate.
///
/// # Examples
///
/// ```
/// use release_tagger::common::result::TaggerResult;
/// use release_tagger::common::error::TaggerError;
///
/// fn example_function() -> TaggerResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> TaggerResult<()> {
///     Err(TaggerError::validation_error("release", "must not be empty", None))
/// }
/// ```
pub type TaggerResult<T> = Result<T, TaggerError>;

/// Conversion helpers from foreign `Result`s to `TaggerResult`.
pub trait ResultExt<T, E> {
    /// Wrap an I/O failure as a filesystem error tied to `path`.
    ///
    /// ```
    /// use release_tagger::common::result::{TaggerResult, ResultExt};
    ///
    /// let result: Result<String, std::io::Error> = Err(std::io::Error::new(
    ///     std::io::ErrorKind::NotFound, "file not found"
    /// ));
    /// let tagged: TaggerResult<String> = result.with_filesystem_error("Read failed", None);
    /// assert!(tagged.is_err());
    /// ```
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> TaggerResult<T>
    where
        E: Into<std::io::Error>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> TaggerResult<T>
    where
        E: Into<std::io::Error>,
    {
        self.map_err(|e| TaggerError::filesystem_error_with_source(message, path, e.into()))
    }
}
