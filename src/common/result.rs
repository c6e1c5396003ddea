use crate::common::error::WildfireError;

/// wildfire全体で使用するResult型のエイリアス
///
/// # Examples
///
/// ```
/// use wildfire::common::result::WildfireResult;
/// use wildfire::common::error::WildfireError;
///
/// fn example_function() -> WildfireResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> WildfireResult<()> {
///     Err(WildfireError::validation_error("name", "must not be empty", None))
/// }
/// ```
pub type WildfireResult<T> = Result<T, WildfireError>;

/// OptionをWildfireResultに変換するヘルパー
pub trait OptionExt<T> {
    /// Noneの場合に指定したエラーを返す
    ///
    /// # Examples
    ///
    /// ```
    /// use wildfire::common::result::{WildfireResult, OptionExt};
    /// use wildfire::domain::entities::registry::RegistryError;
    ///
    /// let none_value: Option<String> = None;
    /// let result: WildfireResult<String> = none_value.ok_or_wildfire(
    ///     RegistryError::GroupNotFound("web".to_string())
    /// );
    /// assert!(result.is_err());
    /// ```
    fn ok_or_wildfire(self, error: impl Into<WildfireError>) -> WildfireResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_wildfire(self, error: impl Into<WildfireError>) -> WildfireResult<T> {
        self.ok_or_else(|| error.into())
    }
}

/// 標準のResultをWildfireResultに変換するヘルパー
pub trait ResultExt<T, E> {
    /// ファイルシステムエラーとしてWildfireResultに変換
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> WildfireResult<T>
    where
        E: Into<std::io::Error>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> WildfireResult<T>
    where
        E: Into<std::io::Error>,
    {
        self.map_err(|e| WildfireError::filesystem_error_with_source(message, path, e.into()))
    }
}
