//! Result type alias for piiscan operations

use super::errors::PiiScanError;

/// Result type alias using [`PiiScanError`] as the error type.
///
/// Use this throughout the codebase for fallible operations.
pub type Result<T> = std::result::Result<T, PiiScanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::PiiScanError;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(PiiScanError::Other("test error".to_string()));
        assert!(result.is_err());
    }
}
