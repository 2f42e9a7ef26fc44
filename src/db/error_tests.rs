//! Unit tests for database error types

#[cfg(test)]
mod tests {
    use crate::db::error::DbError;
    use std::error::Error;

    #[test]
    fn test_collection_not_found_error() {
        let error = DbError::CollectionNotFound("whoniverse".to_string());
        assert_eq!(error.to_string(), "Collection not found: whoniverse");
    }

    #[test]
    fn test_serialize_error() {
        let error = DbError::SerializeError("Invalid UTF-8".to_string());
        assert_eq!(error.to_string(), "Error during serialization: Invalid UTF-8");
    }

    #[test]
    fn test_invalid_input_display() {
        let error = DbError::InvalidInput("item cannot be its own parent".to_string());
        let display = format!("{}", error);
        assert!(display.contains("Invalid input"));
        assert!(display.contains("own parent"));
    }

    #[test]
    fn test_error_debug() {
        let error = DbError::SerializeError("test error".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("SerializeError"));
        assert!(debug.contains("test error"));
    }

    #[test]
    fn test_error_source() {
        let error = DbError::CollectionNotFound("c1".to_string());
        assert!(error.source().is_none());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DbError>();
    }

    #[test]
    fn test_error_pattern_matching() {
        let errors = vec![
            DbError::CollectionNotFound("c1".to_string()),
            DbError::InvalidInput("cycle".to_string()),
        ];

        for error in errors {
            match error {
                DbError::CollectionNotFound(id) => assert_eq!(id, "c1"),
                DbError::InvalidInput(msg) => assert_eq!(msg, "cycle"),
                _ => panic!("Unexpected variant"),
            }
        }
    }
}
