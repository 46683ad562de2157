// ═══════════════════════════════════════════════════════════════════
// Error Tests — JournalError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use trading_journal_core::errors::JournalError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn serialization() {
        let err = JournalError::Serialization("float is not finite".into());
        assert_eq!(err.to_string(), "Serialization error: float is not finite");
    }

    #[test]
    fn deserialization() {
        let err = JournalError::Deserialization("unexpected EOF".into());
        assert_eq!(err.to_string(), "Deserialization error: unexpected EOF");
    }

    #[test]
    fn storage() {
        let err = JournalError::Storage("quota exceeded".into());
        assert_eq!(err.to_string(), "Storage error: quota exceeded");
    }

    #[test]
    fn file_io() {
        let err = JournalError::FileIO("permission denied".into());
        assert_eq!(err.to_string(), "File I/O error: permission denied");
    }

    #[test]
    fn validation_error() {
        let err = JournalError::ValidationError("asset must not be empty".into());
        assert_eq!(
            err.to_string(),
            "Trade validation failed: asset must not be empty"
        );
    }

    #[test]
    fn empty_message() {
        let err = JournalError::Storage(String::new());
        assert_eq!(err.to_string(), "Storage error: ");
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod from_impls {
    use super::*;

    #[test]
    fn from_io_error_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "backup missing");
        let err: JournalError = io_err.into();
        match &err {
            JournalError::FileIO(msg) => assert!(msg.contains("backup missing")),
            other => panic!("Expected FileIO, got {:?}", other),
        }
    }

    #[test]
    fn from_io_error_preserves_message() {
        let msg = "disk full: operação não permitida";
        let err: JournalError = std::io::Error::other(msg).into();
        match &err {
            JournalError::FileIO(m) => assert!(m.contains(msg)),
            other => panic!("Expected FileIO, got {:?}", other),
        }
    }

    #[test]
    fn from_serde_json_error() {
        let result: Result<Vec<serde_json::Value>, _> = serde_json::from_str("[{broken");
        let err: JournalError = result.unwrap_err().into();
        match &err {
            JournalError::Deserialization(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Deserialization, got {:?}", other),
        }
    }

    #[test]
    fn from_serde_json_error_eof() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("");
        let err: JournalError = result.unwrap_err().into();
        match &err {
            JournalError::Deserialization(msg) => assert!(msg.contains("EOF")),
            other => panic!("Expected Deserialization, got {:?}", other),
        }
    }

    #[test]
    fn question_mark_converts() {
        fn parse(raw: &str) -> Result<serde_json::Value, JournalError> {
            Ok(serde_json::from_str(raw)?)
        }
        assert!(parse("{}").is_ok());
        assert!(matches!(parse("nope"), Err(JournalError::Deserialization(_))));
    }
}

// ── Error is std::error::Error ──────────────────────────────────────

mod std_error {
    use super::*;

    #[test]
    fn implements_error_trait() {
        let err: Box<dyn std::error::Error> =
            Box::new(JournalError::ValidationError("duplicate id".into()));
        assert!(err.to_string().contains("duplicate id"));
    }

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<JournalError>();
    }

    #[test]
    fn all_variants_are_debug() {
        let variants = [
            JournalError::Serialization("s".into()),
            JournalError::Deserialization("d".into()),
            JournalError::Storage("st".into()),
            JournalError::FileIO("f".into()),
            JournalError::ValidationError("v".into()),
        ];
        for variant in &variants {
            assert!(!format!("{:?}", variant).is_empty());
        }
    }
}
