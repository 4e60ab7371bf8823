//! CLI command implementations.

mod add;
mod ask;
mod chat;
mod config;
mod doctor;
mod ingest;
mod init;
mod serve;

pub use add::run_add;
pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use ingest::run_ingest;
pub use init::run_init;
pub use serve::run_serve;

use crate::error::{KysyError, Result};
use serde_json::{Map, Value};

/// Parse a `--metadata` argument into a JSON object.
fn parse_metadata(metadata: Option<&str>) -> Result<Option<Map<String, Value>>> {
    match metadata {
        None => Ok(None),
        Some(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(KysyError::InvalidInput(
                "metadata must be a JSON object".to_string(),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metadata_none() {
        assert!(parse_metadata(None).unwrap().is_none());
    }

    #[test]
    fn test_parse_metadata_object() {
        let map = parse_metadata(Some(r#"{"topic": "history"}"#))
            .unwrap()
            .unwrap();
        assert_eq!(map["topic"], Value::from("history"));
    }

    #[test]
    fn test_parse_metadata_rejects_non_object() {
        assert!(parse_metadata(Some("[1, 2]")).is_err());
        assert!(parse_metadata(Some("not json")).is_err());
    }
}
