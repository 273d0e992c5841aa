//! JSON text for values that travel as strings (tool arguments, tool results).
//!
//! Clients on the Anthropic side compare argument strings verbatim, and the
//! conventional rendering there is `{"key": "value"}` with a space after each
//! separator, so the compact `serde_json` output is not used here.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::Value;
use std::io;

/// Compact JSON with `", "` between items and `": "` after keys.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

/// Render a JSON value as text, keeping object keys in input order.
pub fn to_json_text(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, SpacedFormatter);
    if value.serialize(&mut ser).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_separators() {
        let v = json!({"sql_query": "SELECT 1", "limit": 10});
        assert_eq!(to_json_text(&v), r#"{"sql_query": "SELECT 1", "limit": 10}"#);
    }

    #[test]
    fn test_nested_arrays() {
        let v = json!({"rows": [[1, 2], []], "ok": true, "none": null});
        assert_eq!(
            to_json_text(&v),
            r#"{"rows": [[1, 2], []], "ok": true, "none": null}"#
        );
    }

    #[test]
    fn test_empty_object_and_escapes() {
        assert_eq!(to_json_text(&json!({})), "{}");
        assert_eq!(to_json_text(&json!("a\"b")), r#""a\"b""#);
    }

    #[test]
    fn test_key_order_is_preserved() {
        let v: Value = serde_json::from_str(r#"{"z": 1, "a": 2}"#).unwrap();
        assert_eq!(to_json_text(&v), r#"{"z": 1, "a": 2}"#);
    }
}
