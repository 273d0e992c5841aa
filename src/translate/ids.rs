//! Identifiers minted when a document does not carry its own.

use uuid::Uuid;

const ID_HEX_LEN: usize = 16;

fn random_hex() -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(ID_HEX_LEN);
    hex
}

/// A fresh tool-call id, `call_<16 hex>`.
pub fn tool_call_id() -> String {
    format!("call_{}", random_hex())
}

/// A fresh message id, `msg_<16 hex>`.
pub fn message_id() -> String {
    format!("msg_{}", random_hex())
}

/// Keep a usable id from the wire, or mint one with `fresh`.
pub fn or_generate(id: Option<&str>, fresh: fn() -> String) -> String {
    match id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => fresh(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_and_length() {
        let call = tool_call_id();
        let msg = message_id();
        assert!(call.starts_with("call_"));
        assert!(msg.starts_with("msg_"));
        assert_eq!(call.len(), "call_".len() + ID_HEX_LEN);
        assert_eq!(msg.len(), "msg_".len() + ID_HEX_LEN);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(tool_call_id(), tool_call_id());
    }

    #[test]
    fn test_or_generate() {
        assert_eq!(or_generate(Some("call_x"), tool_call_id), "call_x");
        assert!(or_generate(Some(""), tool_call_id).starts_with("call_"));
        assert!(or_generate(None, message_id).starts_with("msg_"));
    }
}
