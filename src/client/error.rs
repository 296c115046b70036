use serde::{Deserialize, Serialize};
use std::fmt;
use wasm_bindgen::JsValue;

use super::remote::{ActionKind, TargetType};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientError {
    Network {
        message: String,
    },
    HttpStatus {
        status: u16,
    },
    Decode {
        message: String,
    },
    Rejected {
        action: ActionKind,
    },
    TargetOutOfRange {
        target_type: TargetType,
        target_index: u8,
    },
}

impl ClientError {
    /// 网络、状态码或解析失败；不会修改快照。
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Network { .. } | ClientError::HttpStatus { .. } | ClientError::Decode { .. }
        )
    }

    pub fn decode(error: impl fmt::Display) -> Self {
        ClientError::Decode {
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Network { message } => write!(f, "network error: {message}"),
            ClientError::HttpStatus { status } => write!(f, "server responded with status {status}"),
            ClientError::Decode { message } => write!(f, "malformed response: {message}"),
            ClientError::Rejected { action } => write!(f, "{} rejected by server", action.name()),
            ClientError::TargetOutOfRange {
                target_type,
                target_index,
            } => write!(
                f,
                "{} index {target_index} is out of range 0..={}",
                target_type.name(),
                target_type.max_index()
            ),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ClientError> for JsValue {
    fn from(error: ClientError) -> Self {
        serde_wasm_bindgen::to_value(&error)
            .unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_grouped() {
        assert!(ClientError::HttpStatus { status: 502 }.is_transport_failure());
        assert!(ClientError::decode("eof").is_transport_failure());
        assert!(!ClientError::Rejected {
            action: ActionKind::MoveCard
        }
        .is_transport_failure());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(ClientError::TargetOutOfRange {
            target_type: TargetType::Tableau,
            target_index: 9,
        })
        .expect("error serializes");
        assert_eq!(json["type"], "TargetOutOfRange");
        assert_eq!(json["target_type"], "tableau");
        assert_eq!(
            ClientError::TargetOutOfRange {
                target_type: TargetType::Tableau,
                target_index: 9,
            }
            .to_string(),
            "tableau index 9 is out of range 0..=6"
        );
    }
}
