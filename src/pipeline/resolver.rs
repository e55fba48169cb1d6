//! Parameter resolution for one message.
//!
//! Each parameter is looked up in order: node configuration, message
//! top-level field, payload-level field. The first usable value wins. Only
//! presence is checked here; the server validates ranges and formats.

use crate::config::NodeConfig;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::types::Message;
use serde_json::Value;
use tracing::warn;

/// Field name of the group id on the message and its payload.
pub const GROUP_ID_FIELD: &str = "multicastGroupId";

/// Field name of the port on the message and its payload.
pub const F_PORT_FIELD: &str = "fPort";

/// Parameters resolved for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParams {
    pub multicast_group_id: String,
    pub f_port: u32,
}

/// Resolve group id and port.
pub fn resolve(config: &NodeConfig, msg: &Message) -> PipelineResult<ResolvedParams> {
    let multicast_group_id = resolve_group_id(config, msg)?;
    let f_port = resolve_f_port(config, msg);
    Ok(ResolvedParams {
        multicast_group_id,
        f_port,
    })
}

/// First non-empty group id, or `MissingParameter`.
pub fn resolve_group_id(config: &NodeConfig, msg: &Message) -> PipelineResult<String> {
    config
        .multicast_group_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or_else(|| msg.multicast_group_id.as_ref().and_then(group_id_value))
        .or_else(|| msg.payload.field(GROUP_ID_FIELD).and_then(group_id_value))
        .ok_or(PipelineError::MissingParameter(GROUP_ID_FIELD))
}

/// First usable port, falling back to the configured default.
pub fn resolve_f_port(config: &NodeConfig, msg: &Message) -> u32 {
    config
        .f_port
        .filter(|&p| p != 0)
        .or_else(|| {
            msg.f_port
                .as_ref()
                .and_then(|v| f_port_value(v, "message"))
        })
        .or_else(|| {
            msg.payload
                .field(F_PORT_FIELD)
                .and_then(|v| f_port_value(v, "payload"))
        })
        .unwrap_or(config.default_f_port)
}

fn group_id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// Null, zero and empty strings count as unset. Numeric strings are accepted.
fn f_port_value(value: &Value, source: &str) -> Option<u32> {
    let port = match value {
        Value::Null => return None,
        Value::String(s) if s.trim().is_empty() => return None,
        Value::String(s) => s.trim().parse::<u32>().ok(),
        Value::Number(n) => n.as_u64().and_then(|p| u32::try_from(p).ok()),
        _ => None,
    };
    match port {
        Some(0) => None,
        Some(p) => Some(p),
        None => {
            warn!("Ignoring unusable {} {} on the {}", F_PORT_FIELD, value, source);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg_with_payload(payload: Value) -> Message {
        Message::new(payload)
    }

    #[test]
    fn test_config_group_id_wins() {
        let cfg = NodeConfig::default().with_group_id("from-config");
        let msg = msg_with_payload(json!({"multicastGroupId": "from-payload"}))
            .with_group_id("from-msg");
        assert_eq!(resolve_group_id(&cfg, &msg).unwrap(), "from-config");
    }

    #[test]
    fn test_message_group_id_before_payload() {
        let cfg = NodeConfig::default();
        let msg = msg_with_payload(json!({"multicastGroupId": "from-payload"}))
            .with_group_id("from-msg");
        assert_eq!(resolve_group_id(&cfg, &msg).unwrap(), "from-msg");

        let msg = msg_with_payload(json!({"multicastGroupId": "from-payload"}));
        assert_eq!(resolve_group_id(&cfg, &msg).unwrap(), "from-payload");
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let cfg = NodeConfig::default().with_group_id("");
        let msg = msg_with_payload(json!({"multicastGroupId": "from-payload"}))
            .with_group_id("");
        assert_eq!(resolve_group_id(&cfg, &msg).unwrap(), "from-payload");
    }

    #[test]
    fn test_missing_group_id() {
        let cfg = NodeConfig::default();
        let msg = msg_with_payload(json!("0a0b"));
        assert_eq!(
            resolve_group_id(&cfg, &msg),
            Err(PipelineError::MissingParameter("multicastGroupId"))
        );
    }

    #[test]
    fn test_numeric_group_id_is_rendered() {
        let cfg = NodeConfig::default();
        let msg = msg_with_payload(json!(null)).with_group_id(42);
        assert_eq!(resolve_group_id(&cfg, &msg).unwrap(), "42");
    }

    #[test]
    fn test_f_port_precedence() {
        let msg = msg_with_payload(json!({"fPort": 3})).with_f_port(2);
        assert_eq!(resolve_f_port(&NodeConfig::default().with_f_port(1), &msg), 1);
        assert_eq!(resolve_f_port(&NodeConfig::default(), &msg), 2);

        let msg = msg_with_payload(json!({"fPort": 3}));
        assert_eq!(resolve_f_port(&NodeConfig::default(), &msg), 3);
    }

    #[test]
    fn test_f_port_default() {
        let msg = msg_with_payload(json!("ff"));
        assert_eq!(resolve_f_port(&NodeConfig::default(), &msg), 10);

        let mut cfg = NodeConfig::default();
        cfg.default_f_port = 42;
        assert_eq!(resolve_f_port(&cfg, &msg), 42);
    }

    #[test]
    fn test_numeric_string_f_port() {
        let msg = msg_with_payload(json!({"fPort": 7})).with_f_port("5");
        assert_eq!(resolve_f_port(&NodeConfig::default(), &msg), 5);

        let msg = msg_with_payload(json!({"fPort": " 12 "}));
        assert_eq!(resolve_f_port(&NodeConfig::default(), &msg), 12);
    }

    #[test]
    fn test_unusable_f_port_falls_through() {
        let msg = msg_with_payload(json!({"fPort": 7})).with_f_port("five");
        assert_eq!(resolve_f_port(&NodeConfig::default(), &msg), 7);

        let msg = msg_with_payload(json!({"fPort": 7})).with_f_port("");
        assert_eq!(resolve_f_port(&NodeConfig::default(), &msg), 7);

        let msg = msg_with_payload(json!({"fPort": -1})).with_f_port(0);
        assert_eq!(resolve_f_port(&NodeConfig::default(), &msg), 10);

        let msg = msg_with_payload(json!({"fPort": 5_000_000_000u64}));
        assert_eq!(resolve_f_port(&NodeConfig::default(), &msg), 10);
    }

    #[test]
    fn test_resolve_both() {
        let cfg = NodeConfig::default();
        let msg = msg_with_payload(json!({"data": "00", "multicastGroupId": "g", "fPort": 8}));
        assert_eq!(
            resolve(&cfg, &msg).unwrap(),
            ResolvedParams {
                multicast_group_id: "g".into(),
                f_port: 8
            }
        );
    }
}
