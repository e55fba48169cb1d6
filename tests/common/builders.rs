//! Test data builders for creating test objects

use chirpstack_multicast::config::{AppConfig, NodeConfig, ServerConfig};
use chirpstack_multicast::types::{Message, Payload};
use serde_json::{json, Value};

/// Builder for inbound messages
pub struct MessageBuilder {
    group_id: Option<Value>,
    f_port: Option<Value>,
    payload: Payload,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self {
            group_id: None,
            f_port: None,
            payload: Payload::Json(Value::Null),
        }
    }

    pub fn group_id(mut self, id: &str) -> Self {
        self.group_id = Some(json!(id));
        self
    }

    pub fn f_port(mut self, f_port: u32) -> Self {
        self.f_port = Some(json!(f_port));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.payload = Payload::Json(json!(text));
        self
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.payload = Payload::Binary(bytes.to_vec());
        self
    }

    pub fn json(mut self, value: Value) -> Self {
        self.payload = Payload::Json(value);
        self
    }

    pub fn build(self) -> Message {
        let mut msg = Message::new(self.payload);
        msg.multicast_group_id = self.group_id;
        msg.f_port = self.f_port;
        msg
    }
}

/// Config pointing at a dummy server with a node bound to `group_id`
pub fn app_config(group_id: Option<&str>) -> AppConfig {
    let mut node = NodeConfig::default();
    node.multicast_group_id = group_id.map(str::to_string);
    AppConfig {
        server: ServerConfig::new("localhost:8080", "test-token"),
        node,
        ..AppConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builder() {
        let msg = MessageBuilder::new().group_id("g").f_port(3).text("00").build();
        assert_eq!(msg.multicast_group_id, Some(json!("g")));
        assert_eq!(msg.f_port, Some(json!(3)));
        assert_eq!(msg.payload, Payload::Json(json!("00")));
    }
}
