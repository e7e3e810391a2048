//! The JSON document carried by the status response.
//!
//! See [Server List Ping](https://wiki.vg/Server_List_Ping#Status_Response).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

const FAVICON_PREFIX: &str = "data:image/png;base64,";

/// Information about the server's version.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PingVersion {
    /// Version name, e.g. `1.8` or `13w41a`. Free-form in practice.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub protocol: i64,
}

/// One entry of the online player preview.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PingPlayer {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Opaque identifier; usually a UUID, but not guaranteed to be one.
    #[serde(deserialize_with = "nullable")]
    pub id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PingPlayerInfo {
    #[serde(deserialize_with = "nullable")]
    pub max: i64,
    #[serde(deserialize_with = "nullable")]
    pub online: i64,
    /// Servers often leave this out or fill it with advertising.
    #[serde(deserialize_with = "nullable")]
    pub sample: Vec<PingPlayer>,
}

/// The decoded status of a server.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PingReply {
    /// The MOTD as plain text.
    #[serde(deserialize_with = "description_text")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub players: PingPlayerInfo,
    #[serde(deserialize_with = "nullable")]
    pub version: PingVersion,
    /// Base64-encoded PNG, normally as a `data:image/png;base64,` URI.
    pub favicon: Option<String>,
}

#[derive(Error, Debug)]
pub enum FaviconError {
    #[error("favicon is not a base64 PNG data URI")]
    NotPngDataUri,
    #[error("favicon is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl PingReply {
    /// Decodes the status JSON. Unknown fields are ignored and missing ones
    /// keep their zero value.
    pub fn decode(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The favicon as raw PNG bytes, if the server sent one.
    pub fn favicon_png(&self) -> Result<Option<Vec<u8>>, FaviconError> {
        let favicon = match &self.favicon {
            Some(favicon) => favicon,
            None => return Ok(None),
        };
        let data = favicon
            .strip_prefix(FAVICON_PREFIX)
            .ok_or(FaviconError::NotPngDataUri)?;
        // some servers wrap the base64 payload
        let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        Ok(Some(base64::decode(data)?))
    }
}

/// `null` decodes like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn description_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        component @ Value::Object(_) | component @ Value::Array(_) => {
            let mut text = String::new();
            flatten_chat(&component, &mut text);
            text
        }
        other => other.to_string(),
    })
}

/// Appends the text of a chat component: its own `text`, then each of its
/// `extra` children in order.
fn flatten_chat(component: &Value, out: &mut String) {
    match component {
        Value::String(s) => out.push_str(s),
        Value::Array(parts) => parts.iter().for_each(|part| flatten_chat(part, out)),
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                out.push_str(text);
            }
            if let Some(extra) = map.get("extra") {
                flatten_chat(extra, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_status() {
        let reply = PingReply::decode(
            r#"{"description":"A server","players":{"max":20,"online":0},"version":{"name":"1.8","protocol":47}}"#,
        )
        .unwrap();
        assert_eq!(reply.description, "A server");
        assert_eq!(reply.players.max, 20);
        assert_eq!(reply.players.online, 0);
        assert!(reply.players.sample.is_empty());
        assert_eq!(reply.version.name, "1.8");
        assert_eq!(reply.version.protocol, 47);
        assert_eq!(reply.favicon, None);
    }

    #[test]
    fn missing_fields_are_zeroed() {
        let reply = PingReply::decode("{}").unwrap();
        assert_eq!(reply, PingReply::default());

        let reply = PingReply::decode(r#"{"players":{"online":3,"sample":null}}"#).unwrap();
        assert_eq!(reply.players.online, 3);
        assert_eq!(reply.players.max, 0);
        assert!(reply.players.sample.is_empty());
    }

    #[test]
    fn null_fields_are_zeroed() {
        let reply = PingReply::decode(
            r#"{"description":null,"players":null,"version":null,"favicon":null}"#,
        )
        .unwrap();
        assert_eq!(reply, PingReply::default());

        let reply = PingReply::decode(
            r#"{"version":{"name":null,"protocol":null},
                "players":{"max":null,"online":null,"sample":[{"name":null,"id":null}]}}"#,
        )
        .unwrap();
        assert_eq!(reply.version, PingVersion::default());
        assert_eq!(reply.players.max, 0);
        assert_eq!(reply.players.online, 0);
        assert_eq!(reply.players.sample, [PingPlayer::default()]);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let reply = PingReply::decode(
            r#"{"description":"x","enforcesSecureChat":true,"modinfo":{"type":"FML","modList":[]}}"#,
        )
        .unwrap();
        assert_eq!(reply.description, "x");
    }

    #[test]
    fn sample_keeps_order_and_opaque_ids() {
        let reply = PingReply::decode(
            r#"{"players":{"max":100,"online":250,"sample":[
                {"name":"Notch","id":"069a79f4-44e9-4726-a5be-fca90e38aaf5"},
                {"name":"§aJoin now!","id":"00000000-0000-0000-0000-000000000000"},
                {"name":"legacy","id":"not-a-uuid"}
            ]}}"#,
        )
        .unwrap();
        let names: Vec<_> = reply.players.sample.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Notch", "§aJoin now!", "legacy"]);
        assert_eq!(reply.players.sample[2].id, "not-a-uuid");
        // online above max is reported as-is
        assert_eq!(reply.players.online, 250);
    }

    #[test]
    fn chat_component_description_is_flattened() {
        let reply = PingReply::decode(
            r#"{"description":{"text":"Hello ","extra":[{"text":"world","color":"gold"},"!",{"extra":[{"text":"?"}]}]}}"#,
        )
        .unwrap();
        assert_eq!(reply.description, "Hello world!?");
    }

    #[test]
    fn malformed_json_fails() {
        assert!(PingReply::decode(r#"{"description": "#).is_err());
        assert!(PingReply::decode(r#"{"players":{"max":"many"}}"#).is_err());
        assert!(PingReply::decode("not json").is_err());
    }

    #[test]
    fn favicon_png() {
        let reply = PingReply {
            favicon: Some("data:image/png;base64,iVBO\nRw==".to_string()),
            ..PingReply::default()
        };
        assert_eq!(reply.favicon_png().unwrap().unwrap(), [0x89, 0x50, 0x4E, 0x47]);

        assert!(PingReply::default().favicon_png().unwrap().is_none());

        let bad = PingReply {
            favicon: Some("iVBORw==".to_string()),
            ..PingReply::default()
        };
        assert!(matches!(bad.favicon_png(), Err(FaviconError::NotPngDataUri)));
    }
}
