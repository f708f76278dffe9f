use serde::{Deserialize, Serialize};

use super::{
    error::{ProtoError, Result},
    packets::{StatusRequestC2s, StatusResponseS2c},
    types::{encode_packet, PacketFrame},
};

/// Body of the status response, serialized as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    pub version: StatusVersion,
    pub players: StatusPlayers,
    pub description: StatusDescription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub enforces_secure_chat: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub previews_chat: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusVersion {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPlayers {
    pub max: i32,
    pub online: i32,
    #[serde(default)]
    pub sample: Vec<StatusPlayerSample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPlayerSample {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDescription {
    pub text: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl StatusPayload {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| ProtoError::Json(err.to_string()))
    }
}

/// Answers status requests with a response framed once at construction.
///
/// The payload only depends on server configuration, so every connection
/// receives the same bytes.
#[derive(Debug, Clone)]
pub struct StatusResponder {
    frame: Vec<u8>,
}

impl StatusResponder {
    pub fn new(payload: &StatusPayload) -> Result<Self> {
        let json = payload.to_json()?;
        let mut frame = Vec::with_capacity(json.len() + 8);
        encode_packet(&mut frame, &StatusResponseS2c { json: &json })?;
        Ok(Self { frame })
    }

    /// Complete response packet, outer length included.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Returns the response for a status request and `None` for any other
    /// packet. A status request with a body is malformed.
    pub fn respond(&self, request: &PacketFrame) -> Result<Option<&[u8]>> {
        if request.id != StatusRequestC2s::ID {
            return Ok(None);
        }
        if !request.body.is_empty() {
            return Err(ProtoError::TrailingBytes(request.body.len()));
        }
        Ok(Some(&self.frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> StatusPayload {
        StatusPayload {
            version: StatusVersion {
                name: "1.20.1".into(),
                protocol: 763,
            },
            players: StatusPlayers {
                max: 20,
                online: 0,
                sample: Vec::new(),
            },
            description: StatusDescription {
                text: "Hello".into(),
            },
            favicon: None,
            enforces_secure_chat: false,
            previews_chat: true,
        }
    }

    #[test]
    fn optional_fields_are_omitted() {
        let json = payload().to_json().unwrap();
        assert!(!json.contains("favicon"));
        assert!(!json.contains("enforcesSecureChat"));
        assert!(json.contains("\"previewsChat\":true"));
        assert!(json.contains("\"sample\":[]"));
    }

    #[test]
    fn respond_ignores_other_packets() {
        let responder = StatusResponder::new(&payload()).unwrap();
        let ping = PacketFrame {
            id: 0x01,
            body: vec![0; 8],
        };
        assert_eq!(responder.respond(&ping).unwrap(), None);
    }

    #[test]
    fn respond_rejects_request_with_body() {
        let responder = StatusResponder::new(&payload()).unwrap();
        let request = PacketFrame {
            id: 0x00,
            body: vec![1],
        };
        assert_eq!(
            responder.respond(&request),
            Err(ProtoError::TrailingBytes(1))
        );
    }
}
