use serde::Deserialize;
use serde::Serialize;

/// Body of the generation request POSTed to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            project_id: None,
        }
    }
}

/// JSON envelope carried in each SSE `data:` payload.
///
/// Only `chunk` content ever reaches the parsing core; `complete` and
/// `error` are out-of-band terminal signals. Unknown kinds are skipped so
/// the backend can add event types without breaking older clients.
#[derive(Debug, Deserialize)]
pub(crate) struct StreamEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::GenerateRequest;
    use super::StreamEnvelope;

    #[test]
    fn request_omits_missing_project_id() {
        let json = serde_json::to_value(GenerateRequest::new("make an app")).expect("serialize");
        assert_eq!(json.get("project_id"), None);
        assert_eq!(json["prompt"], "make an app");
    }

    #[test]
    fn envelope_parses_chunk() {
        let envelope: StreamEnvelope =
            serde_json::from_str(r#"{"type":"chunk","content":"<file path=\"a.ts\">"}"#)
                .expect("deserialize");
        assert_eq!(envelope.kind, "chunk");
        assert_eq!(envelope.content.as_deref(), Some("<file path=\"a.ts\">"));
        assert_eq!(envelope.message, None);
    }
}
