use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{Reply, Usage};

/// Error descriptor carried by a failed response.
///
/// Responders send either `{"error": {"message": "..."}}` or the bare string
/// form `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ResponderErrorObject {
    /// A plain error string.
    Text(String),

    /// A structured error object.
    Detailed {
        /// Human-readable error text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,

        /// Machine-readable error category.
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        error_type: Option<String>,
    },
}

impl ResponderErrorObject {
    /// Read a descriptor from the `error` member of a body.
    ///
    /// Falsy values (`null`, `false`, `0`, `""`) report nothing.  Text is
    /// taken from a string `message`, or from the value itself when it is a
    /// string; fields of any other type are ignored.
    fn from_value(value: &Value) -> Option<Self> {
        if !is_truthy(value) {
            return None;
        }
        match value {
            Value::String(text) => Some(ResponderErrorObject::Text(text.clone())),
            Value::Object(fields) => Some(ResponderErrorObject::Detailed {
                message: string_field(fields.get("message")),
                error_type: string_field(fields.get("type")),
            }),
            _ => Some(ResponderErrorObject::Detailed {
                message: None,
                error_type: None,
            }),
        }
    }

    /// Returns true if the descriptor actually reports something.
    ///
    /// An empty string does not count as an error.
    pub fn is_reported(&self) -> bool {
        match self {
            ResponderErrorObject::Text(text) => !text.is_empty(),
            ResponderErrorObject::Detailed { .. } => true,
        }
    }

    /// Convert the descriptor into an [`Error::Responder`].
    pub fn into_error(self) -> Error {
        match self {
            ResponderErrorObject::Text(text) => Error::responder(text, None),
            ResponderErrorObject::Detailed {
                message: Some(message),
                error_type,
            } => Error::responder(message, error_type),
            ResponderErrorObject::Detailed {
                message: None,
                error_type: Some(error_type),
            } => Error::responder(error_type.clone(), Some(error_type)),
            ResponderErrorObject::Detailed {
                message: None,
                error_type: None,
            } => Error::responder("The responder reported an unspecified error", None),
        }
    }
}

/// The nested message inside a choice.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ChoiceMessage {
    /// Role string as reported by the responder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// The reply text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One candidate reply.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Choice {
    /// Position of this choice in the list.
    pub index: u32,

    /// The reply message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<ChoiceMessage>,

    /// Why generation stopped, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl Choice {
    /// Read one entry of `choices`.  Anything that is not an object yields an
    /// empty choice at that position.
    fn from_value(position: usize, value: &Value) -> Self {
        let Value::Object(fields) = value else {
            return Choice {
                index: position as u32,
                ..Choice::default()
            };
        };
        let index = fields
            .get("index")
            .and_then(Value::as_u64)
            .and_then(|index| u32::try_from(index).ok())
            .unwrap_or(position as u32);
        let message = match fields.get("message") {
            Some(Value::Object(message)) => Some(ChoiceMessage {
                role: string_field(message.get("role")),
                content: string_field(message.get("content")),
            }),
            _ => None,
        };
        Choice {
            index,
            message,
            finish_reason: string_field(fields.get("finish_reason")),
        }
    }
}

/// A parsed response body from the responder.
///
/// Parsing is lenient: only the members that decide the outcome are read,
/// and a member of an unexpected type is treated as absent rather than
/// failing the whole body.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ChatResponse {
    /// Present when the responder reports a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponderErrorObject>,

    /// Candidate replies; only the first is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,

    /// Token usage, if the responder reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Create a successful response with a single reply.
    pub fn with_reply(content: impl Into<String>) -> Self {
        Self {
            error: None,
            choices: Some(vec![Choice {
                index: 0,
                message: Some(ChoiceMessage {
                    role: Some("assistant".to_string()),
                    content: Some(content.into()),
                }),
                finish_reason: None,
            }]),
            usage: None,
        }
    }

    /// Create a failed response with the given error message.
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(ResponderErrorObject::Detailed {
                message: Some(message.into()),
                error_type: None,
            }),
            choices: None,
            usage: None,
        }
    }

    /// Parse a response body.
    ///
    /// Anything that is not a JSON object is a format error.
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).map_err(|_| Error::format())?;
        Self::from_value(&value)
    }

    /// Read a response from an already decoded body.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(Error::format());
        };
        let error = fields.get("error").and_then(ResponderErrorObject::from_value);
        let choices = match fields.get("choices") {
            Some(Value::Array(choices)) => Some(
                choices
                    .iter()
                    .enumerate()
                    .map(|(position, choice)| Choice::from_value(position, choice))
                    .collect(),
            ),
            _ => None,
        };
        // usage is informational; a malformed one is dropped
        let usage = fields
            .get("usage")
            .filter(|usage| !usage.is_null())
            .and_then(|usage| serde_json::from_value::<Usage>(usage.clone()).ok());
        Ok(Self {
            error,
            choices,
            usage,
        })
    }

    /// Classify the response, extracting the first reply on success.
    ///
    /// A reported error wins over any reply that may also be present.  A
    /// missing or empty reply is a format error.
    pub fn into_reply(self) -> Result<Reply> {
        if let Some(error) = self.error {
            if error.is_reported() {
                return Err(error.into_error());
            }
        }
        let content = self
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(Error::format)?;
        Ok(Reply {
            content,
            usage: self.usage,
        })
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(body: &str) -> Result<Reply> {
        ChatResponse::parse(body)?.into_reply()
    }

    #[test]
    fn success_extracts_first_choice() {
        let reply = classify(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Try a leave-in conditioner"}},
                {"index":1,"message":{"role":"assistant","content":"ignored"}}],
                "usage":{"prompt_tokens":12,"completion_tokens":6,"total_tokens":18}}"#,
        )
        .unwrap();
        assert_eq!(reply.content, "Try a leave-in conditioner");
        assert_eq!(reply.usage, Some(Usage::new(12, 6)));
    }

    #[test]
    fn structured_error_reports_message() {
        let err = classify(r#"{"error":{"message":"Incorrect API key","type":"invalid_request_error"}}"#)
            .unwrap_err();
        assert!(err.is_responder());
        assert_eq!(err.to_string(), "Incorrect API key");
    }

    #[test]
    fn string_error_reports_text() {
        let err = classify(r#"{"error":"quota exceeded"}"#).unwrap_err();
        assert!(err.is_responder());
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn error_wins_over_choices() {
        let err = classify(
            r#"{"error":{"message":"E"},"choices":[{"message":{"content":"R"}}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "E");
    }

    #[test]
    fn empty_error_string_is_not_an_error() {
        let reply = classify(r#"{"error":"","choices":[{"message":{"content":"R"}}]}"#).unwrap();
        assert_eq!(reply.content, "R");
    }

    #[test]
    fn null_error_is_not_an_error() {
        let reply = classify(r#"{"error":null,"choices":[{"message":{"content":"R"}}]}"#).unwrap();
        assert_eq!(reply.content, "R");
    }

    #[test]
    fn missing_or_empty_reply_is_format_error() {
        for body in [
            r#"{}"#,
            r#"{"choices":[]}"#,
            r#"{"choices":[{}]}"#,
            r#"{"choices":[{"message":{}}]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":""}}]}"#,
        ] {
            let err = classify(body).unwrap_err();
            assert!(err.is_format(), "{body} should be a format error");
        }
    }

    #[test]
    fn non_object_bodies_are_format_errors() {
        for body in ["", "not json", "[1,2,3]", r#""text""#, r#"{"choices":"nope"}"#] {
            let err = classify(body).unwrap_err();
            assert!(err.is_format(), "{body:?} should be a format error");
        }
    }

    #[test]
    fn stray_members_do_not_spoil_a_reply() {
        for body in [
            r#"{"choices":[{"message":{"content":"R"}}],"usage":{"prompt_tokens":null}}"#,
            r#"{"choices":[{"message":{"content":"R"}}],"usage":"lots"}"#,
            r#"{"choices":[{"index":null,"message":{"content":"R"}}]}"#,
            r#"{"choices":[{"index":"first","message":{"role":7,"content":"R"},"finish_reason":1}]}"#,
            r#"{"choices":[{"message":{"content":"R"}},42]}"#,
            r#"{"error":false,"choices":[{"message":{"content":"R"}}]}"#,
            r#"{"error":0,"choices":[{"message":{"content":"R"}}]}"#,
        ] {
            let reply = classify(body).unwrap_or_else(|err| panic!("{body}: {err}"));
            assert_eq!(reply.content, "R", "{body}");
            assert_eq!(reply.usage, None, "{body}");
        }
    }

    #[test]
    fn error_message_is_read_when_type_is_odd() {
        let err = classify(r#"{"error":{"message":"E","type":7}}"#).unwrap_err();
        assert!(err.is_responder());
        assert_eq!(err.to_string(), "E");
    }

    #[test]
    fn truthy_error_without_text_is_still_reported() {
        for body in [
            r#"{"error":true,"choices":[{"message":{"content":"R"}}]}"#,
            r#"{"error":{"message":42},"choices":[{"message":{"content":"R"}}]}"#,
            r#"{"error":[]}"#,
        ] {
            let err = classify(body).unwrap_err();
            assert!(err.is_responder(), "{body}");
            assert_eq!(
                err.to_string(),
                "The responder reported an unspecified error",
                "{body}"
            );
        }
    }

    #[test]
    fn non_object_first_choice_is_format_error() {
        let err = classify(r#"{"choices":[42,{"message":{"content":"R"}}]}"#).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn whitespace_reply_is_accepted() {
        let reply = classify(r#"{"choices":[{"message":{"content":" "}}]}"#).unwrap();
        assert_eq!(reply.content, " ");
    }
}
