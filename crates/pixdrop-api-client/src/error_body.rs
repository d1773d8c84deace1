//! Turning an error response body from the storage provider into a message.
//!
//! The provider may answer with XML (`<Error><Code/><Message/></Error>`) or
//! JSON (`{"code": .., "message": ..}`). Parsers are tried in order and the
//! first one that recognises the body wins; otherwise a truncated excerpt of
//! the raw text is used.

use pixdrop_core::truncate_string;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::StatusCode;

/// Maximum number of characters of raw body echoed back to the user.
pub const EXCERPT_CHARS: usize = 200;

type ErrorParser = fn(&str) -> Option<String>;

const PARSERS: [ErrorParser; 2] = [xml_error_message, json_error_message];

/// Build a human-readable message for a failed response.
pub fn describe_error_body(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("HTTP {}", status.as_u16());
    }

    PARSERS
        .iter()
        .find_map(|parse| parse(body))
        .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), truncate_string(body, EXCERPT_CHARS)))
}

#[derive(Clone, Copy)]
enum XmlField {
    Code,
    Message,
}

/// Extract `code` / `message` elements (case-insensitive) from an XML body.
pub fn xml_error_message(body: &str) -> Option<String> {
    if !body.trim_start().starts_with('<') {
        return None;
    }

    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut current: Option<XmlField> = None;
    let mut code: Option<String> = None;
    let mut message: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = start.local_name();
                current = if name.as_ref().eq_ignore_ascii_case(b"code") {
                    Some(XmlField::Code)
                } else if name.as_ref().eq_ignore_ascii_case(b"message") {
                    Some(XmlField::Message)
                } else {
                    None
                };
            }
            Ok(Event::Text(text)) => {
                if let Some(field) = current {
                    let value = text.unescape().ok()?.trim().to_string();
                    if !value.is_empty() {
                        match field {
                            XmlField::Code => code = Some(value),
                            XmlField::Message => message = Some(value),
                        }
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return None,
        }
    }

    match (code, message) {
        (Some(code), Some(message)) => Some(format!("{}: {}", code, message)),
        (None, Some(message)) => Some(message),
        (Some(code), None) => Some(code),
        (None, None) => None,
    }
}

/// Extract the `error` (preferred) or `message` string field of a JSON body.
pub fn json_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}
