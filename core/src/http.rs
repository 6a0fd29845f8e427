//! HTTP request and response types exchanged with a `Transport`.
//!
//! # Design
//! Requests and responses are plain data. The base client describes each
//! call as an `HttpRequest` with a path relative to the transport's bound
//! base URL; the transport resolves it, performs the I/O and hands back an
//! `HttpResponse` without interpreting the status. Tests substitute an
//! in-process transport that records requests and fabricates responses.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use rand::distr::Alphanumeric;
use rand::Rng;
use serde_json::Value;

use crate::error::{Error, Result};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file attached to a multipart POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl FilePart {
    pub fn new(field: &str, file_name: &str, content: impl Into<Vec<u8>>) -> Self {
        Self {
            field: field.to_string(),
            file_name: file_name.to_string(),
            content_type: "application/octet-stream".to_string(),
            content: content.into(),
        }
    }

    /// Read `path` from disk, using its file name for the part.
    pub fn from_path(field: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| field.to_string());
        Ok(Self::new(field, &file_name, content))
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }
}

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    },
}

impl RequestBody {
    /// Build the body for a POST the way form posts usually behave: any
    /// attached file makes the body multipart (form fields included), then
    /// non-empty form fields are url-encoded, and JSON is used only when
    /// neither is present. Empty form and file lists count as absent.
    pub fn from_parts(
        json: Option<Value>,
        form: Option<Vec<(String, String)>>,
        files: Option<Vec<FilePart>>,
    ) -> Option<Self> {
        let form = form.filter(|fields| !fields.is_empty());
        let files = files.filter(|files| !files.is_empty());
        match (json, form, files) {
            (_, form, Some(files)) => Some(RequestBody::Multipart {
                fields: form.unwrap_or_default(),
                files,
            }),
            (_, Some(form), None) => Some(RequestBody::Form(form)),
            (Some(json), None, None) => Some(RequestBody::Json(json)),
            (None, None, None) => None,
        }
    }

    /// Encode into a `(content-type, bytes)` pair ready for the wire.
    pub fn encode(&self) -> Result<(String, Vec<u8>)> {
        match self {
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(value).map_err(Error::Serialization)?;
                Ok(("application/json".to_string(), bytes))
            }
            RequestBody::Form(fields) => Ok((
                "application/x-www-form-urlencoded".to_string(),
                encode_form(fields).into_bytes(),
            )),
            RequestBody::Multipart { fields, files } => {
                let boundary = multipart_boundary();
                let bytes = encode_multipart(&boundary, fields, files);
                Ok((format!("multipart/form-data; boundary={boundary}"), bytes))
            }
        }
    }

    /// Text form of the payload for step reporting.
    pub fn describe(&self) -> String {
        match self {
            RequestBody::Json(value) => value.to_string(),
            RequestBody::Form(fields) => encode_form(fields),
            RequestBody::Multipart { fields, files } => {
                let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
                format!("{} (files: {})", encode_form(fields), names.join(", "))
            }
        }
    }
}

/// An HTTP request described as plain data. `path` is relative to the
/// transport's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Path plus encoded query string, as reported in steps and logs.
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, encode_form(&self.query))
        }
    }
}

/// An HTTP response described as plain data. `body` holds the raw bytes
/// exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// First header matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body as JSON, for callers asserting on arbitrary responses.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).map_err(Error::Deserialization)
    }
}

fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn multipart_boundary() -> String {
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    format!("----fakebank{token}")
}

/// Escape a name or file name for a `Content-Disposition` parameter the way
/// browsers do for `multipart/form-data`: `"`, CR and LF are percent-encoded
/// so the value cannot close its quotes or start a new header line.
fn escape_disposition(value: &str) -> Cow<'_, str> {
    if !value.contains(['"', '\r', '\n']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 6);
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("%22"),
            '\r' => escaped.push_str("%0D"),
            '\n' => escaped.push_str("%0A"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn encode_multipart(boundary: &str, fields: &[(String, String)], files: &[FilePart]) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, value) in fields {
        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        out.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                escape_disposition(name)
            )
            .as_bytes(),
        );
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    for file in files {
        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        out.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                escape_disposition(&file.field),
                escape_disposition(&file.file_name)
            )
            .as_bytes(),
        );
        let content_type = file.content_type.replace(['\r', '\n'], "");
        out.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        out.extend_from_slice(&file.content);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn files_win_over_form_and_json() {
        let body = RequestBody::from_parts(
            Some(json!({"a": 1})),
            Some(vec![("k".to_string(), "v".to_string())]),
            Some(vec![FilePart::new("f", "a.txt", "x")]),
        )
        .unwrap();
        assert!(matches!(body, RequestBody::Multipart { ref fields, ref files } if fields.len() == 1 && files.len() == 1));
    }

    #[test]
    fn form_wins_over_json() {
        let form = vec![("k".to_string(), "v".to_string())];
        let body = RequestBody::from_parts(Some(json!({"a": 1})), Some(form.clone()), None);
        assert_eq!(body, Some(RequestBody::Form(form)));
    }

    #[test]
    fn json_is_sent_when_form_and_files_are_empty() {
        let body = RequestBody::from_parts(Some(json!({"a": 1})), Some(Vec::new()), Some(Vec::new()));
        assert_eq!(body, Some(RequestBody::Json(json!({"a": 1}))));
    }

    #[test]
    fn files_switch_form_to_multipart() {
        let body = RequestBody::from_parts(
            None,
            Some(vec![("k".to_string(), "v".to_string())]),
            Some(vec![FilePart::new("f", "a.txt", "x")]),
        )
        .unwrap();
        assert!(matches!(body, RequestBody::Multipart { ref fields, ref files } if fields.len() == 1 && files.len() == 1));
    }

    #[test]
    fn empty_parts_produce_no_body() {
        assert_eq!(RequestBody::from_parts(None, None, Some(Vec::new())), None);
        assert_eq!(RequestBody::from_parts(None, Some(Vec::new()), None), None);
    }

    #[test]
    fn form_is_url_encoded() {
        let body = RequestBody::Form(vec![
            ("category".to_string(), "food & drinks".to_string()),
            ("page".to_string(), "2".to_string()),
        ]);
        let (content_type, bytes) = body.encode().unwrap();
        assert_eq!(content_type, "application/x-www-form-urlencoded");
        assert_eq!(String::from_utf8(bytes).unwrap(), "category=food%20%26%20drinks&page=2");
    }

    #[test]
    fn multipart_contains_every_part_and_closing_boundary() {
        let body = RequestBody::Multipart {
            fields: vec![("note".to_string(), "hello".to_string())],
            files: vec![FilePart::new("upload", "statement.csv", "a,b").with_content_type("text/csv")],
        };
        let (content_type, bytes) = body.encode().unwrap();
        let boundary = content_type.strip_prefix("multipart/form-data; boundary=").unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("name=\"note\"\r\n\r\nhello\r\n"));
        assert!(text.contains("filename=\"statement.csv\""));
        assert!(text.contains("Content-Type: text/csv\r\n\r\na,b\r\n"));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn multipart_names_cannot_break_out_of_their_quotes() {
        let body = RequestBody::Multipart {
            fields: vec![("no\"te".to_string(), "hello".to_string())],
            files: vec![FilePart::new("upload", "a.csv\"; name=\"evil", "a,b")
                .with_content_type("text/csv\r\nX-Injected: 1")],
        };
        let (_, bytes) = body.encode().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("name=\"no%22te\""));
        assert!(text.contains("filename=\"a.csv%22; name=%22evil\""));
        assert!(!text.contains("name=\"evil\""));
        assert!(!text.contains("\r\nX-Injected"));
    }

    #[test]
    fn disposition_escaping_leaves_plain_names_alone() {
        assert!(matches!(escape_disposition("statement.csv"), Cow::Borrowed("statement.csv")));
        assert_eq!(escape_disposition("a\r\nb"), "a%0D%0Ab");
    }

    #[test]
    fn target_appends_query_string() {
        let mut req = HttpRequest::new(HttpMethod::Get, "/fakebank/accounts");
        assert_eq!(req.target(), "/fakebank/accounts");
        req.query.push(("category".to_string(), "taxi".to_string()));
        assert_eq!(req.target(), "/fakebank/accounts?category=taxi");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Vec::new(),
        };
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert!(response.is_success());
    }

    #[test]
    fn non_utf8_body_is_kept_as_bytes() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: vec![b'o', b'k', 0xff],
        };
        assert_eq!(response.body, [b'o', b'k', 0xff]);
        assert_eq!(response.text(), "ok\u{fffd}");
        assert!(response.json().is_err());
    }
}
