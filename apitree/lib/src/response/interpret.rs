use crate::error::{ParseFailure, ResponseParseError};
use crate::media::MediaType;

use super::{ApiResponse, RawResponse, ResponseBody};

/// Interprets a raw response by its `Content-Type`.
///
/// JSON and YAML bodies are parsed; anything else is returned as text, or as
/// bytes when it is not UTF-8. An empty body is always empty text.
///
/// ## Errors
///
/// Returns [`ResponseParseError`], carrying the raw body, when a structured
/// content type's body does not parse.
///
/// ## Examples
///
/// ```
/// use apitree::response::{interpret, RawResponse, ResponseBody};
/// use serde_json::json;
///
/// let raw = RawResponse::new(
///     200,
///     vec![("Content-Type".to_string(), "application/json".to_string())],
///     r#"{"method":"get"}"#,
/// );
/// let response = interpret(raw).unwrap();
/// assert_eq!(response.header("content-type"), Some("application/json"));
/// assert_eq!(response.body(), &ResponseBody::Json(json!({ "method": "get" })));
/// ```
pub fn interpret(raw: RawResponse) -> Result<ApiResponse, ResponseParseError> {
    let RawResponse {
        status,
        headers,
        body,
    } = raw;

    let headers: Vec<(String, String)> = headers
        .into_iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value))
        .collect();
    let content_type = headers
        .iter()
        .find(|(name, _)| name == "content-type")
        .map(|(_, value)| value.clone());

    let body = if body.is_empty() {
        ResponseBody::Text(String::new())
    } else {
        let media = content_type.as_deref().map(MediaType::parse);
        match media {
            Some(media @ (MediaType::Json | MediaType::Yaml)) => {
                let text = String::from_utf8_lossy(&body).into_owned();
                let parsed = match media {
                    MediaType::Json => serde_json::from_str(&text)
                        .map(ResponseBody::Json)
                        .map_err(ParseFailure::from),
                    _ => serde_yaml::from_str(&text)
                        .map(ResponseBody::Yaml)
                        .map_err(ParseFailure::from),
                };
                match parsed {
                    Ok(body) => body,
                    Err(failure) => {
                        return Err(ResponseParseError::new(
                            status,
                            headers,
                            media.as_str(),
                            text,
                            failure,
                        ));
                    }
                }
            }
            _ => match String::from_utf8(body.to_vec()) {
                Ok(text) => ResponseBody::Text(text),
                Err(err) => ResponseBody::Binary(err.into_bytes()),
            },
        }
    };

    Ok(ApiResponse {
        status,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(status: u16, content_type: &str, body: &'static [u8]) -> RawResponse {
        RawResponse::new(
            status,
            vec![
                ("Content-Type".to_string(), content_type.to_string()),
                ("X-Request-Id".to_string(), "abc".to_string()),
            ],
            body,
        )
    }

    #[test]
    fn text_passes_through_unchanged() {
        let response = interpret(raw(200, "text/html", b"Example Response Text")).unwrap();
        assert_eq!(response.text(), Some("Example Response Text"));
        assert_eq!(response.json(), None);
        assert!(response.is_success());
    }

    #[test]
    fn header_names_are_lowercased() {
        let response = interpret(raw(200, "text/plain", b"ok")).unwrap();
        let names: Vec<&str> = response.headers().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["content-type", "x-request-id"]);
        assert_eq!(response.header("X-REQUEST-ID"), Some("abc"));
    }

    #[test]
    fn json_variants_parse() {
        let response = interpret(raw(
            201,
            "application/problem+json; charset=utf-8",
            br#"{"title":"created"}"#,
        ))
        .unwrap();
        assert_eq!(response.json(), Some(&json!({ "title": "created" })));
        assert_eq!(response.status(), 201);
    }

    #[test]
    fn yaml_parses() {
        let response = interpret(raw(200, "application/x-yaml", b"name: test\ncount: 2\n")).unwrap();
        assert_eq!(
            response.body(),
            &ResponseBody::Yaml(json!({ "name": "test", "count": 2 }))
        );
    }

    #[test]
    fn error_statuses_are_results() {
        let response = interpret(raw(404, "application/json", br#"{"error":"missing"}"#)).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.json(), Some(&json!({ "error": "missing" })));
    }

    #[test]
    fn empty_structured_body_is_empty_text() {
        let response = interpret(raw(204, "application/json", b"")).unwrap();
        assert_eq!(response.text(), Some(""));
    }

    #[test]
    fn malformed_json_keeps_raw_body() {
        let err = interpret(raw(200, "application/json", b"{not json")).unwrap_err();
        assert_eq!(err.raw_body(), "{not json");
        assert_eq!(err.status(), 200);
        assert_eq!(err.media_type(), "application/json");
        assert!(matches!(err.failure(), ParseFailure::Json(_)));
        assert_eq!(err.headers()[0].0, "content-type");
    }

    #[test]
    fn missing_content_type_is_text() {
        let response = interpret(RawResponse::new(200, Vec::new(), "plain")).unwrap();
        assert_eq!(response.text(), Some("plain"));
    }

    #[test]
    fn invalid_utf8_is_binary() {
        let response = interpret(raw(200, "application/octet-stream", &[0xff, 0xfe, 0x00])).unwrap();
        assert_eq!(response.body(), &ResponseBody::Binary(vec![0xff, 0xfe, 0x00]));
    }
}
