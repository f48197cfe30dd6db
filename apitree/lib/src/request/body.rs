//! Request body serialization by negotiated media type.

use serde_json::Value;
use url::form_urlencoded;

use crate::error::ComposeError;
use crate::media::MediaType;
use crate::template::render_scalar;

/// Serializes `body` for `media`.
///
/// Strings are always sent as-is. With no media type at all, structures are
/// sent as JSON and the returned flag asks the caller to add the
/// `Content-Type` header. Any other media type takes scalars only.
pub(crate) fn serialize(
    body: &Value,
    media: Option<&MediaType>,
) -> Result<(String, bool), ComposeError> {
    if let Value::String(text) = body {
        return Ok((text.clone(), false));
    }

    let text = match media {
        Some(MediaType::Json) => serde_json::to_string(body)?,
        Some(MediaType::Yaml) => serde_yaml::to_string(body)?,
        Some(MediaType::UrlEncoded) => encode_form(body)?,
        Some(MediaType::Other(essence)) => match body {
            Value::Array(_) | Value::Object(_) => {
                return Err(ComposeError::UnsupportedBody {
                    media_type: essence.clone(),
                });
            }
            scalar => render_scalar("body", scalar)?.unwrap_or_default(),
        },
        None => match body {
            Value::Array(_) | Value::Object(_) => {
                return Ok((serde_json::to_string(body)?, true));
            }
            scalar => render_scalar("body", scalar)?.unwrap_or_default(),
        },
    };
    Ok((text, false))
}

fn encode_form(body: &Value) -> Result<String, ComposeError> {
    let Value::Object(map) = body else {
        return Ok(render_scalar("body", body)?.unwrap_or_default());
    };

    let mut form = form_urlencoded::Serializer::new(String::new());
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = render_scalar(key, item)? {
                        form.append_pair(key, &text);
                    }
                }
            }
            other => {
                if let Some(text) = render_scalar(key, other)? {
                    form.append_pair(key, &text);
                }
            }
        }
    }
    Ok(form.finish())
}
