//! Loading descriptions from files and URLs.

use apitree_define::ApiDescription;
use tracing::debug;

use super::ApiClient;
use crate::error::{ApiError, SpecError};
use crate::transport::HttpTransport;

/// Creates a client from the description at `location`.
///
/// `location` is an `http://` or `https://` URL, fetched with the client's
/// own transport, or a filesystem path. JSON and YAML are both accepted.
///
/// ## Errors
///
/// Returns [`ApiError::Spec`] when the description cannot be read, decoded
/// or built, and [`ApiError::Transport`] when the HTTP client cannot be
/// constructed.
pub async fn create_client(name: &str, location: &str) -> Result<ApiClient, ApiError> {
    create_client_with(name, location, HttpTransport::new()?).await
}

/// Like [`create_client`], over a preconfigured transport.
///
/// ## Errors
///
/// Returns [`ApiError::Spec`] when the description cannot be read, decoded
/// or built.
pub async fn create_client_with(
    name: &str,
    location: &str,
    transport: HttpTransport,
) -> Result<ApiClient, ApiError> {
    let text = read_description(&transport, location).await?;
    let description = ApiDescription::parse(&text).map_err(SpecError::from)?;
    debug!(api = name, location, resources = description.resources.len(), "description loaded");

    Ok(ApiClient::from_description(name, &description, transport)?)
}

async fn read_description(transport: &HttpTransport, location: &str) -> Result<String, SpecError> {
    let unreadable = |reason: String| SpecError::Unreadable {
        location: location.to_string(),
        reason,
    };

    if location.starts_with("http://") || location.starts_with("https://") {
        let response = transport
            .client()
            .get(location)
            .send()
            .await
            .map_err(|e| unreadable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(unreadable(format!("HTTP {status}")));
        }
        response.text().await.map_err(|e| unreadable(e.to_string()))
    } else {
        tokio::fs::read_to_string(location)
            .await
            .map_err(|e| unreadable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn loads_from_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "baseUri: http://example.com\nresources:\n  - relativeUri: /users\n    methods:\n      - method: get\n",
            ))
            .mount(&server)
            .await;

        let client = create_client("remote", &format!("{}/api.yaml", server.uri()))
            .await
            .unwrap();
        assert_eq!(client.name(), "remote");
        assert!(client.resource("users").is_some());
    }

    #[tokio::test]
    async fn missing_remote_description_is_unreadable() {
        let server = MockServer::start().await;
        let location = format!("{}/missing.yaml", server.uri());
        let err = create_client("remote", &location).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Spec(SpecError::Unreadable { reason, .. }) if reason.contains("404")
        ));
    }

    #[tokio::test]
    async fn missing_file_is_unreadable() {
        let err = create_client("local", "/definitely/not/here.yaml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Spec(SpecError::Unreadable { location, .. }) if location == "/definitely/not/here.yaml"
        ));
    }

    #[tokio::test]
    async fn undecodable_description_fails() {
        let dir = std::env::temp_dir().join(format!("apitree-loader-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let file = dir.join("broken.yaml");
        tokio::fs::write(&file, "resources: [unterminated").await.unwrap();

        let err = create_client("broken", file.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Spec(SpecError::Decode(_))));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
