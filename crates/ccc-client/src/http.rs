use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};

use crate::error::{ClientError, Result};

/// Blocking HTTP client sending a bearer token and JSON content type on
/// every request.
pub(crate) fn build_client(auth_token: &str, timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("ccc-client/", env!("CARGO_PKG_VERSION"))),
    );
    let bearer = HeaderValue::from_str(&format!("Bearer {auth_token}"))
        .map_err(|e| ClientError::Network(format!("invalid auth token: {e}")))?;
    headers.insert(AUTHORIZATION, bearer);
    Ok(Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}

/// Appends each of `segments` to `base` as one percent-encoded path segment.
///
/// A segment may hold `/`, `?`, `#` or spaces without changing which
/// resource the URL names.
pub(crate) fn join_segments(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| ClientError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| ClientError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Sends `request`, turning non-success statuses into [`ClientError::Status`].
pub(crate) fn send(method: &'static str, url: &str, request: RequestBuilder) -> Result<Response> {
    let response = request.send()?;
    if response.status().is_success() {
        return Ok(response);
    }
    Err(status_error(method, url, response))
}

pub(crate) fn status_error(method: &'static str, url: &str, response: Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    ClientError::Status {
        method,
        url: url.to_string(),
        status,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_percent_encoded() {
        let url = join_segments(
            "http://localhost:9200",
            &["p-sample", "sample", "p-sample-a/b c"],
        )
        .unwrap();
        assert_eq!(url.path(), "/p-sample/sample/p-sample-a%2Fb%20c");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn base_path_is_kept() {
        let url = join_segments("http://dts.local:9510/api/v1/dts/file", &["id?x#y"]).unwrap();
        assert_eq!(url.as_str(), "http://dts.local:9510/api/v1/dts/file/id%3Fx%23y");
    }

    #[test]
    fn unparsable_base_is_rejected() {
        let err = join_segments("not a url", &["k"]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }
}
