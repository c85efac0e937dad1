use axum::extract::FromRequestParts;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Client details captured onto a new session. Empty when unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMetadata {
    pub user_agent: String,
    pub client_ip: String,
}

impl ClientMetadata {
    /// Read the user agent and the originating client address.
    ///
    /// The address is the first hop of `X-Forwarded-For`, falling back to
    /// `X-Real-IP`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_agent = header_str(headers, USER_AGENT.as_str())
            .unwrap_or_default()
            .to_string();

        let client_ip = header_str(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| header_str(headers, "x-real-ip").map(str::trim))
            .unwrap_or_default()
            .to_string();

        Self {
            user_agent,
            client_ip,
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl<S: Send + Sync> FromRequestParts<S> for ClientMetadata {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_forwarded_first_hop_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.1"));

        let client = ClientMetadata::from_headers(&headers);
        assert_eq!(client.user_agent, "curl/8.0");
        assert_eq!(client.client_ip, "203.0.113.9");
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));

        let client = ClientMetadata::from_headers(&headers);
        assert_eq!(client.client_ip, "198.51.100.4");
        assert_eq!(client.user_agent, "");
    }

    #[test]
    fn test_absent_headers_are_empty() {
        assert_eq!(
            ClientMetadata::from_headers(&HeaderMap::new()),
            ClientMetadata::default()
        );
    }
}
