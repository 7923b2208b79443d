// ABOUTME: Thin wrapper over the HTTP collaborator: GET/POST-form with default headers.
// ABOUTME: Decodes bodies charset-aware and maps transport failures onto ScrapeError.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::ScrapeError;

/// Result of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as UTF-8 text, honoring the charset hint from the
    /// Content-Type header and falling back to detection.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }

    /// Parse the body as a JSON tree. `None` when the body is not JSON —
    /// a structural miss, not a transport failure.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Decode body bytes to a String using the charset from the Content-Type
/// header or, failing that, detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract the charset value from a Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        if let Some(charset) = part.trim().strip_prefix("charset=") {
            return Some(charset.trim_matches('"').trim_matches('\'').to_string());
        }
    }
    None
}

/// The HTTP collaborator. Owns a `reqwest::Client` plus the default headers
/// every request to a source carries (Referer and friends).
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: reqwest::Client,
    headers: HashMap<String, String>,
}

impl Fetcher {
    pub fn new(http: reqwest::Client, headers: HashMap<String, String>) -> Self {
        Self { http, headers }
    }

    /// GET a URL and return the raw body.
    pub async fn get(
        &self,
        url: &str,
        extra_headers: &HashMap<String, String>,
    ) -> Result<FetchResult, ScrapeError> {
        let mut request = self.http.get(url);
        for (key, value) in self.headers.iter().chain(extra_headers.iter()) {
            request = request.header(key, value);
        }
        self.send(url, request).await
    }

    /// POST form fields to a URL and return the raw body.
    pub async fn post_form(
        &self,
        url: &str,
        fields: &[(String, String)],
        extra_headers: &HashMap<String, String>,
    ) -> Result<FetchResult, ScrapeError> {
        let mut request = self.http.post(url).form(fields);
        for (key, value) in self.headers.iter().chain(extra_headers.iter()) {
            request = request.header(key, value);
        }
        self.send(url, request).await
    }

    async fn send(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<FetchResult, ScrapeError> {
        if url::Url::parse(url).is_err() {
            return Err(ScrapeError::invalid_url(
                url,
                "Fetch",
                Some(anyhow::anyhow!("malformed URL")),
            ));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ScrapeError::timeout(url, "Fetch", Some(anyhow::anyhow!("{}", e)))
            } else {
                ScrapeError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
            }
        })?;

        let status = response.status();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if !status.is_success() {
            return Err(ScrapeError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("unexpected status {}", status)),
            ));
        }

        let body = response.bytes().await.map_err(|e| {
            ScrapeError::fetch(url, "Fetch", Some(anyhow::anyhow!("body read failed: {}", e)))
        })?;

        Ok(FetchResult {
            status: status.as_u16(),
            final_url,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_extraction() {
        assert_eq!(
            extract_charset("text/html; charset=utf-8"),
            Some("utf-8".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"Windows-1256\""),
            Some("windows-1256".to_string())
        );
        assert_eq!(extract_charset("application/json"), None);
    }

    #[test]
    fn decode_body_respects_declared_charset() {
        // "مرحبا" in Windows-1256.
        let encoded: &[u8] = &[0xE3, 0xD1, 0xCD, 0xC8, 0xC7];
        let decoded = decode_body(encoded, Some("text/html; charset=windows-1256"));
        assert_eq!(decoded, "مرحبا");
    }

    #[test]
    fn decode_body_detects_utf8_without_hint() {
        let decoded = decode_body("مرحبا".as_bytes(), None);
        assert_eq!(decoded, "مرحبا");
    }
}
