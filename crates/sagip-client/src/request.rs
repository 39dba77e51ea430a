//! API request builder.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::RequestError;

/// HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Convert to the `http` crate's method.
    pub fn to_http(self) -> http::Method {
        match self {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Patch => http::Method::PATCH,
            Method::Delete => http::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound API request.
///
/// `url` is either a path relative to the client's base URL or an absolute
/// URL. The client resolves it before the request reaches the transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    /// Sent without a bearer token and never refreshed on 401.
    pub(crate) anonymous: bool,
    /// Set once the request has been resent after a token refresh.
    pub(crate) retried: bool,
}

impl ApiRequest {
    /// Create a new request.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: HashMap::new(),
            body: None,
            anonymous: false,
            retried: false,
        }
    }

    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    /// Create a PATCH request.
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::Patch, url)
    }

    /// Create a DELETE request.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Add a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a query parameter if present.
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, RequestError> {
        let json = serde_json::to_vec(value)?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(json);
        Ok(self)
    }

    /// Set the request body as a URL-encoded form.
    ///
    /// `value` must serialize to a flat object. Null fields are left out.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, RequestError> {
        let Value::Object(fields) = serde_json::to_value(value)? else {
            return Err(RequestError::Json("form body must be an object".to_string()));
        };

        let mut pairs = Vec::with_capacity(fields.len());
        for (key, value) in &fields {
            let value = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(RequestError::Json(format!("form field '{}' is not a scalar", key)))
                }
                other => other.to_string(),
            };
            pairs.push(format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&value)
            ));
        }

        self.headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        self.body = Some(pairs.join("&").into_bytes());
        Ok(self)
    }

    /// Set the bearer token, replacing any previous one.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Set the Accept header.
    pub fn accept(self, content_type: impl Into<String>) -> Self {
        self.header("Accept", content_type)
    }

    /// Get a header value (case-insensitive).
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Bearer token carried by this request.
    pub fn bearer_token(&self) -> Option<&str> {
        self.header_value("Authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    /// Send without credentials.
    ///
    /// Used for sign-in and registration, where a 401 means bad
    /// credentials rather than an expired session.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// Whether the request goes out without credentials.
    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Whether the request was already resent after a refresh.
    pub fn is_retry(&self) -> bool {
        self.retried
    }

    /// Resolve a relative URL against a base URL.
    pub(crate) fn resolve(mut self, base_url: &str) -> Result<Self, RequestError> {
        self.url = join_url(base_url, &self.url)?;
        Ok(self)
    }
}

/// Join a path onto a base URL.
///
/// Absolute URLs are returned as is.
pub fn join_url(base_url: &str, path: &str) -> Result<String, RequestError> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(path.to_string());
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(RequestError::InvalidUrl(base_url.to_string()));
    }
    Ok(format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://127.0.0.1:8000/api/", "auth/login/").unwrap(),
            "http://127.0.0.1:8000/api/auth/login/"
        );
        assert_eq!(
            join_url("http://127.0.0.1:8000/api", "/user/profile/").unwrap(),
            "http://127.0.0.1:8000/api/user/profile/"
        );
        assert_eq!(
            join_url("http://a/api/", "https://b/other").unwrap(),
            "https://b/other"
        );
        assert!(join_url("ftp://nope", "x").is_err());
    }

    #[test]
    fn test_bearer_replaces_previous() {
        let req = ApiRequest::get("x").bearer_auth("one").bearer_auth("two");
        assert_eq!(req.bearer_token(), Some("two"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let req = ApiRequest::post("auth/login/")
            .json(&serde_json::json!({"email": "a@b.c"}))
            .unwrap();
        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(br#"{"email":"a@b.c"}"#.as_slice()));
    }

    #[test]
    fn test_form_body() {
        let req = ApiRequest::post("hazards/")
            .form(&serde_json::json!({
                "title": "Flooded road",
                "latitude": 13.41,
                "municipality": 3,
                "description": null
            }))
            .unwrap();
        assert_eq!(
            req.header_value("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(
            String::from_utf8(req.body.unwrap()).unwrap(),
            "latitude=13.41&municipality=3&title=Flooded%20road"
        );
    }

    #[test]
    fn test_form_rejects_nested_values() {
        assert!(ApiRequest::post("x").form(&serde_json::json!({"a": [1]})).is_err());
        assert!(ApiRequest::post("x").form(&serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_query_opt() {
        let req = ApiRequest::get("logs")
            .query("center", 3)
            .query_opt("page", None::<u32>);
        assert_eq!(req.query, vec![("center".to_string(), "3".to_string())]);
    }

    #[test]
    fn test_method_to_http() {
        assert_eq!(Method::Patch.to_http(), http::Method::PATCH);
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }
}
