//! HTTP calls to the three external services.
//!
//! | Call | Request | Success response |
//! |------|---------|------------------|
//! | presign | `POST <presign_url>` `{filename, content_type}` | `{url}` |
//! | blob transfer | `PUT <signed url>` raw bytes, `Content-Type: application/pdf` | any 2xx |
//! | query | `POST <query_url>` `{query, model, top_k}` | JSON object, see [`crate::answer`] |
//!
//! Any non-2xx status is an error carrying the status and the response body.
//! There are no retries and no client-side timeouts; a request runs until the
//! transport gives up.

use serde::Serialize;

use crate::error::AskError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Number of passages the query service is asked to retrieve.
pub const TOP_K: u32 = 5;

#[derive(Debug, Serialize)]
struct PresignRequest<'a> {
    filename: &'a str,
    content_type: &'a str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
    pub model: String,
    pub top_k: u32,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            model: model.into(),
            top_k: TOP_K,
        }
    }
}

/// Thin wrapper over one shared `reqwest::Client`.
#[derive(Clone, Default)]
pub struct ServiceClient {
    http: reqwest::Client,
}

impl ServiceClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Ask the presign service for an upload URL for `filename`.
    pub async fn request_upload_url(
        &self,
        presign_url: &str,
        filename: &str,
    ) -> Result<String, AskError> {
        let body = PresignRequest {
            filename,
            content_type: PDF_CONTENT_TYPE,
        };

        let response = self.http.post(presign_url).json(&body).send().await?;
        let response = check_status(response, "Presign").await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AskError::Decode(format!("Presign response is not JSON: {}", e)))?;

        json.get("url")
            .and_then(|u| u.as_str())
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AskError::Decode("Presign response has no url".to_string()))
    }

    /// Transfer `bytes` to a signed URL.
    pub async fn put_blob(&self, signed_url: &str, bytes: Vec<u8>) -> Result<(), AskError> {
        let response = self
            .http
            .put(signed_url)
            .header(reqwest::header::CONTENT_TYPE, PDF_CONTENT_TYPE)
            .body(bytes)
            .send()
            .await?;
        check_status(response, "Upload").await?;
        Ok(())
    }

    /// Send one question to the query service and return the raw JSON body.
    pub async fn query(
        &self,
        query_url: &str,
        request: &QueryRequest,
    ) -> Result<serde_json::Value, AskError> {
        let response = self.http.post(query_url).json(request).send().await?;
        let response = check_status(response, "Query").await?;

        response
            .json()
            .await
            .map_err(|e| AskError::Decode(format!("Query response is not valid JSON: {}", e)))
    }
}

async fn check_status(
    response: reqwest::Response,
    context: &'static str,
) -> Result<reqwest::Response, AskError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AskError::Status {
        context,
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_request_shape() {
        let req = QueryRequest::new("What is covered?", "m1");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"query": "What is covered?", "model": "m1", "top_k": 5})
        );
    }

    #[test]
    fn presign_request_shape() {
        let req = PresignRequest {
            filename: "a.pdf",
            content_type: PDF_CONTENT_TYPE,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"filename": "a.pdf", "content_type": "application/pdf"})
        );
    }
}
