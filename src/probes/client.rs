use anyhow::{Context, Result};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// Outcome of a single probe request against a provider endpoint.
///
/// Transport-level failures surface as `Err` from the client methods; a
/// response that arrived, whatever its status, is `Ok`. Probes normalize
/// both into success/failure before folding them into a metric.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// HTTP status code
    pub status: u16,
    /// Wall-clock time for the full request/response cycle, in milliseconds
    pub elapsed_ms: f64,
    /// Response body
    pub body: Vec<u8>,
    /// Selected response headers (name, value), lowercase names
    pub headers: Vec<(String, String)>,
}

impl ProbeResponse {
    /// A 2xx status counts as a successful probe operation
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a response header by (case-insensitive) name
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP client for exercising provider benchmark endpoints.
///
/// Every call carries its own timeout; there is no global deadline around
/// a benchmark, so a hung remote only costs the per-call budget.
#[derive(Clone)]
pub struct ProbeClient {
    client: Client,
}

impl ProbeClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("storage-auditor/0.1")
            .build()
            .context("Failed to create probe HTTP client")?;
        Ok(Self { client })
    }

    /// Validate a provider endpoint and join a probe path onto it
    pub fn probe_url(endpoint: &str, path: &str) -> Result<Url> {
        let base = Url::parse(endpoint).context("Invalid provider endpoint URL")?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(anyhow::anyhow!(
                "Provider endpoint must be http or https, got {}: {}",
                base.scheme(),
                endpoint
            ));
        }
        if base.host_str().is_none() {
            return Err(anyhow::anyhow!(
                "Provider endpoint must have a host: {}",
                endpoint
            ));
        }
        base.join(path.trim_start_matches('/'))
            .context("Invalid probe path")
    }

    async fn capture(
        response: reqwest::Response,
        started: Instant,
        read_body: bool,
    ) -> Result<ProbeResponse> {
        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let body = if read_body {
            response
                .bytes()
                .await
                .context("Failed to read response body")?
                .to_vec()
        } else {
            Vec::new()
        };

        Ok(ProbeResponse {
            status,
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
            body,
            headers,
        })
    }

    /// POST a payload to a probe path, timing the full round-trip
    pub async fn post_bytes(
        &self,
        endpoint: &str,
        path: &str,
        body: Vec<u8>,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<ProbeResponse> {
        let url = Self::probe_url(endpoint, path)?;
        let started = Instant::now();

        let mut request = self
            .client
            .post(url)
            .timeout(timeout)
            .header("Content-Type", "application/octet-stream")
            .body(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.context("Probe POST failed")?;
        Self::capture(response, started, false).await
    }

    /// GET a probe path, timing the full round-trip including body download
    pub async fn get_bytes(
        &self,
        endpoint: &str,
        path: &str,
        timeout: Duration,
    ) -> Result<ProbeResponse> {
        let url = Self::probe_url(endpoint, path)?;
        let started = Instant::now();

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .context("Probe GET failed")?;
        Self::capture(response, started, true).await
    }

    /// HEAD a probe path, timing the round-trip
    pub async fn head(
        &self,
        endpoint: &str,
        path: &str,
        timeout: Duration,
    ) -> Result<ProbeResponse> {
        let url = Self::probe_url(endpoint, path)?;
        let started = Instant::now();

        let response = self
            .client
            .head(url)
            .timeout(timeout)
            .send()
            .await
            .context("Probe HEAD failed")?;
        Self::capture(response, started, false).await
    }

    /// Lightweight existence check for a benchmark sub-endpoint.
    ///
    /// 200/204/405 all count as "exists": a 405 means the path is routed
    /// but the method differs, which is good enough for coverage checks.
    pub async fn endpoint_exists(&self, endpoint: &str, path: &str, timeout: Duration) -> bool {
        match self.head(endpoint, path, timeout).await {
            Ok(response) => matches!(response.status, 200 | 204 | 405),
            Err(e) => {
                debug!(path = %path, error = %e, "Endpoint existence check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_url_join() {
        let url = ProbeClient::probe_url("http://provider.example.com:9000", "/benchmark/write")
            .unwrap();
        assert_eq!(url.as_str(), "http://provider.example.com:9000/benchmark/write");
    }

    #[test]
    fn test_probe_url_rejects_bad_scheme() {
        assert!(ProbeClient::probe_url("ftp://provider.example.com", "/health").is_err());
        assert!(ProbeClient::probe_url("not a url", "/health").is_err());
    }

    #[test]
    fn test_response_success_and_headers() {
        let response = ProbeResponse {
            status: 204,
            elapsed_ms: 1.0,
            body: Vec::new(),
            headers: vec![("x-replication-factor".to_string(), "3".to_string())],
        };
        assert!(response.is_success());
        assert_eq!(response.header("X-Replication-Factor"), Some("3"));
        assert_eq!(response.header("missing"), None);
    }
}
