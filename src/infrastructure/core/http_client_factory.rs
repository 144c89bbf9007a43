use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use tracing::warn;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a new HTTP client with retry middleware
    ///
    /// Transient failures (connect errors, timeouts, 5xx, 429) are retried
    /// with exponential backoff up to `max_retries` times.
    pub fn create_client(timeout: Duration, max_retries: u32) -> ClientWithMiddleware {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

        let client = Client::builder()
            .pool_max_idle_per_host(2)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .unwrap_or_else(|e| {
                warn!("HttpClientFactory: falling back to default client: {}", e);
                Client::new()
            });

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// Appends the query parameters to `base_url`, percent-encoding them.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> Result<String, url::ParseError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return Ok(url::Url::parse(base_url)?.into());
    }

    let url = url::Url::parse_with_params(
        base_url,
        params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())),
    )?;
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_with_query_encodes_values() {
        let url = build_url_with_query(
            "https://data.alpaca.markets/v2/stocks/bars",
            &[("symbols", "BRK.B"), ("start", "2020-02-01T00:00:00+00:00")],
        )
        .unwrap();

        assert_eq!(
            url,
            "https://data.alpaca.markets/v2/stocks/bars?symbols=BRK.B&start=2020-02-01T00%3A00%3A00%2B00%3A00"
        );
    }

    #[test]
    fn test_build_url_without_params() {
        let params: [(&str, &str); 0] = [];
        let url = build_url_with_query("https://example.com/bars", &params).unwrap();
        assert_eq!(url, "https://example.com/bars");
    }

    #[test]
    fn test_build_url_rejects_relative_base() {
        assert!(build_url_with_query("not a url", &[("a", "b")]).is_err());
    }
}
