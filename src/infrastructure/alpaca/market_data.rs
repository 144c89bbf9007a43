use super::common::AlpacaBarsPage;
use crate::config::MarketDataEnvConfig;
use crate::domain::errors::FetchError;
use crate::domain::ports::PriceBarFetcher;
use crate::domain::types::PriceBar;
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, build_url_with_query};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use std::time::Duration;
use tracing::{debug, error, info, warn};

// ===== Daily Bars Service (REST) =====

pub struct AlpacaPriceBarFetcher {
    client: ClientWithMiddleware,
    api_key: String,
    api_secret: String,
    data_base_url: String,
    feed: String,
}

impl AlpacaPriceBarFetcher {
    pub fn builder() -> AlpacaPriceBarFetcherBuilder {
        AlpacaPriceBarFetcherBuilder::default()
    }

    pub fn from_config(config: &MarketDataEnvConfig) -> Self {
        Self::builder()
            .api_key(config.api_key.clone())
            .api_secret(config.secret_key.clone())
            .data_base_url(config.data_url.clone())
            .feed(config.feed.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .max_retries(config.max_retries)
            .build()
    }

    async fn fetch_page(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        page_token: Option<&str>,
    ) -> Result<AlpacaBarsPage, FetchError> {
        let url = format!("{}/v2/stocks/bars", self.data_base_url.trim_end_matches('/'));

        let mut query_params = vec![
            ("symbols", symbol.to_string()),
            ("timeframe", "1Day".to_string()),
            ("start", start.and_time(NaiveTime::MIN).and_utc().to_rfc3339()),
            (
                "end",
                end.and_hms_opt(23, 59, 59)
                    .unwrap_or_else(|| end.and_time(NaiveTime::MIN))
                    .and_utc()
                    .to_rfc3339(),
            ),
            ("limit", "10000".to_string()),
            ("feed", self.feed.clone()),
        ];
        if let Some(token) = page_token {
            query_params.push(("page_token", token.to_string()));
        }

        let url_with_query =
            build_url_with_query(&url, &query_params).map_err(|e| FetchError::Connection {
                reason: format!("invalid market data URL {}: {}", url, e),
            })?;

        debug!(
            "AlpacaPriceBarFetcher: Fetching daily bars from {} for {} ({} to {})",
            url, symbol, start, end
        );

        let response = self
            .client
            .get(&url_with_query)
            .header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.api_secret)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FetchError::Decode {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            error!(
                "AlpacaPriceBarFetcher: API error {} for {}: {}",
                status, symbol, body
            );
            return Err(classify_status(symbol, status, body));
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Maps a non-success HTTP status to a fetch error.
///
/// Alpaca answers an unknown symbol with 404 or 422.
fn classify_status(symbol: &str, status: StatusCode, body: String) -> FetchError {
    match status {
        StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => FetchError::NoData {
            symbol: symbol.to_string(),
        },
        _ => FetchError::Api {
            status: status.as_u16(),
            body,
        },
    }
}

fn classify_transport_error(err: reqwest_middleware::Error) -> FetchError {
    match err {
        reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => FetchError::Timeout {
            reason: e.to_string(),
        },
        other => FetchError::Connection {
            reason: other.to_string(),
        },
    }
}

#[async_trait]
impl PriceBarFetcher for AlpacaPriceBarFetcher {
    async fn fetch_price_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, FetchError> {
        let mut all_bars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .fetch_page(symbol, start, end, page_token.as_deref())
                .await?;

            if let Some(bars) = page.bars.and_then(|mut by_symbol| by_symbol.remove(symbol)) {
                for bar in bars {
                    match bar.clone().into_price_bar() {
                        Some(price_bar) if price_bar.date >= start && price_bar.date <= end => {
                            all_bars.push(price_bar)
                        }
                        Some(_) => {}
                        None => warn!(
                            "AlpacaPriceBarFetcher: skipping bar with invalid timestamp {:?} for {}",
                            bar.timestamp, symbol
                        ),
                    }
                }
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        if all_bars.is_empty() {
            error!("No information for stock '{}'", symbol);
            return Err(FetchError::NoData {
                symbol: symbol.to_string(),
            });
        }

        info!(
            "AlpacaPriceBarFetcher: Fetched {} daily bars for {}",
            all_bars.len(),
            symbol
        );
        Ok(all_bars)
    }
}

#[derive(Default)]
pub struct AlpacaPriceBarFetcherBuilder {
    api_key: Option<String>,
    api_secret: Option<String>,
    data_base_url: Option<String>,
    feed: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
}

impl AlpacaPriceBarFetcherBuilder {
    pub fn api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn api_secret(mut self, api_secret: String) -> Self {
        self.api_secret = Some(api_secret);
        self
    }

    pub fn data_base_url(mut self, data_base_url: String) -> Self {
        self.data_base_url = Some(data_base_url);
        self
    }

    pub fn feed(mut self, feed: String) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn build(self) -> AlpacaPriceBarFetcher {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(30));
        let max_retries = self.max_retries.unwrap_or(3);

        AlpacaPriceBarFetcher {
            client: HttpClientFactory::create_client(timeout, max_retries),
            api_key: self.api_key.unwrap_or_default(),
            api_secret: self.api_secret.unwrap_or_default(),
            data_base_url: self
                .data_base_url
                .unwrap_or_else(|| "https://data.alpaca.markets".to_string()),
            feed: self.feed.unwrap_or_else(|| "iex".to_string()),
        }
    }
}
