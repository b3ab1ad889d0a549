//! Client for fetching market prices for watched coins from a
//! CoinGecko-compatible API.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::Error;

/// The default base URL for the price API.
pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";

/// How long to wait for the price API before giving up.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A market quote for a single coin.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Quote {
    /// The coin's ticker symbol, e.g. "btc".
    pub symbol: String,
    /// The coin's full name, e.g. "Bitcoin".
    pub name: String,
    /// The current price in EUR. Missing for coins with no market data.
    pub current_price: Option<f64>,
    /// The price change over the last 24 hours, as a percentage.
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

/// Client for fetching market prices for watched coins.
#[derive(Clone)]
pub struct PriceClient {
    base_url: String,
    client: reqwest::Client,
}

impl PriceClient {
    /// Create a new price client for the API at `base_url`.
    ///
    /// You can use [DEFAULT_PRICE_API_URL] for the default API.
    ///
    /// # Errors
    ///
    /// Returns an [Error::PriceApi] if `base_url` is not an HTTP(S) URL or the
    /// HTTP client cannot be created.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::PriceApi(format!(
                "invalid base URL: must start with http:// or https://, got '{base_url}'"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::PriceApi(format!("could not create HTTP client: {e}")))?;

        Ok(Self { base_url, client })
    }

    /// Fetch market quotes for the coins in `watchlist`.
    ///
    /// The quotes are returned in market cap order, filtered down to the
    /// watched symbols. Symbols are matched case-insensitively. Watched coins
    /// outside the top coins by market cap are silently omitted.
    ///
    /// # Errors
    ///
    /// Returns an [Error::PriceApi] if the request fails, times out, or the
    /// response cannot be parsed.
    pub async fn market_quotes(&self, watchlist: &[String]) -> Result<Vec<Quote>, Error> {
        if watchlist.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/coins/markets?vs_currency=eur&order=market_cap_desc&per_page=250&page=1&sparkline=false",
            self.base_url
        );

        debug!("Fetching market quotes from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::PriceApi(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::PriceApi(format!(
                "API returned error status {}",
                response.status()
            )));
        }

        let quotes: Vec<Quote> = response
            .json()
            .await
            .map_err(|e| Error::PriceApi(format!("could not parse response: {e}")))?;

        Ok(quotes
            .into_iter()
            .filter(|quote| {
                watchlist
                    .iter()
                    .any(|symbol| symbol.eq_ignore_ascii_case(&quote.symbol))
            })
            .collect())
    }
}
