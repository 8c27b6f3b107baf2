// Copyright 2022 Webb Technologies Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Price Backend implementation for an HTTP symbol price ticker.

use std::time::Duration;

use oracle_relayer_utils::{Error, Result};
use serde::Deserialize;

use crate::PriceQuote;

/// The public Binance spot price ticker.
pub const BINANCE_TICKER_URL: &str =
    "https://api.binance.com/api/v3/ticker/price";

/// The body returned by the ticker, `{"symbol":"ETHUSDT","price":"1234.56000000"}`.
#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

/// A backend for fetching the price of one trading pair from a ticker endpoint.
#[derive(Debug, Clone)]
pub struct TickerPriceBackend {
    client: reqwest::Client,
    url: url::Url,
    symbol: String,
}

impl TickerPriceBackend {
    /// Creates a backend asking `url` for the price of `symbol`.
    ///
    /// Requests that take longer than `timeout` fail.
    pub fn new(
        url: url::Url,
        symbol: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url,
            symbol: symbol.into(),
        })
    }

    /// A backend of the public Binance spot ticker.
    pub fn binance(symbol: impl Into<String>) -> Result<Self> {
        let url = url::Url::parse(BINANCE_TICKER_URL)?;
        Self::new(url, symbol, Duration::from_secs(5))
    }

    /// The url that is requested, including the symbol.
    pub fn request_url(&self) -> url::Url {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("symbol", &self.symbol);
        url
    }
}

/// Extracts the quote out of a ticker response body.
fn parse_ticker_body(body: &str) -> Result<PriceQuote> {
    let ticker: TickerPrice = serde_json::from_str(body).map_err(|e| {
        Error::source_unavailable(format!("unexpected ticker response: {e}"))
    })?;
    ticker.price.parse()
}

#[async_trait::async_trait]
impl super::PriceBackend for TickerPriceBackend {
    #[tracing::instrument(skip_all, fields(symbol = %self.symbol))]
    async fn fetch(&self) -> Result<PriceQuote> {
        let response = self
            .client
            .get(self.request_url())
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        let quote = parse_ticker_body(&body)?;
        tracing::trace!(%quote, "fetched price quote");
        Ok(quote)
    }
}
