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

//! Price Oracle Backends
//!
//! A Price Oracle Backend is a service that provides the current price of a trading pair,
//! as the decimal string quoted by the source. The relayer converts that quote into the
//! fixed-point integer stored on-chain, see [`PriceQuote::to_fixed_point`].
//!
//! Backends do not cache and do not retry, a failed fetch is reported as
//! [`Error::SourceUnavailable`](oracle_relayer_utils::Error::SourceUnavailable)
//! and the caller decides what to do next.
//!
//! As of now, the following backends are supported:
//! - A price ticker over HTTP, [Binance](https://binance-docs.github.io/apidocs/spot/en/#symbol-price-ticker) style.
//! - A static backend that always returns the same quote.
//! - A scripted backend that plays back a list of outcomes, used in tests.
//!
//! ## Usage
//! ```rust,no_run
//! use oracle_price_oracle_backends::{PriceBackend, TickerPriceBackend};
//! # async fn run() -> oracle_relayer_utils::Result<()> {
//! let backend = TickerPriceBackend::binance("ETHUSDT")?;
//! let quote = backend.fetch().await?;
//! let on_chain_price = quote.to_fixed_point(10)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features flags
//! - `ticker` - enables the HTTP ticker backend

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use oracle_relayer_utils::Result;

/// A Dummy Price Backend
mod dummy;
/// A scripted Price Backend, for tests
mod mocked;
/// Decimal quote handling
mod quote;
/// HTTP ticker Backend
#[cfg(feature = "ticker")]
mod ticker;

pub use dummy::StaticPriceBackend;
pub use mocked::ScriptedPriceBackend;
pub use quote::{PriceQuote, MAX_PRICE_SCALE};
#[cfg(feature = "ticker")]
pub use ticker::{TickerPriceBackend, BINANCE_TICKER_URL};

/// A trait for a price backend
#[async_trait::async_trait]
pub trait PriceBackend: Send + Sync {
    /// Fetches a fresh quote of the configured trading pair.
    async fn fetch(&self) -> Result<PriceQuote>;
}

#[async_trait::async_trait]
impl<B> PriceBackend for Arc<B>
where
    B: PriceBackend + ?Sized,
{
    async fn fetch(&self) -> Result<PriceQuote> {
        (**self).fetch().await
    }
}

#[async_trait::async_trait]
impl<B> PriceBackend for Box<B>
where
    B: PriceBackend + ?Sized,
{
    async fn fetch(&self) -> Result<PriceQuote> {
        (**self).fetch().await
    }
}
