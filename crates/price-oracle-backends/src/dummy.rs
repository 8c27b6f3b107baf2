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

use oracle_relayer_utils::Result;

use crate::PriceQuote;

/// A Static Price Oracle Backend
///
/// This backend is useful for dry runs and testing purposes, it always returns the same
/// quote that is configured initially while creating the backend.
#[derive(Debug, Clone)]
pub struct StaticPriceBackend {
    /// The quote that is returned by the backend
    quote: PriceQuote,
}

impl StaticPriceBackend {
    /// Creates a new static price backend
    #[must_use]
    pub fn new(quote: PriceQuote) -> Self {
        Self { quote }
    }
}

#[async_trait::async_trait]
impl super::PriceBackend for StaticPriceBackend {
    async fn fetch(&self) -> Result<PriceQuote> {
        Ok(self.quote.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::PriceBackend;

    use super::*;

    #[tokio::test]
    async fn it_works() {
        let backend = StaticPriceBackend::new("1234.56".parse().unwrap());
        let quote = backend.fetch().await.unwrap();
        assert_eq!(quote.as_str(), "1234.56");
        // and again, the same.
        assert_eq!(backend.fetch().await.unwrap(), quote);
    }
}
