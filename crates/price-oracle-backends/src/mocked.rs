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

use std::collections::VecDeque;

use oracle_relayer_utils::{Error, Result};
use parking_lot::Mutex;

use crate::PriceQuote;

/// A Price Backend that plays back scripted outcomes, one per fetch.
///
/// `Ok` entries are quotes, `Err` entries are failure reasons. Once the script is exhausted
/// every fetch fails.
#[derive(Debug, Default)]
pub struct ScriptedPriceBackend {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    fetches: Mutex<usize>,
}

impl ScriptedPriceBackend {
    /// Creates a backend playing back `script`.
    pub fn new<I, Q, E>(script: I) -> Self
    where
        I: IntoIterator<Item = std::result::Result<Q, E>>,
        Q: Into<String>,
        E: Into<String>,
    {
        let script = script
            .into_iter()
            .map(|r| r.map(Into::into).map_err(Into::into))
            .collect();
        Self {
            script: Mutex::new(script),
            fetches: Mutex::new(0),
        }
    }

    /// A backend whose every fetch fails.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Fails `attempt - 1` times, then returns `quote` once.
    pub fn succeeding_on_attempt(attempt: usize, quote: &str) -> Self {
        let failures = (1..attempt).map(|i| Err(format!("scripted failure #{i}")));
        Self::new(failures.chain(std::iter::once(Ok(quote.to_owned()))))
    }

    /// Queues more outcomes at the end of the script.
    pub fn push(&self, outcome: std::result::Result<&str, &str>) {
        self.script
            .lock()
            .push_back(outcome.map(Into::into).map_err(Into::into));
    }

    /// How many times [`PriceBackend::fetch`](crate::PriceBackend::fetch) was called.
    pub fn fetches(&self) -> usize {
        *self.fetches.lock()
    }
}

#[async_trait::async_trait]
impl super::PriceBackend for ScriptedPriceBackend {
    async fn fetch(&self) -> Result<PriceQuote> {
        *self.fetches.lock() += 1;
        let outcome = self.script.lock().pop_front();
        match outcome {
            Some(Ok(quote)) => quote.parse(),
            Some(Err(reason)) => Err(Error::source_unavailable(reason)),
            None => Err(Error::source_unavailable("script exhausted")),
        }
    }
}
