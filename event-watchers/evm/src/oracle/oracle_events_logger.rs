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

use oracle_event_watcher_traits::EventHandler;
use oracle_relayer_contract::EthPriceOracleEvents;

/// Logs the oracle events that need no action from the relayer.
#[derive(Copy, Clone, Debug, Default)]
pub struct OracleEventsLogger;

#[async_trait::async_trait]
impl EventHandler for OracleEventsLogger {
    type Events = EthPriceOracleEvents;

    fn can_handle_event(&self, event: &Self::Events) -> bool {
        !matches!(event, EthPriceOracleEvents::GetLatestEthPriceEventFilter(_))
    }

    async fn handle_event(
        &self,
        event: Self::Events,
    ) -> oracle_relayer_utils::Result<()> {
        use EthPriceOracleEvents::*;
        match event {
            SetLatestEthPriceEventFilter(data) => tracing::info!(
                eth_price = %data.eth_price,
                caller = ?data.caller_address,
                "Price set",
            ),
            AddOracleEventFilter(data) => {
                tracing::info!(oracle = ?data.oracle_address, "Oracle added")
            }
            RemoveOracleEventFilter(data) => {
                tracing::info!(oracle = ?data.oracle_address, "Oracle removed")
            }
            SetThresholdEventFilter(data) => {
                tracing::info!(threshold = %data.threshold, "Threshold set")
            }
            GetLatestEthPriceEventFilter(_) => {}
        }
        Ok(())
    }
}
