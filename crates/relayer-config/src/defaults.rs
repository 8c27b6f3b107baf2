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

use std::path::PathBuf;

/// Milliseconds to sleep between two processing cycles.
pub const fn sleep_interval() -> u64 {
    2_000
}
/// Requests resolved per processing cycle.
pub const fn chunk_size() -> usize {
    3
}
/// Attempts per request before the zero price fallback is written.
pub const fn max_retries() -> usize {
    5
}
/// Decimal places kept when turning a quote into an on-chain integer.
pub const fn price_scale() -> u32 {
    10
}
/// The largest accepted price scale, `10^78` overflows a `uint256`.
pub const MAX_PRICE_SCALE: u32 = 77;
/// Gas ceiling for every write transaction.
pub const fn gas_limit() -> u64 {
    3_000_000
}
/// How often contract logs are polled, in milliseconds.
pub const fn polling_interval() -> u64 {
    1_000
}
/// The minimum number of oracle responses the contract waits for.
pub const fn threshold() -> u64 {
    1
}
/// The relayer registers itself as an oracle by default.
pub const fn register_oracle() -> bool {
    true
}
/// The ticker endpoint of the price source.
pub fn price_source_url() -> url::Url {
    url::Url::parse("https://api.binance.com/api/v3/ticker/price")
        .expect("valid default url")
}
/// The trading pair asked from the price source.
pub fn price_symbol() -> String {
    String::from("ETHUSDT")
}
/// Price source request timeout, in milliseconds.
pub const fn price_source_timeout() -> u64 {
    5_000
}
/// Where Truffle drops the oracle build artifact.
pub fn oracle_artifact() -> PathBuf {
    PathBuf::from("./oracle/build/contracts/EthPriceOracle.json")
}
