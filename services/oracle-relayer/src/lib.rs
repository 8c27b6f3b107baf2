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

#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # Oracle Relayer Crate 🕸️
//!
//! A crate used to answer on-chain ETH price requests.
//!
//! ## Overview
//!
//! A caller contract asks the `EthPriceOracle` contract for the latest ETH price, and the
//! oracle contract emits a `GetLatestEthPriceEvent` carrying a request id. The relayer
//! listens for these events, fetches the price from an external ticker and writes it back
//! with `setLatestEthPrice`, which the oracle contract forwards to the caller.
//!
//! Two tasks run side by side for the whole lifetime of the relayer, and share nothing but
//! the request queue:
//!
//!   1. The event listener, which queues every new request.
//!   2. The [`RelayDriver`](service::RelayDriver), which wakes up on a fixed interval and
//!      answers a chunk of the queued requests.
//!
//! A request whose price could not be fetched or written after all retries is answered
//! with a zero price, so that consumers can tell a failed resolution apart.

/// The long-running services of the relayer.
pub mod service;

pub use oracle_relayer_utils::{Error, Result};
