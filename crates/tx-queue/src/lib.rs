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

#![warn(missing_docs)]
//! # Oracle Relayer Tx Queue 🕸️
//!
//! Drains the request queue in bounded chunks and answers every request on-chain.
//!
//! Each drained request gets up to `max_retries` attempts. An attempt fetches a fresh quote,
//! converts it to the on-chain fixed-point integer and writes it back. When every attempt
//! failed a zero price is written instead, which is how consumers of the oracle learn that
//! the request could not be resolved.

mod batch_processor;

pub use batch_processor::*;
