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

use backoff::backoff::Backoff;
use ethers::types::{Address, H256, U256};
use oracle_price_oracle_backends::PriceBackend;
use oracle_relayer_contract::{ContractGateway, OracleCall};
use oracle_relayer_store::{PendingRequest, RequestQueue};
use oracle_relayer_utils::{probe, retry::ConstantWithMaxRetryCount, Result};
use serde::Serialize;
use typed_builder::TypedBuilder;

/// How a request got resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum RequestOutcome {
    /// The real price was written back.
    Succeeded {
        /// Attempts it took, the last one being the successful one.
        attempts: usize,
        /// The write-back transaction.
        tx_hash: H256,
    },
    /// Every attempt failed and a zero price was written back.
    FallbackWritten {
        /// Attempts made before falling back.
        attempts: usize,
        /// The fallback transaction.
        tx_hash: H256,
    },
}

/// What one [`BatchProcessor::run_cycle`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    /// Requests taken off the queue.
    pub drained: usize,
    /// Requests answered with the real price.
    pub succeeded: usize,
    /// Requests answered with the zero price.
    pub fallbacks: usize,
    /// Requests whose fallback write failed too, they are gone.
    pub dropped: usize,
}

/// Answers queued price requests, a chunk at a time.
#[derive(TypedBuilder)]
pub struct BatchProcessor<P, G> {
    /// The queue fed by the event listener.
    queue: RequestQueue,
    /// Where prices come from.
    price_backend: P,
    /// Where prices go to.
    gateway: G,
    /// The account writes are sent from.
    from: Address,
    /// Requests drained per cycle.
    #[builder(default = 3)]
    chunk_size: usize,
    /// Attempts per request before falling back to the zero price.
    #[builder(default = 5)]
    max_retries: usize,
    /// Decimal places of the on-chain fixed-point price.
    #[builder(default = 10)]
    price_scale: u32,
}

impl<P, G> BatchProcessor<P, G>
where
    P: PriceBackend,
    G: ContractGateway,
{
    /// Drains up to `chunk_size` requests and resolves them one after the other, in queue
    /// order.
    ///
    /// Requests queued while the cycle runs wait for the next one.
    #[tracing::instrument(skip_all)]
    pub async fn run_cycle(&self) -> CycleSummary {
        let drained = self.queue.dequeue_up_to(self.chunk_size);
        let mut summary = CycleSummary {
            drained: drained.len(),
            ..Default::default()
        };
        if drained.is_empty() {
            tracing::trace!("No pending requests");
            return summary;
        }
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Cycle,
            drained = drained.len(),
            remaining = self.queue.len(),
        );
        for request in drained {
            match self.process_request(request).await {
                Ok(RequestOutcome::Succeeded { .. }) => summary.succeeded += 1,
                Ok(RequestOutcome::FallbackWritten { .. }) => {
                    summary.fallbacks += 1
                }
                Err(e) => {
                    tracing::error!(
                        %request,
                        error = %e,
                        "Failed to write the fallback price, dropping the request",
                    );
                    summary.dropped += 1;
                }
            }
        }
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Cycle,
            finished = true,
            succeeded = summary.succeeded,
            fallbacks = summary.fallbacks,
            dropped = summary.dropped,
        );
        summary
    }

    /// Resolves one request.
    ///
    /// Attempts are retried right away until `max_retries` of them failed, then the zero
    /// price is written. Only a failure of that last write is returned as an error, and the
    /// request is not queued again.
    #[tracing::instrument(
        skip_all,
        fields(id = %request.id, caller = ?request.caller_address),
    )]
    pub async fn process_request(
        &self,
        request: PendingRequest,
    ) -> Result<RequestOutcome> {
        let mut backoff = ConstantWithMaxRetryCount::immediate(self.max_retries);
        let mut attempts = 0;
        loop {
            attempts += 1;
            let e = match self.attempt(request).await {
                Ok(tx_hash) => {
                    tracing::info!(attempts, ?tx_hash, "Price written back");
                    return Ok(RequestOutcome::Succeeded { attempts, tx_hash });
                }
                Err(e) => e,
            };
            let Some(wait) = backoff.next_backoff() else {
                tracing::warn!(
                    attempts,
                    error = %e,
                    "All attempts failed, writing the fallback price",
                );
                break;
            };
            tracing::warn!(attempt = attempts, error = %e, "Attempt failed, retrying");
            tracing::event!(
                target: probe::TARGET,
                tracing::Level::DEBUG,
                kind = %probe::Kind::Retry,
                id = %request.id,
                attempt = attempts,
            );
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }
        let tx_hash = self.write_price(request, U256::zero()).await?;
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Fallback,
            id = %request.id,
            caller = ?request.caller_address,
            ?tx_hash,
        );
        Ok(RequestOutcome::FallbackWritten { attempts, tx_hash })
    }

    async fn attempt(&self, request: PendingRequest) -> Result<H256> {
        let quote = self.price_backend.fetch().await?;
        let price = quote.to_fixed_point(self.price_scale)?;
        tracing::debug!(%quote, %price, "Fetched price");
        self.write_price(request, price).await
    }

    async fn write_price(
        &self,
        request: PendingRequest,
        price: U256,
    ) -> Result<H256> {
        let call = OracleCall::SetLatestEthPrice {
            price,
            caller: request.caller_address,
            id: request.id,
        };
        self.gateway.send_write(call, self.from).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use oracle_price_oracle_backends::ScriptedPriceBackend;
    use oracle_relayer_contract::mocked::RecordingGateway;
    use oracle_relayer_utils::Error;
    use tracing_test::traced_test;

    use super::*;

    const SET_PRICE: &str = "setLatestEthPrice";

    fn relayer() -> Address {
        Address::from_low_u64_be(0x0AC1E)
    }

    fn caller(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn quotes(n: usize, quote: &str) -> ScriptedPriceBackend {
        ScriptedPriceBackend::new(
            std::iter::repeat(quote).take(n).map(Ok::<_, &str>),
        )
    }

    fn processor(
        queue: &RequestQueue,
        prices: &Arc<ScriptedPriceBackend>,
        gateway: &Arc<RecordingGateway>,
    ) -> BatchProcessor<Arc<ScriptedPriceBackend>, Arc<RecordingGateway>> {
        BatchProcessor::builder()
            .queue(queue.clone())
            .price_backend(prices.clone())
            .gateway(gateway.clone())
            .from(relayer())
            .build()
    }

    fn set_price(price: u64, caller: Address, id: u64) -> (OracleCall, Address) {
        let call = OracleCall::SetLatestEthPrice {
            price: price.into(),
            caller,
            id: id.into(),
        };
        (call, relayer())
    }

    #[tokio::test]
    async fn a_cycle_drains_one_chunk_in_queue_order() {
        let queue = RequestQueue::new();
        for id in 1..=4 {
            queue.enqueue(PendingRequest::new(id, caller(0xA0 + id)));
        }
        let prices = Arc::new(quotes(10, "1"));
        let gateway = Arc::new(RecordingGateway::default());
        let summary = processor(&queue, &prices, &gateway).run_cycle().await;

        assert_eq!(
            summary,
            CycleSummary {
                drained: 3,
                succeeded: 3,
                ..Default::default()
            }
        );
        let ids = gateway
            .accepted()
            .into_iter()
            .map(|(call, _)| match call {
                OracleCall::SetLatestEthPrice { id, .. } => id.as_u64(),
                other => panic!("unexpected call {other:?}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(
            queue.dequeue_up_to(10),
            vec![PendingRequest::new(4u64, caller(0xA4))]
        );
    }

    /// Queues a new request every time a write goes out, like the listener would while a
    /// cycle is busy.
    struct EnqueueingGateway {
        queue: RequestQueue,
        inner: RecordingGateway,
    }

    #[async_trait::async_trait]
    impl ContractGateway for EnqueueingGateway {
        async fn send_write(&self, call: OracleCall, from: Address) -> Result<H256> {
            let n = self.inner.attempts().len() as u64;
            self.queue.enqueue(PendingRequest::new(100 + n, caller(0xF0)));
            self.inner.send_write(call, from).await
        }

        async fn accounts(&self) -> Result<Vec<Address>> {
            self.inner.accounts().await
        }
    }

    #[tokio::test]
    async fn requests_queued_mid_cycle_wait_for_the_next_cycle() {
        let queue = RequestQueue::new();
        queue.enqueue(PendingRequest::new(1u64, caller(0xA1)));
        queue.enqueue(PendingRequest::new(2u64, caller(0xA2)));
        let gateway = EnqueueingGateway {
            queue: queue.clone(),
            inner: RecordingGateway::default(),
        };
        let processor = BatchProcessor::builder()
            .queue(queue.clone())
            .price_backend(quotes(10, "1"))
            .gateway(gateway)
            .from(relayer())
            .build();

        let summary = processor.run_cycle().await;
        assert_eq!(
            summary,
            CycleSummary {
                drained: 2,
                succeeded: 2,
                ..Default::default()
            }
        );
        assert_eq!(
            queue.dequeue_up_to(10),
            vec![
                PendingRequest::new(100u64, caller(0xF0)),
                PendingRequest::new(101u64, caller(0xF0)),
            ]
        );
    }

    #[tokio::test]
    async fn an_empty_queue_does_nothing() {
        let queue = RequestQueue::new();
        let prices = Arc::new(quotes(1, "1"));
        let gateway = Arc::new(RecordingGateway::default());
        let summary = processor(&queue, &prices, &gateway).run_cycle().await;
        assert_eq!(summary, CycleSummary::default());
        assert_eq!(prices.fetches(), 0);
        assert!(gateway.attempts().is_empty());
    }

    #[tokio::test]
    async fn writes_the_converted_price() {
        let queue = RequestQueue::new();
        let prices = Arc::new(quotes(1, "1234.56"));
        let gateway = Arc::new(RecordingGateway::default());
        let outcome = processor(&queue, &prices, &gateway)
            .process_request(PendingRequest::new(1u64, caller(0xB)))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            RequestOutcome::Succeeded { attempts: 1, .. }
        ));
        assert_eq!(
            gateway.accepted(),
            vec![set_price(12_345_600_000_000, caller(0xB), 1)]
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn exhausted_retries_write_exactly_one_zero_price() {
        let queue = RequestQueue::new();
        let prices = Arc::new(ScriptedPriceBackend::unavailable());
        let gateway = Arc::new(RecordingGateway::default());
        let outcome = processor(&queue, &prices, &gateway)
            .process_request(PendingRequest::new(7u64, caller(0xABC)))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            RequestOutcome::FallbackWritten { attempts: 5, .. }
        ));
        assert_eq!(prices.fetches(), 5);
        assert_eq!(gateway.attempts(), vec![set_price(0, caller(0xABC), 7)]);
        assert!(logs_contain("All attempts failed"));
    }

    #[tokio::test]
    async fn success_on_attempt_k_fetches_k_times_and_writes_once() {
        for k in 1..=5 {
            let queue = RequestQueue::new();
            let prices =
                Arc::new(ScriptedPriceBackend::succeeding_on_attempt(k, "2000.5"));
            let gateway = Arc::new(RecordingGateway::default());
            let outcome = processor(&queue, &prices, &gateway)
                .process_request(PendingRequest::new(9u64, caller(0xC)))
                .await
                .unwrap();
            assert!(
                matches!(outcome, RequestOutcome::Succeeded { attempts, .. } if attempts == k)
            );
            assert_eq!(prices.fetches(), k);
            assert_eq!(
                gateway.accepted(),
                vec![set_price(20_005_000_000_000, caller(0xC), 9)]
            );
        }
    }

    #[tokio::test]
    async fn malformed_quotes_count_as_failed_attempts() {
        let queue = RequestQueue::new();
        let prices = Arc::new(ScriptedPriceBackend::new([
            Ok::<_, &str>("-12"),
            Ok("1e3"),
            Ok("3.5"),
        ]));
        let gateway = Arc::new(RecordingGateway::default());
        let outcome = processor(&queue, &prices, &gateway)
            .process_request(PendingRequest::new(2u64, caller(0xD)))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            RequestOutcome::Succeeded { attempts: 3, .. }
        ));
        assert_eq!(
            gateway.accepted(),
            vec![set_price(35_000_000_000, caller(0xD), 2)]
        );
    }

    #[tokio::test]
    async fn failed_writes_are_retried() {
        let queue = RequestQueue::new();
        let prices = Arc::new(quotes(5, "10"));
        let gateway = Arc::new(RecordingGateway::default());
        gateway.fail_next(SET_PRICE, 2);
        let outcome = processor(&queue, &prices, &gateway)
            .process_request(PendingRequest::new(3u64, caller(0xE)))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            RequestOutcome::Succeeded { attempts: 3, .. }
        ));
        assert_eq!(prices.fetches(), 3);
        assert_eq!(gateway.attempts().len(), 3);
        assert_eq!(
            gateway.accepted(),
            vec![set_price(100_000_000_000, caller(0xE), 3)]
        );
    }

    #[tokio::test]
    async fn a_failed_fallback_drops_the_request() {
        let queue = RequestQueue::new();
        queue.enqueue(PendingRequest::new(5u64, caller(0xF)));
        let prices = Arc::new(quotes(5, "10"));
        let gateway = Arc::new(RecordingGateway::default());
        // five failed attempts plus the fallback.
        gateway.fail_next(SET_PRICE, 6);
        let processor = processor(&queue, &prices, &gateway);
        let summary = processor.run_cycle().await;
        assert_eq!(
            summary,
            CycleSummary {
                drained: 1,
                dropped: 1,
                ..Default::default()
            }
        );
        assert!(gateway.accepted().is_empty());
        assert_eq!(gateway.attempts().len(), 6);
        assert!(queue.is_empty());

        prices.push(Ok("10"));
        let outcome = processor
            .process_request(PendingRequest::new(6u64, caller(0xF)))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            RequestOutcome::Succeeded { attempts: 1, .. }
        ));
    }

    #[tokio::test]
    async fn fallback_failure_is_a_transaction_failure() {
        let queue = RequestQueue::new();
        let prices = Arc::new(ScriptedPriceBackend::unavailable());
        let gateway = Arc::new(RecordingGateway::default());
        gateway.fail_next(SET_PRICE, 1);
        let err = processor(&queue, &prices, &gateway)
            .process_request(PendingRequest::new(8u64, caller(0x1)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TransactionFailed {
                method: "setLatestEthPrice",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn max_retries_and_chunk_size_are_configurable() {
        let queue = RequestQueue::new();
        for id in 1..=3 {
            queue.enqueue(PendingRequest::new(id, caller(id)));
        }
        let prices = Arc::new(ScriptedPriceBackend::unavailable());
        let gateway = Arc::new(RecordingGateway::default());
        let processor = BatchProcessor::builder()
            .queue(queue.clone())
            .price_backend(prices.clone())
            .gateway(gateway.clone())
            .from(relayer())
            .chunk_size(2)
            .max_retries(2)
            .build();
        let summary = processor.run_cycle().await;
        assert_eq!(summary.fallbacks, 2);
        assert_eq!(prices.fetches(), 4);
        assert_eq!(queue.len(), 1);
    }
}
