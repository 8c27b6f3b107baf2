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

//! # Relayer Service Module 🕸️
//!
//! A module for starting the long-running tasks of the relayer.
//!
//! ## Overview
//!
//! Services are tasks which the relayer constantly runs throughout its lifetime.
//! The event listener keeps the request queue filled, the [`RelayDriver`] drains it.

use std::sync::Arc;
use std::time::Duration;

use ethers::signers::Signer;
use ethers::types::{Address, U256};
use oracle_event_watcher_traits::{EventHandlerFor, EventWatcher};
use oracle_ew_evm::{
    OracleContractWatcher, OracleContractWrapper, OracleEventsLogger,
    RequestCreatedHandler,
};
use oracle_price_oracle_backends::PriceBackend;
use oracle_relayer_config::SetupConfig;
use oracle_relayer_context::{RelayerContext, SignerClient};
use oracle_relayer_contract::{
    ContractGateway, EthersContractGateway, OracleCall,
};
use oracle_relayer_store::RequestQueue;
use oracle_relayer_tx_queue::{BatchProcessor, CycleSummary};
use oracle_relayer_utils::{probe, Error};
use tokio::task::JoinHandle;
use typed_builder::TypedBuilder;

/// The gateway used in production, writing through the relayer's wallet.
pub type OracleGateway = Arc<EthersContractGateway<SignerClient>>;
/// The driver used in production.
pub type OracleRelayDriver =
    RelayDriver<Arc<dyn PriceBackend>, OracleGateway>;

/// Owns the polling loop: runs the one-time setup, then a processing cycle on every tick.
#[derive(TypedBuilder)]
pub struct RelayDriver<P, G> {
    /// Answers the queued requests.
    processor: BatchProcessor<P, G>,
    /// Used for the setup calls.
    gateway: G,
    /// The relayer's own account.
    from: Address,
    /// What to do once at startup.
    #[builder(default)]
    setup: SetupConfig,
    /// The pause between two cycles.
    #[builder(default = Duration::from_millis(2000))]
    sleep_interval: Duration,
}

impl<P, G> RelayDriver<P, G>
where
    P: PriceBackend,
    G: ContractGateway,
{
    /// Registers the relayer as an oracle and sets the response threshold.
    ///
    /// Both steps are best-effort, a failed step is logged and returned as a
    /// [`Error::SetupFailed`], and the next step runs anyway.
    #[tracing::instrument(skip_all, fields(oracle = ?self.from))]
    pub async fn setup(&self) -> Vec<Error> {
        let mut failures = Vec::new();
        if self.setup.register_oracle {
            let call = OracleCall::AddOracle { oracle: self.from };
            if let Err(e) = self.setup_step(call).await {
                failures.push(e);
            }
        }
        if self.setup.threshold > 0 {
            let call = OracleCall::SetThreshold {
                threshold: U256::from(self.setup.threshold),
            };
            if let Err(e) = self.setup_step(call).await {
                failures.push(e);
            }
        }
        failures
    }

    async fn setup_step(&self, call: OracleCall) -> crate::Result<()> {
        let step = call.method();
        match self.gateway.send_write(call, self.from).await {
            Ok(tx_hash) => {
                tracing::info!(%step, ?tx_hash, "Setup step done");
                tracing::event!(
                    target: probe::TARGET,
                    tracing::Level::DEBUG,
                    kind = %probe::Kind::Setup,
                    %step,
                    ok = true,
                );
                Ok(())
            }
            Err(e) => {
                let e = Error::SetupFailed {
                    step,
                    reason: e.to_string(),
                };
                tracing::warn!(error = %e, "Proceeding anyway");
                tracing::event!(
                    target: probe::TARGET,
                    tracing::Level::DEBUG,
                    kind = %probe::Kind::Setup,
                    %step,
                    ok = false,
                );
                Err(e)
            }
        }
    }

    /// Runs one processing cycle, then sleeps for the configured interval.
    pub async fn tick(&self) -> CycleSummary {
        let summary = self.processor.run_cycle().await;
        if summary.drained > 0 {
            tracing::debug!(?summary, "Cycle done");
        }
        tokio::time::sleep(self.sleep_interval).await;
        summary
    }

    /// Ticks forever.
    pub async fn run(&self) {
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Lifecycle,
            polling = true,
            sleep_interval = ?self.sleep_interval,
        );
        loop {
            self.tick().await;
        }
    }
}

/// Fires up the event listener in the background, and builds the driver.
///
/// Returns the driver, which is not started yet, and the handle of the listener task.
/// Everything here is fatal: a node that cannot be reached, a contract that cannot be
/// found or a key that cannot be loaded stops the relayer before it starts.
pub async fn ignite(
    ctx: &RelayerContext,
) -> crate::Result<(OracleRelayDriver, JoinHandle<crate::Result<()>>)> {
    let chain = &ctx.config.evm;
    let client = ctx.signer_client()?;
    let network_id = ctx.network_id(client.as_ref()).await?;
    let oracle_address = ctx.oracle_address(&network_id)?;
    tracing::debug!(
        chain = %chain.name,
        chain_id = chain.chain_id,
        %network_id,
        oracle = ?oracle_address,
        "Starting background services",
    );

    let own_address = client.signer().address();
    let gateway = Arc::new(
        EthersContractGateway::new(oracle_address, client, chain.gas_limit)
            .with_accounts(vec![own_address]),
    );
    let from = gateway
        .accounts()
        .await?
        .first()
        .copied()
        .ok_or(Error::MissingSecrets)?;

    let queue = RequestQueue::new();
    let listener = start_oracle_events_watcher(ctx, oracle_address, queue.clone())?;

    let relay = &ctx.config.relay;
    let processor = BatchProcessor::builder()
        .queue(queue)
        .price_backend(ctx.price_backend()?)
        .gateway(gateway.clone())
        .from(from)
        .chunk_size(relay.chunk_size)
        .max_retries(relay.max_retries)
        .price_scale(relay.price_scale)
        .build();
    let driver = RelayDriver::builder()
        .processor(processor)
        .gateway(gateway)
        .from(from)
        .setup(ctx.config.setup)
        .sleep_interval(relay.sleep_interval())
        .build();
    Ok((driver, listener))
}

/// Starts the oracle events watcher in a background task.
fn start_oracle_events_watcher(
    ctx: &RelayerContext,
    oracle_address: Address,
    queue: RequestQueue,
) -> crate::Result<JoinHandle<crate::Result<()>>> {
    let client = Arc::new(ctx.evm_provider()?);
    let wrapper = OracleContractWrapper::new(
        oracle_address,
        client,
        ctx.config.evm.polling_interval(),
    );
    let handlers: Vec<EventHandlerFor<OracleContractWatcher>> = vec![
        Box::new(RequestCreatedHandler::new(queue)),
        Box::new(OracleEventsLogger),
    ];
    let task = async move {
        let watcher = OracleContractWatcher;
        let result = watcher.run(&wrapper, handlers).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Oracle events watcher stopped");
        }
        result
    };
    tracing::event!(
        target: probe::TARGET,
        tracing::Level::DEBUG,
        kind = %probe::Kind::Listener,
        starting = true,
        address = ?oracle_address,
    );
    Ok(tokio::task::spawn(task))
}

#[cfg(test)]
mod tests {
    use oracle_price_oracle_backends::ScriptedPriceBackend;
    use oracle_relayer_contract::mocked::RecordingGateway;
    use oracle_relayer_store::PendingRequest;
    use tracing_test::traced_test;

    use super::*;

    type TestDriver =
        RelayDriver<Arc<ScriptedPriceBackend>, Arc<RecordingGateway>>;

    fn me() -> Address {
        Address::from_low_u64_be(0x0AC1E)
    }

    fn driver(
        queue: &RequestQueue,
        prices: ScriptedPriceBackend,
        gateway: &Arc<RecordingGateway>,
        setup: SetupConfig,
    ) -> TestDriver {
        let processor = BatchProcessor::builder()
            .queue(queue.clone())
            .price_backend(Arc::new(prices))
            .gateway(gateway.clone())
            .from(me())
            .build();
        RelayDriver::builder()
            .processor(processor)
            .gateway(gateway.clone())
            .from(me())
            .setup(setup)
            .build()
    }

    fn default_setup() -> SetupConfig {
        SetupConfig {
            register_oracle: true,
            threshold: 1,
        }
    }

    #[tokio::test]
    async fn setup_registers_the_relayer_and_sets_the_threshold() {
        let gateway = Arc::new(RecordingGateway::new(vec![me()]));
        let driver = driver(
            &RequestQueue::new(),
            ScriptedPriceBackend::unavailable(),
            &gateway,
            default_setup(),
        );
        assert!(driver.setup().await.is_empty());
        assert_eq!(
            gateway.accepted(),
            vec![
                (OracleCall::AddOracle { oracle: me() }, me()),
                (
                    OracleCall::SetThreshold {
                        threshold: U256::one()
                    },
                    me()
                ),
            ]
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn a_failed_setup_step_does_not_stop_the_next_one() {
        let gateway = Arc::new(RecordingGateway::new(vec![me()]));
        gateway.fail_next("addOracle", 1);
        let driver = driver(
            &RequestQueue::new(),
            ScriptedPriceBackend::unavailable(),
            &gateway,
            default_setup(),
        );
        let failures = driver.setup().await;
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            failures[0],
            Error::SetupFailed {
                step: "addOracle",
                ..
            }
        ));
        assert_eq!(
            gateway.accepted(),
            vec![(
                OracleCall::SetThreshold {
                    threshold: U256::one()
                },
                me()
            )]
        );
        assert!(logs_contain("Proceeding anyway"));
    }

    #[tokio::test]
    async fn setup_steps_can_be_turned_off() {
        let gateway = Arc::new(RecordingGateway::new(vec![me()]));
        let driver = driver(
            &RequestQueue::new(),
            ScriptedPriceBackend::unavailable(),
            &gateway,
            SetupConfig {
                register_oracle: false,
                threshold: 0,
            },
        );
        assert!(driver.setup().await.is_empty());
        assert!(gateway.attempts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn the_loop_keeps_draining_the_queue() {
        let queue = RequestQueue::new();
        for id in 1..=5u64 {
            queue.enqueue(PendingRequest::new(id, Address::from_low_u64_be(id)));
        }
        let gateway = Arc::new(RecordingGateway::new(vec![me()]));
        let prices = ScriptedPriceBackend::new(
            std::iter::repeat("1234.56").take(5).map(Ok::<_, &str>),
        );
        let driver = Arc::new(driver(&queue, prices, &gateway, default_setup()));

        let first = driver.tick().await;
        assert_eq!(first.drained, 3);
        assert_eq!(queue.len(), 2);

        let running = tokio::spawn({
            let driver = driver.clone();
            async move { driver.run().await }
        });
        // requests arriving while the loop runs are picked up too.
        queue.enqueue(PendingRequest::new(6u64, Address::from_low_u64_be(6)));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!running.is_finished());
        running.abort();

        assert!(queue.is_empty());
        let calls = gateway.accepted();
        assert_eq!(calls.len(), 6);
        // the sixth request found no quote left and got the fallback.
        assert_eq!(
            calls[5].0,
            OracleCall::SetLatestEthPrice {
                price: U256::zero(),
                caller: Address::from_low_u64_be(6),
                id: 6.into(),
            }
        );
    }
}
