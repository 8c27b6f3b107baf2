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

//! Oracle Caller Client Binary.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use oracle_caller_client::CallerClient;
use oracle_event_watcher_traits::{EventHandlerFor, EventWatcher};
use oracle_ew_evm::{
    CallerContractWatcher, CallerContractWrapper, CallerEventsLogger,
};
use oracle_relayer_config::cli::{load_config, setup_logger, Opts};
use oracle_relayer_context::RelayerContext;
use oracle_relayer_utils::probe;
use tokio::signal::unix;

/// The main entry point for the caller client.
///
/// # Arguments
///
/// * `args` - The command line arguments.
#[paw::main]
#[tokio::main]
async fn main(args: Opts) -> anyhow::Result<()> {
    setup_logger(args.verbose, "oracle")?;
    if let Err(e) = dotenv::dotenv() {
        tracing::warn!("Failed to load .env file: {}", e);
    }
    let config = load_config(args.config_dir.clone())?;
    let ctx = RelayerContext::new(config);

    let client = ctx.signer_client()?;
    let network_id = ctx.network_id(client.as_ref()).await?;
    let oracle_address = ctx.oracle_address(&network_id)?;
    let caller_address = ctx.caller_address(&network_id)?;
    tracing::debug!(
        %network_id,
        oracle = ?oracle_address,
        caller = ?caller_address,
        "Resolved contracts",
    );

    let wrapper = CallerContractWrapper::new(
        caller_address,
        Arc::new(ctx.evm_provider()?),
        ctx.config.evm.polling_interval(),
    );
    let handlers: Vec<EventHandlerFor<CallerContractWatcher>> =
        vec![Box::new(CallerEventsLogger)];
    let watcher_handle = tokio::spawn(async move {
        CallerContractWatcher.run(&wrapper, handlers).await
    });

    let caller = CallerClient::new(caller_address, client);
    match caller.point_at_oracle(oracle_address).await {
        Ok(tx_hash) => tracing::info!(?tx_hash, "Caller points at the oracle"),
        Err(e) => tracing::error!(error = %e, "Failed to set the oracle address"),
    }

    let requests = async {
        let mut interval = tokio::time::interval(ctx.config.relay.sleep_interval());
        loop {
            interval.tick().await;
            match caller.request_price().await {
                Ok(tx_hash) => tracing::debug!(?tx_hash, "Requested a new price"),
                Err(e) => tracing::error!(error = %e, "Failed to request a price"),
            }
        }
    };
    tracing::event!(
        target: probe::TARGET,
        tracing::Level::DEBUG,
        kind = %probe::Kind::Lifecycle,
        started = true
    );
    let mut ctrlc_signal = unix::signal(unix::SignalKind::interrupt())?;
    let mut termination_signal = unix::signal(unix::SignalKind::terminate())?;
    tokio::select! {
        _ = requests => {},
        _ = ctrlc_signal.recv() => tracing::warn!("Interrupted (Ctrl+C) ..."),
        _ = termination_signal.recv() => tracing::warn!("Got Terminate signal ..."),
    }
    watcher_handle.abort();
    Ok(())
}
