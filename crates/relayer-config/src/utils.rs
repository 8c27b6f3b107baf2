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

use config::{Config, File};
use std::path::{Path, PathBuf};

use super::*;

/// The prefix of the environment variables merged into the configuration.
///
/// Nested keys are separated by `__`, e.g. `ORACLE_RELAY__CHUNK_SIZE=5`.
pub const ENV_PREFIX: &str = "ORACLE";

/// Bare environment variables honoured for compatibility with existing deployments,
/// and the configuration keys they override.
const LEGACY_ENV_OVERRIDES: [(&str, &str); 3] = [
    ("SLEEP_INTERVAL", "relay.sleep_interval"),
    ("CHUNK_SIZE", "relay.chunk_size"),
    ("MAX_RETRIES", "relay.max_retries"),
];

/// A helper function that will search for all config files in the given directory and return them as a vec
/// of the paths.
///
/// Supported file extensions are:
/// - `.toml`.
/// - `.json`.
pub fn search_config_files<P: AsRef<Path>>(
    base_dir: P,
) -> oracle_relayer_utils::Result<Vec<PathBuf>> {
    // A pattern that covers all toml or json files in the config directory and subdirectories.
    let toml_pattern = format!("{}/**/*.toml", base_dir.as_ref().display());
    let json_pattern = format!("{}/**/*.json", base_dir.as_ref().display());
    tracing::trace!(
        "Loading config files from {} and {}",
        toml_pattern,
        json_pattern
    );
    let toml_files = glob::glob(&toml_pattern)?;
    let json_files = glob::glob(&json_pattern)?;
    toml_files
        .chain(json_files)
        .map(|v| v.map_err(oracle_relayer_utils::Error::from))
        .collect()
}

/// Try to parse the [`OracleRelayerConfig`] from the given config file(s).
pub fn parse_from_files(
    files: &[PathBuf],
) -> oracle_relayer_utils::Result<OracleRelayerConfig> {
    let mut builder = Config::builder();
    for config_file in files {
        tracing::trace!("Loading config file: {}", config_file.display());
        // get file extension
        let ext = config_file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let format = match ext {
            "toml" => config::FileFormat::Toml,
            "json" => config::FileFormat::Json,
            _ => {
                tracing::warn!("Unknown file extension: {}", ext);
                continue;
            }
        };
        builder = builder
            .add_source(File::from(config_file.as_path()).format(format));
    }

    // also merge in the environment (with a prefix of ORACLE).
    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    for (var, key) in LEGACY_ENV_OVERRIDES {
        if let Ok(value) = std::env::var(var) {
            tracing::trace!("Overriding {} from {}", key, var);
            builder = builder.set_override(key, value)?;
        }
    }
    let cfg = builder.build()?;
    // and finally deserialize the config and post-process it
    let config: Result<
        OracleRelayerConfig,
        serde_path_to_error::Error<config::ConfigError>,
    > = serde_path_to_error::deserialize(cfg);
    match config {
        Ok(c) => postloading_process(c),
        Err(e) => {
            tracing::error!("{}", e);
            Err(e.into())
        }
    }
}

/// Load the configuration files and
///
/// Returns `Ok(OracleRelayerConfig)` on success, or `Err(oracle_relayer_utils::Error)` on failure.
///
/// # Arguments
///
/// * `path` - The path to the configuration directory
///
/// # Example
///
/// ```no_run
/// use oracle_relayer_config::utils::load;
///
/// let path = "/path/to/config";
/// load(path);
/// ```
///
/// it is the same as using the [`search_config_files`] and [`parse_from_files`] functions combined.
pub fn load<P: AsRef<Path>>(
    path: P,
) -> oracle_relayer_utils::Result<OracleRelayerConfig> {
    parse_from_files(&search_config_files(path)?)
}

/// The postloading_process exists to standardize the configuration after it was loaded.
pub fn postloading_process(
    mut config: OracleRelayerConfig,
) -> oracle_relayer_utils::Result<OracleRelayerConfig> {
    tracing::trace!("Checking configration sanity ...");
    // an explicit address makes the artifact irrelevant.
    if config.evm.oracle.address.is_some() {
        config.evm.oracle.artifact = None;
    }
    if let Some(caller) = config.evm.caller.as_mut() {
        if caller.address.is_some() {
            caller.artifact = None;
        }
    }
    if config.relay.price_scale > 30 {
        tracing::warn!(
            price_scale = config.relay.price_scale,
            "unusually large price scale, quotes may overflow uint256",
        );
    }
    tracing::trace!(
        relay = ?config.relay,
        setup = ?config.setup,
        "postloaded config",
    );
    Ok(config)
}
