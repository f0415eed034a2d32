// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "OUTLAY_LOG";
const DEFAULT_FILTER: &str = "outlay=warn";

/// Filter from `OUTLAY_LOG`, then `RUST_LOG`, then `outlay=warn`; `verbose`
/// raises the default to debug.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| {
            if verbose {
                EnvFilter::new("outlay=debug")
            } else {
                EnvFilter::new(DEFAULT_FILTER)
            }
        })
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
