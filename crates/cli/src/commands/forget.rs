// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dubwatch forget` - Drop the saved job

use crate::config::Config;
use crate::output::OutputFormat;
use anyhow::Result;
use dw_adapters::JobIdStore;

pub fn handle(config: &Config, format: OutputFormat) -> Result<()> {
    let store = super::file_store(config);
    let previous = store.load().ok().flatten();
    store.clear()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "forgotten": previous }));
        }
        OutputFormat::Text => match previous {
            Some(job_id) => println!("Forgot job {job_id}"),
            None => println!("No saved job"),
        },
    }
    Ok(())
}
