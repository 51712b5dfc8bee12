// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod bindings;
mod session;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use lever_sdk::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Encoding {
    Ron,
    Bincode,
}

impl From<Encoding> for SnapshotEncoding {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Ron => SnapshotEncoding::Ron,
            Encoding::Bincode => SnapshotEncoding::Bincode,
        }
    }
}

/// Simulates a game session toggling Lever bindings across a save boundary.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "lever.toml")]
    config: PathBuf,

    /// Overrides the directory snapshots are written to.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Overrides the snapshot encoding.
    #[arg(long, value_enum)]
    encoding: Option<Encoding>,

    /// The save slot to load and save.
    #[arg(long, default_value_t = 1)]
    slot: u32,

    /// Frames simulated between host events.
    #[arg(long, default_value_t = 5)]
    ticks: usize,

    /// Display names of the bindings to toggle while in the world.
    #[arg(long = "toggle", value_name = "NAME")]
    toggles: Vec<String>,
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    let cli = Cli::parse();
    let mut config = LeverConfig::load_or_default(&cli.config)?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(encoding) = cli.encoding {
        config.encoding = encoding.into();
    }

    Builder::from_env(Env::default().default_filter_or(config.log_filter.as_str())).init();

    let toggles = if cli.toggles.is_empty() {
        vec!["Infinite stamina".to_string(), "Fast travel".to_string()]
    } else {
        cli.toggles
    };

    let world = bindings::GameWorld::default();
    let probe = Arc::new(ManualProbe::new());
    let catalog = bindings::catalog(&world)?;
    let mut context = LeverContext::with_file_store(config, catalog, probe.clone())?;

    session::Session::new(&mut context, probe, world, SlotId(cli.slot), cli.ticks)
        .run(&toggles)?;
    Ok(())
}
