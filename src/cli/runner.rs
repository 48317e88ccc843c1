//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::ExtractorConfig;
use crate::discover::PartitionDiscoverer;
use crate::engine::ExtractEngine;
use crate::error::Result;
use crate::http::{QueryClient, QueryClientConfig};
use crate::output::{self, Table};
use std::path::PathBuf;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Partitions => self.partitions().await,
            Commands::Run { output } => self.extract(output.clone()).await,
        }
    }

    /// Resolve the effective config: YAML file if given, defaults
    /// otherwise, environment overrides on top of either.
    fn load_config(&self) -> Result<ExtractorConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ExtractorConfig::from_yaml_file(path)?,
            None => ExtractorConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn client_for(config: &ExtractorConfig) -> QueryClient {
        QueryClient::with_config(QueryClientConfig::from_extractor(config))
    }

    /// Probe the service by resolving the partition key
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let client = Self::client_for(&config);
        let discoverer = PartitionDiscoverer::new(&client, &config);

        let key = discoverer.resolve_partition_key().await?;
        println!("OK: service reachable, partition key is '{key}'");
        Ok(())
    }

    /// Resolve the partition key and print its distinct values
    async fn partitions(&self) -> Result<()> {
        let config = self.load_config()?;
        let client = Self::client_for(&config);
        let discoverer = PartitionDiscoverer::new(&client, &config);

        let key = discoverer.resolve_partition_key().await?;
        let values = discoverer.list_partition_values(&key).await?;
        println!("Partition key: {key} ({} values)", values.len());
        for value in values {
            println!("{value}");
        }
        Ok(())
    }

    /// Run the full extraction and write the CSV output
    async fn extract(&self, output: Option<PathBuf>) -> Result<()> {
        let mut config = self.load_config()?;
        if let Some(path) = output {
            config.output_path = path;
        }

        let mut engine = ExtractEngine::new(config.clone());

        // Ctrl-C stops the run before the next partition; the page in
        // flight is allowed to complete.
        let cancel = engine.cancel_flag();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, finishing current partition");
                cancel.request();
            }
        });

        let outcome = engine.run().await?;
        if outcome.is_empty() {
            warn!("no records extracted");
        }

        let table = Table::from_records(outcome.records(), &config.select_fields, &config.rename);
        let rows = output::write_csv(&table, &config.output_path)?;
        info!(rows, path = %config.output_path.display(), "wrote CSV output");
        println!("Wrote {rows} rows to {}", config.output_path.display());
        Ok(())
    }
}
