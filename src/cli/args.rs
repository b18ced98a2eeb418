use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Drive a concurrent multi-currency ledger with a random workload
#[derive(Parser, Debug)]
#[command(name = "currency-ledger")]
#[command(about = "Concurrent multi-currency ledger demo", long_about = None)]
pub struct CliArgs {
    /// Number of worker threads driving the ledger
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Worker threads running random actions (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// How long to run the workload
    #[arg(
        long = "duration-secs",
        value_name = "SECONDS",
        default_value = "10",
        help = "Seconds to run before shutting the pool down"
    )]
    pub duration_secs: u64,

    /// Where account records live in file storage mode
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        default_value = "./data",
        help = "Directory for account record files"
    )]
    pub data_dir: PathBuf,

    /// Account storage backend
    #[arg(
        long = "storage",
        value_name = "STORAGE",
        default_value = "file",
        help = "Account storage: 'file' for one record per account on disk, 'memory' for in-process"
    )]
    pub storage: StorageType,

    /// Base RNG seed; workers derive their seed from it
    #[arg(
        long = "seed",
        value_name = "SEED",
        help = "Base seed for the random workload (default: entropy)"
    )]
    pub seed: Option<u64>,

    /// Cap on concurrently open accounts
    #[arg(
        long = "max-accounts",
        value_name = "COUNT",
        default_value = "5",
        help = "Maximum accounts the workload keeps open at a time"
    )]
    pub max_accounts: usize,
}

/// Available account storage backends
#[derive(Clone, Debug, ValueEnum)]
pub enum StorageType {
    File,
    Memory,
}

impl CliArgs {
    /// Worker count from the arguments, defaulting to the CPU count
    pub fn worker_count(&self) -> usize {
        match self.workers {
            Some(count) if count > 0 => count,
            _ => num_cpus::get(),
        }
    }
}
