//! CLI argument parsing for atlasctl.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "atlasctl")]
#[command(about = "Inspect and manage training jobs on Kubernetes")]
pub struct Args {
    /// Path to the kubeconfig file
    #[arg(long, global = true, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Namespace of the job (defaults to the kubeconfig context namespace)
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Namespace of the atlas system services, such as the dashboard
    #[arg(long, global = true, default_value = "atlas-system")]
    pub atlas_namespace: String,

    /// Helm binary used to manage releases
    #[arg(long, global = true, env = "ATLAS_HELM_BIN", default_value = "helm")]
    pub helm_bin: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List all the training jobs
    List,

    /// Display details of a training job
    Get {
        /// Job name
        name: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Wide)]
        output: OutputFormat,
    },

    /// Display the log viewer URL of a training job
    Logviewer {
        /// Job name
        name: String,
    },

    /// Display GPU usage of jobs or nodes
    Top {
        #[command(subcommand)]
        target: TopTarget,
    },

    /// Delete training jobs
    Delete {
        /// Job names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum TopTarget {
    /// GPU requests and allocations per training job
    Job,

    /// GPU capacity and allocations per node
    Node {
        /// Show the GPU pods of every node
        #[arg(short, long)]
        details: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Per-pod table
    Wide,
    /// Job name only
    Name,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}
