//! atlasctl - inspect training jobs and GPU usage on Kubernetes.

mod commands;
mod display;

use atlas_cli::{Args, Command, LogLevel, TopTarget};
use atlas_helm::HelmReleaseStore;
use clap::Parser;
use commands::Session;
use miette::Result;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Install the global subscriber. `RUST_LOG` wins over `--loglevel` when set.
fn init_tracing(level: LogLevel) {
    let default = match level {
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.loglevel);

    let session = Session {
        store: HelmReleaseStore::new(&args.helm_bin).with_kubeconfig(args.kubeconfig.clone()),
        kubeconfig: args.kubeconfig,
        namespace: args.namespace,
        system_namespace: args.atlas_namespace,
    };

    match args.command {
        Command::List => commands::list(&session).await,
        Command::Get { name, output } => commands::get(&session, &name, output).await,
        Command::Logviewer { name } => commands::logviewer(&session, &name).await,
        Command::Top { target } => match target {
            TopTarget::Job => commands::top_job(&session).await,
            TopTarget::Node { details } => commands::top_node(&session, details).await,
        },
        Command::Delete { names } => commands::delete(&session, &names).await,
    }
}
