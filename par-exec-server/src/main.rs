use clap::Parser;
use par_exec::ExecConfig;
use par_exec_server::{create_app, run_server};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to listen on
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    addr: SocketAddr,

    /// Maximum number of concurrent compile-and-run requests
    #[arg(short, long, default_value = "4")]
    max_concurrent: usize,

    /// Directory request workspaces are created under
    #[arg(long)]
    scratch_root: Option<PathBuf>,

    /// Compilation timeout in seconds
    #[arg(long, default_value = "10")]
    compile_timeout: u64,

    /// Execution timeout in seconds (thread-parallel mode)
    #[arg(long, default_value = "10")]
    exec_timeout: u64,

    /// Execution timeout in seconds under mpirun
    #[arg(long, default_value = "30")]
    mpi_exec_timeout: u64,

    /// Worker-count ceiling for thread-parallel mode
    #[arg(long, default_value = "16")]
    max_threads: u32,

    /// Worker-count ceiling for process-parallel mode
    #[arg(long, default_value = "8")]
    max_processes: u32,

    /// Cap on captured stdout/stderr in bytes, each
    #[arg(long, default_value = "65536")]
    max_output_bytes: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = ExecConfig {
        compile_timeout: Duration::from_secs(args.compile_timeout),
        exec_timeout: Duration::from_secs(args.exec_timeout),
        mpi_exec_timeout: Duration::from_secs(args.mpi_exec_timeout),
        max_threads: args.max_threads,
        max_processes: args.max_processes,
        max_output_bytes: args.max_output_bytes,
        ..ExecConfig::default()
    };
    if let Some(scratch_root) = args.scratch_root {
        config.scratch_root = scratch_root;
    }

    let app = create_app(args.max_concurrent, config).await?;
    run_server(app, args.addr).await?;

    Ok(())
}
