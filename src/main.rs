use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "spotiq", version, about = "Spotify plugin backend for quick launchers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the plugin over stdio (spawned by the launcher host)
    Serve,

    /// Print a fresh authorization URL (debugging aid; the verifier is
    /// discarded, so the resulting code cannot be exchanged)
    AuthUrl,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("SPOTIQ_LOG_LEVEL")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), spotiq::SpotiqError> {
    let config = spotiq::PluginConfig::from_env();
    match cli.command {
        Commands::Serve => spotiq::host::serve(config).await,
        Commands::AuthUrl => {
            let session = spotiq::Session::new(config);
            println!("{}", session.begin_authorization());
            Ok(())
        }
    }
}
