use std::{fs::File, io::BufWriter, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

use fintrack::{
    ClientConfig, DEFAULT_SERVER_URL, Error, HttpTransactionStore, SessionController,
    TransactionStore,
    html::HtmlView,
    save_export, setup_logging,
    terminal::{TerminalView, run_shell},
    write_csv_snapshot,
};

/// A terminal client for the fintrack transaction server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The base URL of the transaction server.
    #[arg(long, env = "FINTRACK_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Also write debug logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start an interactive session (the default).
    Shell {
        /// Where `export` saves files when no directory is given.
        #[arg(long, default_value = ".")]
        export_dir: PathBuf,
    },
    /// Check that the server is up.
    Status,
    /// Write the ledger as a standalone HTML page.
    Snapshot {
        /// The HTML file to write.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write the transactions as CSV.
    Csv {
        /// The CSV file to write.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Download the spreadsheet export.
    Export {
        /// The directory to save the file in.
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging("info", args.log_file.as_deref()) {
        eprintln!("Could not set up logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let config = ClientConfig::new(&args.server)?;
    tracing::debug!("Using transaction server at {}", config.base_url());
    let store = HttpTransactionStore::new(config);

    let command = args.command.unwrap_or(Command::Shell {
        export_dir: PathBuf::from("."),
    });

    match command {
        Command::Shell { export_dir } => {
            let controller = SessionController::new(store, TerminalView::stdio());
            run_shell(&controller, &export_dir).await;
        }
        Command::Status => {
            let health = store.health().await?;
            match health.timestamp {
                Some(timestamp) => println!("{} ({timestamp})", health.status),
                None => println!("{}", health.status),
            }
        }
        Command::Snapshot { output } => {
            let controller = SessionController::new(store, HtmlView::default());
            // A failed load still produces a page that shows the error.
            let _ = controller.request_reload().await;
            tokio::fs::write(&output, controller.view().page().into_string()).await?;
            tracing::info!("Wrote {}", output.display());
        }
        Command::Csv { output } => {
            let snapshot = store.list().await?;
            let file = BufWriter::new(File::create(&output)?);
            write_csv_snapshot(snapshot.transactions.as_deref().unwrap_or_default(), file)?;
            tracing::info!("Wrote {}", output.display());
        }
        Command::Export { directory } => {
            let file = store.export().await?;
            let path = save_export(&file, &directory).await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
