//! Rich menu management
//!
//!   richmenu list
//!   richmenu delete-all
//!   richmenu deploy --dir richmenus --default bloodPressure

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use dainichi_line_bot::{init_tracing, ApiEndpoints, ChannelToken, LineClient, Provisioner};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "richmenu")]
#[command(about = "Manage the LINE rich menus of the channel", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Print every rich menu as JSON
    List,

    /// Delete every rich menu, one at a time
    DeleteAll,

    /// Create one rich menu per subdirectory (menu.json + image) and set the default
    Deploy {
        /// Directory holding one subdirectory per menu
        #[arg(long, value_name = "DIR", default_value = "richmenus")]
        dir: PathBuf,

        /// Name of the menu to make the default (first created when absent or unmatched)
        #[arg(long, value_name = "NAME")]
        default: Option<String>,
    },
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    ExitCode::from(execute(std::env::args_os()).await)
}

/// Parses `args` and runs the command. Returns 0 on success (including
/// help and usage output) and 1 on any error.
async fn execute<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => return parse_error_code(&e),
    };

    let Some(command) = cli.command else {
        print_usage();
        return EXIT_SUCCESS;
    };

    match run(command).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            EXIT_FAILURE
        }
    }
}

fn parse_error_code(e: &clap::Error) -> u8 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            EXIT_SUCCESS
        }
        ErrorKind::InvalidSubcommand => {
            print_usage();
            EXIT_SUCCESS
        }
        _ => {
            let _ = e.print();
            EXIT_FAILURE
        }
    }
}

fn print_usage() {
    let _ = Cli::command().print_help();
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let token = ChannelToken::from_env()?;
    let client = LineClient::new(token, ApiEndpoints::default())?;
    let provisioner = Provisioner::new(Arc::new(client));

    match command {
        Commands::List => {
            let menus = provisioner.list().await?;
            println!("{}", serde_json::to_string_pretty(&menus)?);
        }
        Commands::DeleteAll => {
            let deleted = provisioner.delete_all().await?;
            info!("Deleted {} rich menu(s)", deleted);
        }
        Commands::Deploy { dir, default } => {
            let report = provisioner.deploy(&dir, default.as_deref()).await?;
            info!(
                "Deployed {} rich menu(s) from {}",
                report.created.len(),
                dir.display()
            );
        }
    }

    Ok(())
}
