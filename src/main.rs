use clap::Parser;
use expense_tracker::args::{Args, Command};
use expense_tracker::{commands, Config, Error, ErrorType, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().expenses_home().path();

    if let Command::Init(init_args) = args.command() {
        commands::init(home, init_args.sqlite_path()).await?.print();
        return Ok(());
    }

    // Every other command needs the database. Failing to open it is fatal.
    let config = Config::load(home)
        .await
        .map_err(|e| Error::new(ErrorType::Config, e))?;

    let result = run(config.clone(), args.command()).await;
    config.close().await;
    result
}

async fn run(config: Config, command: &Command) -> Result<()> {
    let _: () = match command {
        Command::Init(_) => {}
        Command::Mcp(_) => commands::mcp(config).await?.print(),
        Command::Add(args) => commands::add_expense(config, args.clone()).await?.print(),
        Command::List(args) => commands::get_expenses(config, args.clone()).await?.print(),
        Command::ByCategory(args) => commands::get_spending_by_category(config, args.clone())
            .await?
            .print(),
        Command::Monthly(args) => commands::get_monthly_summary(config, args.clone())
            .await?
            .print(),
        Command::Update(args) => commands::update_expense(config, args.clone())
            .await?
            .print(),
        Command::Delete(args) => commands::delete_expense(config, args.clone())
            .await?
            .print(),
        Command::Export(args) => commands::export(config, args.clone()).await?.print(),
        Command::Call(args) => {
            let arguments = serde_json::from_str(args.arguments())
                .map_err(|e| Error::msg(ErrorType::Validation, format!("Invalid JSON: {e}")));
            let response = match arguments {
                Ok(arguments) => commands::call(config, args.operation(), arguments).await,
                Err(e) => Err(e),
            };
            // The response is printed either way so that scripts can branch on `success`.
            match response {
                Ok(value) => println!("{value:#}"),
                Err(e) => {
                    println!("{:#}", e.to_response());
                    return Err(e);
                }
            }
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                "expense_tracker",
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
