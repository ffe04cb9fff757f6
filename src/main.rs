use battle_poll_bot::cli::Args;
use battle_poll_bot::commands::{
    apply_arg_overrides, handle_list_config_command, handle_parse_command, handle_run_command,
};
use battle_poll_bot::config::Config;
use battle_poll_bot::error::AppError;
use battle_poll_bot::logging::setup_logging;
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    if let Some(title) = &args.parse {
        handle_parse_command(title);
        return Ok(());
    }

    if args.list_config {
        return handle_list_config_command(&args).await;
    }

    // Load config before logging so a custom log path applies, but report
    // config errors only once logging is up.
    let config = Config::load(args.config.as_deref()).await;
    let config_log_path = config
        .as_ref()
        .ok()
        .and_then(|config| config.log_file_path.clone());

    let (log_file_path, _guard) = setup_logging(&args, config_log_path.as_deref()).await?;
    info!("Logs are being written to: {log_file_path}");

    let mut config = config?;
    apply_arg_overrides(&mut config, &args)?;

    handle_run_command(&args, config).await
}
