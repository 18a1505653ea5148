use anyhow::Result;
use clap::Parser;
use tracing::error;

use quote_batch::cli::{Cli, Command};
use quote_batch::config::Config;
use quote_batch::orchestrator::{exit_code_for, App, Outcome, PrepOptions, SubmitOptions};
use quote_batch::utils::logging;

#[tokio::main]
async fn main() {
    // .env 文件可选
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // 加载配置（失败时也先初始化日志再报告）
    let config = Config::load();
    let verbose = cli.verbose || config.as_ref().map(|c| c.verbose_logging).unwrap_or(false);
    logging::init(verbose);
    logging::log_startup(cli.command.mode());

    let outcome = match config {
        Ok(config) => run(&cli.command, config).await,
        Err(e) => Err(e.into()),
    };

    match &outcome {
        Ok(summary) => logging::print_final_stats(true, Some(&summary.to_string())),
        Err(e) => {
            error!("❌ {:#}", e);
            logging::print_final_stats(false, None);
        }
    }
    std::process::exit(exit_code_for(&outcome));
}

async fn run(command: &Command, config: Config) -> Result<Outcome> {
    let config = command.apply_to(config);

    let app = if command.needs_api() {
        App::connect(config)?
    } else {
        App::offline(config)
    };

    let outcome = match command {
        Command::Prep(args) => {
            let requests = app.prep(&PrepOptions::from(args)).await?;
            Outcome::Prepared {
                requests,
                path: args.output.clone(),
            }
        }
        Command::Submit(args) => app.submit(&SubmitOptions::from(args)).await?,
        Command::Poll(args) => {
            Outcome::Materialized(app.poll(&args.job_id, &args.output).await?)
        }
        Command::Cancel(args) => {
            app.cancel(&args.job_id).await?;
            Outcome::CancelRequested(args.job_id.clone())
        }
    };
    Ok(outcome)
}
