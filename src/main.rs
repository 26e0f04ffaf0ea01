use anyhow::Context;
use clap::Parser;
use payment_plan::adapters::export;
use payment_plan::config::cli::Command;
use payment_plan::config::toml_config::LogFormat;
use payment_plan::utils::error::ErrorSeverity;
use payment_plan::utils::{logger, validation::Validate};
use payment_plan::{CliConfig, HttpPaymentGateway, Notice, PlanConfig, PlanController, PlanError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match &cli.config {
        Some(path) => PlanConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path.display()))?,
        None => PlanConfig::default(),
    };

    let verbose = cli.verbose || config.logging.verbose;
    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(verbose),
        LogFormat::Json => logger::init_json_logger(verbose),
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&cli, &config).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        let notice = Notice::from(&e);
        eprintln!("❌ {}: {}", notice.title, notice.message);
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 2,
            ErrorSeverity::Medium => 3,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 4,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(cli: &CliConfig, config: &PlanConfig) -> Result<(), PlanError> {
    let plan = cli.command.plan();
    let record_id = match &cli.command {
        Command::Commit { record_id, .. } => record_id.clone(),
        Command::Preview { .. } => "preview".to_string(),
    };

    let mut controller = PlanController::new(record_id);
    if let Some(as_of) = plan.as_of {
        controller = controller.with_as_of(as_of);
    }

    controller.load_total(plan.total)?;
    if plan.shape() != controller.shape() {
        controller.change_shape(plan.shape())?;
    }
    if !plan.edits.is_empty() {
        controller.apply_edits(&plan.edit_map())?;
    }
    if let Some(channel) = cli.command.channel() {
        controller.select_channel(channel)?;
    }

    let target = controller.target().unwrap_or(plan.total);
    let separator = config.display.thousands_separator;

    match &cli.command {
        Command::Preview { format, .. } => {
            let rendered = export::render(controller.rows(), target, *format, separator)?;
            print!("{}", rendered);
        }
        Command::Commit { .. } => {
            let gateway_config = config.require_gateway()?.clone();
            let gateway = HttpPaymentGateway::new(gateway_config).map_err(|e| {
                PlanError::ConfigValidationError {
                    field: "gateway".to_string(),
                    message: e.to_string(),
                }
            })?;

            print!(
                "{}",
                export::render(controller.rows(), target, export::OutputFormat::Table, separator)?
            );

            let receipt = controller.commit(&gateway).await?;
            let notice = Notice::from(&receipt);
            tracing::info!("✅ {}", notice.message);
            println!("✅ {}", notice.message);
        }
    }

    Ok(())
}
