use crate::commands::{
    run_compliance_evaluate, run_compliance_recompute, run_promotion_evaluate, run_promotion_exam,
    run_promotion_rules, ComplianceEvaluateArgs, ExamArgs, PromotionEvaluateArgs, RecomputeArgs,
    RulesArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use training_compliance::config::AppConfig;
use training_compliance::error::AppError;
use training_compliance::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Training Compliance Engine",
    about = "Evaluate training compliance and promotion eligibility from employee snapshots",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Course matrix coverage for employees
    Compliance {
        #[command(subcommand)]
        command: ComplianceCommand,
    },
    /// Promotion eligibility and exam scheduling
    Promotion {
        #[command(subcommand)]
        command: PromotionCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ComplianceCommand {
    /// Show the gap report for a single employee
    Evaluate(ComplianceEvaluateArgs),
    /// Recompute and persist the stored matrix for every employee
    Recompute(RecomputeArgs),
}

#[derive(Subcommand, Debug)]
enum PromotionCommand {
    /// Evaluate every promotion criterion for an employee
    Evaluate(PromotionEvaluateArgs),
    /// Show when an employee may next sit the promotion exam
    Exam(ExamArgs),
    /// Print the normalized promotion rule table
    Rules(RulesArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Compliance {
            command: ComplianceCommand::Evaluate(args),
        } => run_compliance_evaluate(args),
        Command::Compliance {
            command: ComplianceCommand::Recompute(args),
        } => run_compliance_recompute(args, &config.recompute),
        Command::Promotion {
            command: PromotionCommand::Evaluate(args),
        } => run_promotion_evaluate(args),
        Command::Promotion {
            command: PromotionCommand::Exam(args),
        } => run_promotion_exam(args),
        Command::Promotion {
            command: PromotionCommand::Rules(args),
        } => run_promotion_rules(args),
    }
}
