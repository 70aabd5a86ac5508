mod adapters;
mod changelog;
mod commands;
mod core;
mod site;
mod ui;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::core::context::Context;
use crate::core::error::{FoldResult, print_error};

/// Cross-language monorepo version and release management
#[derive(Parser)]
#[command(name = "semifold")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Print planned actions without applying them
  #[arg(global = true, long)]
  dry_run: bool,

  /// Enable debug diagnostics
  #[arg(global = true, long)]
  debug: bool,
}

#[derive(Subcommand)]
enum Commands {
  /// Initialize the changes directory and configuration
  Init(commands::init::InitArgs),
  /// Record a changeset describing pending version bumps
  #[command(visible_alias = "commit")]
  Add(commands::add::AddArgs),
  /// Show pending changesets and planned version bumps
  Status(commands::status::StatusArgs),
  /// Apply pending bumps and regenerate changelogs
  Version(commands::version::VersionArgs),
  /// Publish packages in dependency order
  Publish(commands::publish::PublishArgs),
  /// Run the CI release pipeline (GitHub Actions only)
  Ci(commands::ci::CiArgs),
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_tracing(debug: bool) {
  let filter = if debug {
    EnvFilter::new("semifold=debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("semifold=warn"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn run(cli: &Cli) -> FoldResult<()> {
  let ctx = Context::discover(cli.dry_run)?;

  match &cli.command {
    Commands::Init(args) => commands::init::run(args, &ctx),
    Commands::Add(args) => commands::add::run(args, &ctx),
    Commands::Status(args) => commands::status::run(args, &ctx),
    Commands::Version(args) => commands::version::run(args, &ctx),
    Commands::Publish(args) => commands::publish::run(args, &ctx),
    Commands::Ci(args) => commands::ci::run(args, &ctx),
  }
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.debug);

  if let Err(error) = run(&cli) {
    print_error(&error);
    std::process::exit(error.exit_code().as_i32());
  }
}
