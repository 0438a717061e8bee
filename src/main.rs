use clap::Parser;
use journalbear::cli::commands::add::AddArgs;
use journalbear::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "JOURNALBEAR_LOG";

fn main() {
    let cli = Cli::parse();

    init_logging(&cli);

    let result = match cli.command {
        Commands::New { ref file } => journalbear::cli::commands::new::execute(&cli, file),
        Commands::List { ref file } => journalbear::cli::commands::list::execute(&cli, file),
        Commands::Show { ref file, ref date } => {
            journalbear::cli::commands::show::execute(&cli, file, date)
        }
        Commands::Add {
            ref file,
            ref date,
            ref sentiment,
            nsfw,
            ref attach,
            ref content,
            replace,
        } => journalbear::cli::commands::add::execute(
            &cli,
            file,
            AddArgs {
                date: date.as_deref(),
                sentiment: sentiment.as_deref(),
                nsfw,
                attach,
                content: content.as_deref(),
                replace,
            },
        ),
        Commands::Remove {
            ref file,
            ref date,
            force,
        } => journalbear::cli::commands::remove::execute(&cli, file, date, force),
        Commands::Export {
            ref file,
            ref output,
        } => journalbear::cli::commands::export::execute(&cli, file, output.as_deref()),
        Commands::Images { ref file, ref dir } => {
            journalbear::cli::commands::images::execute(&cli, file, dir)
        }
        Commands::Convert {
            ref file,
            ref out,
            new_password,
        } => journalbear::cli::commands::convert::execute(&cli, file, out, new_password),
        Commands::CheckPassword => journalbear::cli::commands::check_password::execute(),
        Commands::Passwd { ref file } => journalbear::cli::commands::passwd::execute(&cli, file),
    };

    if let Err(e) = result {
        journalbear::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Send `tracing` output to stderr.  The filter comes from
/// `JOURNALBEAR_LOG`, else `--verbose`, else the configured `log_level`.
fn init_logging(cli: &Cli) {
    let fallback = if cli.verbose {
        "debug".to_string()
    } else {
        journalbear::cli::load_settings()
            .map(|s| s.log_level)
            .unwrap_or_else(|_| "warn".to_string())
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
