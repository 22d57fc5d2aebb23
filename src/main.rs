use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use digei_report::{DEFAULT_FONT_FAMILY, Error, ReportConfig, ReportData, render_report};

/// Render DIGEI self-assessment results as PDF reports.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory containing `assets/` and `content/`
    #[arg(long, env = "DIGEI_ASSETS_DIR", default_value = ".", global = true)]
    assets_dir: PathBuf,

    /// Font family to embed
    #[arg(long, env = "DIGEI_FONT_FAMILY", default_value = DEFAULT_FONT_FAMILY, global = true)]
    font_family: String,

    /// Use the built-in Helvetica family instead of embedding fonts
    #[arg(long, global = true)]
    builtin_fonts: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve {
        #[arg(long, env = "DIGEI_BIND", default_value = "0.0.0.0:8000")]
        bind: SocketAddr,
    },
    /// Render a JSON payload file to PDF
    Render { input: PathBuf, output: PathBuf },
    /// Render the built-in sample payload to PDF
    Sample { output: PathBuf },
}

impl Args {
    fn config(&self) -> ReportConfig {
        if self.builtin_fonts {
            ReportConfig::builtin(&self.assets_dir)
        } else {
            ReportConfig {
                assets_dir: self.assets_dir.clone(),
                font_family: Some(self.font_family.clone()),
            }
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let config = args.config();
    match args.command {
        Command::Serve { bind } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(digei_report::server::serve(bind, config))
        }
        Command::Render { input, output } => {
            digei_report::render_file(&input, &output, &config)?;
            log::info!("Wrote {}", output.display());
            Ok(())
        }
        Command::Sample { output } => {
            let bytes = render_report(&ReportData::sample(), &config)?;
            std::fs::write(&output, bytes)?;
            log::info!("Wrote {}", output.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
