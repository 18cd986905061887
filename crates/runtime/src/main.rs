//! Kiln CLI
//!
//! Runs one of the bundled compiled programs.

use clap::{Parser, Subcommand};
use kiln_runtime::{ReportMode, RuntimeConfig, logging, main_entry, programs};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kiln runtime - run compiled Scheme programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a bundled program
    Run {
        /// Program name (see `kiln list`)
        program: String,

        /// Runtime configuration file (TOML)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// At-exit report: off, human or json (overrides config and KILN_REPORT)
        #[arg(long, value_name = "MODE")]
        report: Option<ReportMode>,

        /// Run the program on a thread with this much native stack (KiB)
        #[arg(long, value_name = "KIB")]
        stack_size: Option<usize>,
    },

    /// List bundled programs
    List,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            program,
            config,
            report,
            stack_size,
        } => {
            let code = run(&program, config, report, stack_size);
            process::exit(code);
        }
        Commands::List => {
            for program in programs::PROGRAMS {
                println!("{:14} {}", program.name, program.description);
            }
        }
    }
}

fn run(
    name: &str,
    config_path: Option<PathBuf>,
    report: Option<ReportMode>,
    stack_size: Option<usize>,
) -> i32 {
    let mut config = match RuntimeConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };
    if let Some(report) = report {
        config.report = report;
    }
    if stack_size.is_some() {
        config.stack_size_kib = stack_size;
    }
    if let Err(e) = config.stack_size_bytes() {
        eprintln!("error: {}", e);
        return 1;
    }

    logging::init(config.log_filter());

    let Some(program) = programs::find(name) else {
        eprintln!("error: unknown program '{}' (try `kiln list`)", name);
        return 1;
    };
    main_entry(program, &config)
}
