//! obsdiff CLI binary.

use std::process::ExitCode;

use clap::Parser;
use obsdiff_schema::JsonDatasetStore;
use obsdiff_verify::exit::{codes, exit_code};
use obsdiff_verify::{
    Cli, Command, ConvertPrepare, Dispatcher, ListArgs, LocalFixtureSource, StderrLogger,
    SuiteRegistry, Verbosity, VerifyArgs,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Verify(args) => run_verify(args),
        Command::List(args) => run_list(args),
    }
}

fn run_verify(args: VerifyArgs) -> ExitCode {
    if let Err(e) = args.validate() {
        eprintln!("error: {}", e);
        return ExitCode::from(codes::SETUP_ERROR);
    }

    let registry = match SuiteRegistry::from_config_file(&args.config) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(codes::SETUP_ERROR);
        }
    };

    let logger = StderrLogger::new(Verbosity::from_count(args.verbose));
    let store = JsonDatasetStore;
    let mut dispatcher = Dispatcher::new(&registry, &store, &logger).keep_output(args.keep_output);
    for marker in registry.markers() {
        let mut step = ConvertPrepare::new(&args.input_pattern);
        if let Some(root) = &args.fixture_root {
            step = step.with_fixtures(Box::new(LocalFixtureSource::new(root.clone())));
        }
        dispatcher = dispatcher.with_prepare(marker, Box::new(step));
    }

    match dispatcher.run(&args.suites) {
        Ok(report) => {
            for mismatch in report.mismatches() {
                println!("{}\n", mismatch);
            }
            if report.passed() {
                println!(
                    "verified {} file pair(s), no mismatches",
                    report.files.len()
                );
                ExitCode::from(codes::SUCCESS)
            } else {
                println!(
                    "{} mismatch(es) across {} file pair(s)",
                    report.total_mismatches(),
                    report.files.len()
                );
                ExitCode::from(codes::MISMATCH)
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run_list(args: ListArgs) -> ExitCode {
    match SuiteRegistry::from_config_file(&args.config) {
        Ok(registry) => {
            for marker in registry.markers() {
                println!("{}", marker);
            }
            ExitCode::from(codes::SUCCESS)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(codes::SETUP_ERROR)
        }
    }
}
