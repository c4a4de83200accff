use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;

use numscope_core::{
    build_categories, unique_output_path, AnalysisRange, AnalyzerConfig, ConsoleSink,
    RangeAnalyzer, RangeAssessment, Result, RtfExporter,
};

mod args;
use args::{Cli, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        handle_completions(shell);
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // clap guarantees both bounds are present past the completions branch.
    let range = AnalysisRange::new(
        cli.min.unwrap_or_default(),
        cli.max.unwrap_or_default(),
    );

    let config = AnalyzerConfig::load(&cli.config)?;
    let analyzer = RangeAnalyzer::new(build_categories(&config)?);
    let assessment = analyzer.validate(&range)?;

    // Explicit -o always exports; otherwise a large range offers the export
    // as a fallback before flooding the terminal.
    let export_name = match (&cli.output, assessment) {
        (Some(name), _) => Some(Some(name.as_str())),
        (None, RangeAssessment::Large { size }) => {
            if confirm_export(cli, size)? {
                Some(None)
            } else {
                None
            }
        }
        (None, RangeAssessment::Ok) => None,
    };

    match export_name {
        Some(explicit) => {
            let path = unique_output_path(&cli.output_dir, range.min, range.max, explicit);
            let mut sink = RtfExporter::new(path);
            analyzer.run(&range, &mut sink)?;
            if !cli.quiet {
                println!(
                    "{} Results saved to: {}",
                    "[OK]".green().bold(),
                    sink.path().display()
                );
            }
        }
        None => {
            let stdout = io::stdout().lock();
            let mut sink = ConsoleSink::new(stdout);
            analyzer.run(&range, &mut sink)?;
        }
    }

    Ok(())
}

/// Ask whether a large range should go to a file. `--yes` accepts without
/// prompting; `--quiet` skips the prompt and keeps streaming to the console.
fn confirm_export(cli: &Cli, size: u64) -> Result<bool> {
    if cli.yes {
        return Ok(true);
    }
    if cli.quiet {
        return Ok(false);
    }

    eprint!(
        "{} Large range detected ({} numbers). Save the output to a file? (y/n): ",
        "[WARN]".yellow().bold(),
        size
    );
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "numscope", &mut io::stdout());
}
