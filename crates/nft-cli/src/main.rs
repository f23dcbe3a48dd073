use atty::Stream;
use clap::Parser;
use color_eyre::Result;

mod cli;
mod dispatch;
mod outcome;
mod style;

use cli::NftCli;
use outcome::{CommandStatus, ExecutionOutcome};
use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = NftCli::parse();
    init_tracing(cli.trace, cli.verbose);

    let outcome = dispatch::execute(&cli);
    let code = emit_output(&cli, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8) {
    let level = if trace {
        "trace"
    } else {
        match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("nft_core={level},nft_cli={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn emit_output(cli: &NftCli, outcome: &ExecutionOutcome) -> Result<i32> {
    let code = outcome.status.exit_code();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
        return Ok(code);
    }

    if outcome.status == CommandStatus::Ok {
        if cli.quiet {
            return Ok(code);
        }
        let style = Style::new(cli.no_color, atty::is(Stream::Stdout));
        if outcome.lines.is_empty() {
            println!("{}", style.status(outcome.status, &outcome.message));
        } else {
            for line in &outcome.lines {
                println!("{line}");
            }
        }
    } else {
        let style = Style::new(cli.no_color, atty::is(Stream::Stderr));
        eprintln!("{}", style.status(outcome.status, &outcome.message));
        if let Some(hint) = outcome.hint() {
            eprintln!("{}", style.hint(hint));
        }
    }

    Ok(code)
}
