use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use nft_core::SymbolRequest;

pub const NFT_BEFORE_HELP: &str = concat!(
    "nft ",
    env!("CARGO_PKG_VERSION"),
    " – Native file tests fixture index\n\n",
    "\x1b[1;36mLookups\x1b[0m\n",
    "  exec / object    Print the executable or object file recorded for a test.\n",
    "  list             Print every recorded artifact path.\n",
    "  check            Report recorded artifacts missing from disk.\n",
    "  symbols          Print function addresses and sizes of a test executable.\n\n",
    "\x1b[1;36mBuild scripts\x1b[0m\n",
    "  module           Render Rust constants with executable paths.\n",
    "  extract          Unpack a fixture bundle zip into the fixture directory.\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "nft",
    author,
    version,
    disable_help_subcommand = true,
    before_help = NFT_BEFORE_HELP
)]
pub struct NftCli {
    #[arg(
        long,
        env = "NFT_DIR",
        help = "Directory holding the sidecars and artifacts",
        global = true
    )]
    pub dir: Option<PathBuf>,
    #[arg(
        long,
        env = "NFT_PLATFORM",
        help = "Platform to filter on (linux, darwin, or any); defaults to the host",
        global = true
    )]
    pub platform: Option<String>,
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: CommandCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandCli {
    #[command(
        about = "Print the executable recorded for a test name.",
        override_usage = "nft exec <NAME>"
    )]
    Exec(NameArgs),
    #[command(
        about = "Print an object file recorded for a test name.",
        override_usage = "nft object <NAME>"
    )]
    Object(NameArgs),
    #[command(about = "Print every recorded artifact path.")]
    List(ListArgs),
    #[command(about = "Report recorded artifacts that are missing on disk.")]
    Check,
    #[command(
        about = "Print function symbols of the executable recorded for a test name.",
        override_usage = "nft symbols <NAME> [SYMBOL...]"
    )]
    Symbols(SymbolsArgs),
    #[command(
        about = "Render a Rust module with <NAME>_EXEC_PATH and symbol constants.",
        override_usage = "nft module <NAME>... [--symbol BASE:SYMBOL[=CONST]]... [--out FILE]"
    )]
    Module(ModuleArgs),
    #[command(
        about = "Unpack a fixture bundle zip (skipped when the destination exists).",
        override_usage = "nft extract <ZIP> [--dest DIR]"
    )]
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
pub struct NameArgs {
    #[arg(value_name = "NAME", help = "Test base name, e.g. simple-debug-noopt-dynamic")]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long, help = "Only list object files")]
    pub objects: bool,
    #[arg(long, help = "Only list executables")]
    pub executables: bool,
}

#[derive(Args, Debug)]
pub struct ModuleArgs {
    #[arg(value_name = "NAME", required = true, num_args = 1..)]
    pub names: Vec<String>,
    #[arg(
        long = "symbol",
        value_name = "BASE:SYMBOL[=CONST]",
        help = "Add address and _LENGTH constants for a function of a test executable"
    )]
    pub symbols: Vec<SymbolRequest>,
    #[arg(long, value_name = "FILE", help = "Write the module here instead of stdout")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SymbolsArgs {
    #[arg(value_name = "NAME", help = "Test base name, e.g. waitthread-debug-noopt-dynamic")]
    pub name: String,
    #[arg(value_name = "SYMBOL", help = "Only print these symbols (all when omitted)")]
    pub symbols: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[arg(value_name = "ZIP")]
    pub bundle: PathBuf,
    #[arg(long, value_name = "DIR", help = "Destination; defaults to --dir / NFT_DIR")]
    pub dest: Option<PathBuf>,
}
