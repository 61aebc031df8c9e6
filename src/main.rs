use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use hydro::toolchain::Toolchain;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Compile a hydro source file into a Linux x86-64 executable")]
struct Cli {
    /// Source file to compile
    input: PathBuf,

    /// Executable path; the assembly and object files are written next to it
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// Stop after writing the assembly file
    #[arg(short = 'S', long)]
    emit_asm: bool,

    /// Assembler command, run as `<cmd> -felf64 <asm> -o <obj>`
    #[arg(long, default_value = "nasm")]
    assembler: String,

    /// Linker command, run as `<cmd> -o <exe> <obj>`
    #[arg(long, default_value = "ld")]
    linker: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// Appends, never replaces: `out.exe` -> `out.exe.asm`.
fn with_suffix(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let asm = hydro::compile(&source)
        .with_context(|| format!("compiling {}", cli.input.display()))?;

    let asm_path = with_suffix(&cli.output, "asm");
    fs::write(&asm_path, &asm).with_context(|| format!("writing {}", asm_path.display()))?;
    info!(path = %asm_path.display(), "wrote assembly");
    if cli.emit_asm {
        return Ok(());
    }

    let toolchain = Toolchain {
        assembler: cli.assembler.clone(),
        linker: cli.linker.clone(),
    };
    let obj_path = with_suffix(&cli.output, "o");
    toolchain
        .assemble(&asm_path, &obj_path)
        .context("assembling")?;
    toolchain.link(&obj_path, &cli.output).context("linking")?;
    info!(path = %cli.output.display(), "linked executable");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => {
            if !cli.emit_asm {
                println!("[ok] built {}", cli.output.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
