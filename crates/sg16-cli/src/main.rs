//! `sg16`: compile, disassemble and run SG16 programs from the shell.

use clap::{Parser, Subcommand};
use sg16_eval::{Driver, Engine, EngineConfig, EvalError};
use sg16_types::{CompileErrors, MouseEvent, Program};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Longest headless run `run` accepts, in simulated seconds.
const MAX_RUN_SECONDS: f64 = 3600.0;

#[derive(Parser, Debug)]
#[command(name = "sg16")]
#[command(about = "SG16 bytecode machine: compiler and headless runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a program and print canonical bytecode.
    Compile {
        /// Program text (assembly or hex bytecode).
        program: PathBuf,
    },

    /// Compile a program and print it back as mnemonic assembly.
    Disasm {
        program: PathBuf,
    },

    /// Run a program headless and print the final memory snapshot as JSON.
    Run {
        program: PathBuf,

        /// Simulated run time in seconds (0 to 3600).
        #[arg(long, default_value_t = 1.0)]
        seconds: f64,

        /// JSON engine configuration (tick and frame periods).
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Left-click these grid cells right after start (can repeat).
        #[arg(long, value_name = "CELL")]
        click: Vec<u8>,

        /// Press and release these key codes right after start (can repeat).
        #[arg(long, value_name = "CODE")]
        key: Vec<u8>,

        /// Print all 256 cells instead of the snapshot.
        #[arg(long, default_value_t = false)]
        full_memory: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sg16_cli=info,sg16_eval=info,sg16_compiler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Compile { program } => {
            compile_file(&program).map(|p| sg16_compiler::bytecode_to_string(p.as_slice()))
        }
        Command::Disasm { program } => {
            compile_file(&program).map(|p| sg16_compiler::disassemble(p.as_slice()))
        }
        Command::Run {
            program,
            seconds,
            config,
            click,
            key,
            full_memory,
        } => run(&program, seconds, config.as_deref(), &click, &key, full_memory),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

fn compile_file(path: &Path) -> Result<Program, String> {
    let source = read(path)?;
    sg16_compiler::compile(&source).map_err(|errors| report(path, &errors))
}

/// Render compile errors as `file:line: [code] message` lines.
fn report(path: &Path, errors: &CompileErrors) -> String {
    let mut out = format!("{} error(s) in {}", errors.len(), path.display());
    for err in errors {
        out.push_str(&format!(
            "\n  {}:{}: [{}] {}\n    | {}",
            path.display(),
            err.line,
            err.code,
            err.message,
            err.source_line
        ));
    }
    out
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, String> {
    match path {
        Some(path) => EngineConfig::from_json_str(&read(path)?).map_err(|e| e.to_string()),
        None => Ok(EngineConfig::default()),
    }
}

fn simulated_time(seconds: f64) -> Result<Duration, String> {
    if !(0.0..=MAX_RUN_SECONDS).contains(&seconds) {
        return Err(format!(
            "--seconds must be between 0 and {MAX_RUN_SECONDS}, got {seconds}"
        ));
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("--seconds {seconds}: {e}"))
}

fn run(
    path: &Path,
    seconds: f64,
    config: Option<&Path>,
    clicks: &[u8],
    keys: &[u8],
    full_memory: bool,
) -> Result<String, String> {
    let duration = simulated_time(seconds)?;
    let config = load_config(config)?;
    let source = read(path)?;

    let mut engine = Engine::new();
    let count = engine.load(&source).map_err(|e| match e {
        EvalError::Compile(errors) => report(path, &errors),
        other => other.to_string(),
    })?;
    info!(instructions = count, "loaded {}", path.display());

    let mut driver = Driver::new(engine, &config).map_err(|e| e.to_string())?;
    driver.start();
    for &cell in clicks {
        driver.engine_mut().on_mouse_event(cell, MouseEvent::Left);
    }
    for &code in keys {
        driver.engine_mut().on_key_event(code, true);
        driver.engine_mut().on_key_event(code, false);
    }

    let step = driver.advance(duration);
    info!(ticks = step.ticks, frames = step.frames, "run finished");

    let memory = driver.engine().memory();
    let json = if full_memory {
        serde_json::to_string_pretty(memory.as_slice())
    } else {
        serde_json::to_string_pretty(&memory.snapshot())
    };
    json.map_err(|e| e.to_string())
}
