use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use hackasm::{assemble_listing, output_path, to_hack, Encoded, Word, ASM_FILE_EXTENSION};
use log::info;

/// Hack assembler: translates .asm source into .hack binary text
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Assembly source to translate
    input: PathBuf,

    /// Where to write the binary text (defaults to the input with a .hack extension)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Write the binary text to standard output instead of a file
    #[clap(long, conflicts_with = "output")]
    stdout: bool,

    /// Print every instruction next to its encoding
    #[clap(long)]
    listing: bool,
}

fn main() -> Result<()> {
    let env = env_logger::Env::default()
        .filter_or("HACKASM_LOG", "warn")
        .write_style_or("HACKASM_LOG_STYLE", "auto");
    env_logger::init_from_env(env);

    let args = Args::parse();
    let input_path = check_input(&args.input)?;

    let contents = fs::read_to_string(&input_path)
        .with_context(|| format!("failed to read {}", input_path.display()))?;
    let lines: Vec<&str> = contents.lines().collect();
    let listing = assemble_listing(&lines)
        .with_context(|| format!("failed to assemble {}", input_path.display()))?;

    if args.listing {
        print_listing(&listing)?;
    }

    let words: Vec<Word> = listing.iter().map(|encoded| encoded.word).collect();
    let hack = to_hack(&words);
    if args.stdout {
        io::stdout().write_all(hack.as_bytes())?;
        return Ok(());
    }

    let output = args.output.unwrap_or_else(|| output_path(&input_path));
    fs::write(&output, hack).with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        "{} -> {} ({} instructions)",
        input_path.display(),
        output.display(),
        words.len()
    );
    Ok(())
}

fn check_input(path: &Path) -> Result<PathBuf> {
    let input_path =
        fs::canonicalize(path).with_context(|| format!("invalid path {}", path.display()))?;
    if input_path.is_dir() {
        bail!("directories are not supported");
    }
    let extension = input_path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if extension != ASM_FILE_EXTENSION {
        bail!("expected asm file, got {}", input_path.display());
    }
    Ok(input_path)
}

fn print_listing(listing: &[Encoded]) -> Result<()> {
    let mut out = io::stdout().lock();
    for encoded in listing {
        writeln!(out, "{:>5}  {}  {}", encoded.number, encoded.word, encoded.text)?;
    }
    Ok(())
}
