//! Assembler for the Hack computer: translates `.asm` source into `.hack` binary text.
//!
//! ```
//! let hack = hackasm::assemble_str("@2\nD=A\n").unwrap();
//! assert_eq!(hack, "0000000000000010\n1110110000010000\n");
//! ```

use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use log::info;

pub mod error;
pub mod instructions;
pub mod parser;
pub mod symbol_table;

pub use error::{AssemblerError, Result};
pub use instructions::Word;
pub use parser::{Encoded, MAX_INSTRUCTIONS};
pub use symbol_table::SymbolTable;

pub const ASM_FILE_EXTENSION: &str = "asm";
pub const HACK_FILE_EXTENSION: &str = "hack";

/// Assembles a program and returns each emitted instruction with the line it came from.
pub fn assemble_listing<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Encoded>> {
    let lines = parser::classify_all(lines)?;
    let mut symbols = SymbolTable::new();
    parser::labels(&lines, &mut symbols)?;
    parser::encode(&lines, &mut symbols)
}

/// Assembles a program into its machine words, in source order.
pub fn assemble<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Word>> {
    Ok(assemble_listing(lines)?
        .into_iter()
        .map(|encoded| encoded.word)
        .collect())
}

/// Renders words as `.hack` text: one 16-character line per word.
pub fn to_hack(words: &[Word]) -> String {
    words.iter().map(|word| format!("{word}\n")).collect()
}

/// Assembles source text into `.hack` text.
pub fn assemble_str(source: &str) -> Result<String> {
    let lines: Vec<&str> = source.lines().collect();
    Ok(to_hack(&assemble(&lines)?))
}

/// Buffers every line of `reader` so both passes can walk them, then assembles.
pub fn assemble_reader<R: BufRead>(reader: R) -> Result<String> {
    let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
    Ok(to_hack(&assemble(&lines)?))
}

/// `Prog.asm` becomes `Prog.hack`, next to the input.
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension(HACK_FILE_EXTENSION)
}

/// Assembles `input` and writes the result to `output`. Nothing is written unless the whole
/// program assembles. Returns the number of instructions written.
pub fn assemble_file(input: &Path, output: &Path) -> Result<usize> {
    let contents = fs::read_to_string(input)?;
    let lines: Vec<&str> = contents.lines().collect();
    let words = assemble(&lines)?;
    fs::write(output, to_hack(&words))?;
    info!(
        "{} -> {} ({} instructions)",
        input.display(),
        output.display(),
        words.len()
    );
    Ok(words.len())
}
