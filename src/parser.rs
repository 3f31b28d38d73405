use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AssemblerError, Result};
use crate::instructions::{Comp, Destination, Instruction, Jump, Operand, Word, A, C};
use crate::symbol_table::{DuplicateLabel, SymbolTable};

const COMMENT_BEGIN: &str = "//";

pub const MAX_INSTRUCTIONS: usize = 32768;

static LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\((\S+)\)$").unwrap());
static ADDRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@(?:(\d+)|(\S+))$").unwrap());
static COMPUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(\w{1,3})=)?(0|1|-1|[!-]?[AMD]|[AMD][+-]1|D[-+&|][AM]|[AM]-D)(?:;(J[A-Z]{2}))?$",
    )
    .unwrap()
});

/// The category of one source line, with the fields the encoder needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Blank,
    Comment,
    Label(String),
    Address(Operand),
    Compute {
        dest: String,
        comp: String,
        jump: String,
    },
    Malformed,
}

impl Line {
    fn is_instruction(&self) -> bool {
        matches!(self, Line::Address(_) | Line::Compute { .. })
    }
}

/// A classified line together with its 1-based line number and whitespace-free text.
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
    pub line: Line,
}

/// One emitted instruction, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub number: usize,
    pub text: String,
    pub word: Word,
}

fn clear_whitespace(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Classifies a single line of Hack assembly. Whitespace is not significant anywhere, and a `//`
/// ends the code part of any line.
pub fn classify(line: &str) -> Line {
    let line = clear_whitespace(line);
    if line.starts_with(COMMENT_BEGIN) {
        return Line::Comment;
    }
    let code = match line.find(COMMENT_BEGIN) {
        Some(comment_index) => &line[..comment_index],
        None => &line[..],
    };
    if code.is_empty() {
        return Line::Blank;
    }

    if let Some(caps) = ADDRESS.captures(code) {
        return match (caps.get(1), caps.get(2)) {
            (Some(digits), _) => Line::Address(Operand::Literal(digits.as_str().to_string())),
            (None, Some(symbol)) => Line::Address(Operand::Symbol(symbol.as_str().to_string())),
            (None, None) => Line::Malformed,
        };
    }
    if let Some(caps) = COMPUTE.captures(code) {
        let field = |i: usize| caps.get(i).map_or("", |m| m.as_str()).to_string();
        return Line::Compute {
            dest: field(1),
            comp: field(2),
            jump: field(3),
        };
    }
    if let Some(caps) = LABEL.captures(code) {
        return Line::Label(caps[1].to_string());
    }
    Line::Malformed
}

/// Classifies every line once. Fails on the first malformed line.
pub fn classify_all<S: AsRef<str>>(lines: &[S]) -> Result<Vec<SourceLine>> {
    lines
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let raw = raw.as_ref();
            let line = classify(raw);
            if line == Line::Malformed {
                return Err(AssemblerError::MalformedLine {
                    line: i + 1,
                    source_line: raw.trim().to_string(),
                });
            }
            Ok(SourceLine {
                number: i + 1,
                text: clear_whitespace(raw),
                line,
            })
        })
        .collect()
}

/// First pass: binds every label to the index of the instruction that follows it.
pub fn labels(lines: &[SourceLine], table: &mut SymbolTable) -> Result<usize> {
    let mut counter: usize = 0;
    for source in lines {
        match &source.line {
            Line::Label(name) => {
                // A label after the last slot of a full ROM can still be declared, but
                // encoding a reference to it fails the 15-bit check.
                let address = u16::try_from(counter).unwrap_or(u16::MAX);
                table
                    .bind_label(name, address)
                    .map_err(|DuplicateLabel| AssemblerError::DuplicateLabel {
                        label: name.clone(),
                        line: source.number,
                    })?;
            }
            line if line.is_instruction() => {
                counter += 1;
                if counter > MAX_INSTRUCTIONS {
                    return Err(AssemblerError::ProgramTooLarge { count: counter });
                }
            }
            _ => {}
        }
    }
    debug!(
        "first pass: {counter} instructions, {} labels",
        table.label_count()
    );
    Ok(counter)
}

/// Turns a classified line into an instruction, checking the compute mnemonics.
pub fn parse(source: &SourceLine) -> Result<Option<Instruction>> {
    let instruction = match &source.line {
        Line::Blank | Line::Comment | Line::Label(_) => return Ok(None),
        Line::Malformed => {
            return Err(AssemblerError::MalformedLine {
                line: source.number,
                source_line: source.text.clone(),
            })
        }
        Line::Address(operand) => Instruction::A(A::new(operand.clone())),
        Line::Compute { dest, comp, jump } => {
            let unknown = |kind: &'static str, mnemonic: &str| AssemblerError::UnknownMnemonic {
                kind,
                mnemonic: mnemonic.to_string(),
                line: source.number,
            };
            Instruction::C(C::new(
                Destination::new(dest).ok_or_else(|| unknown("dest", dest.as_str()))?,
                Comp::new(comp).ok_or_else(|| unknown("comp", comp.as_str()))?,
                Jump::new(jump).ok_or_else(|| unknown("jump", jump.as_str()))?,
            ))
        }
    };
    Ok(Some(instruction))
}

fn resolve(operand: &Operand, number: usize, table: &mut SymbolTable) -> Result<u16> {
    let address = match operand {
        Operand::Literal(digits) => {
            digits
                .parse::<u16>()
                .map_err(|_| AssemblerError::OperandOutOfRange {
                    value: digits.clone(),
                    line: number,
                })?
        }
        Operand::Symbol(name) => match table.lookup(name) {
            Some(address) => address,
            None => {
                table
                    .bind_variable(name)
                    .ok_or_else(|| AssemblerError::VariableSpaceExhausted {
                        name: name.clone(),
                        line: number,
                    })?
            }
        },
    };
    A::encode(address).ok_or_else(|| AssemblerError::OperandOutOfRange {
        value: address.to_string(),
        line: number,
    })
}

/// Second pass: resolves symbols, allocating variables in order of first use, and encodes every
/// instruction.
pub fn encode(lines: &[SourceLine], table: &mut SymbolTable) -> Result<Vec<Encoded>> {
    let mut encoded = Vec::new();
    for source in lines {
        let word = match parse(source)? {
            None => continue,
            Some(Instruction::A(a)) => resolve(&a.operand, source.number, table)?,
            Some(Instruction::C(c)) => c.encode(),
        };
        trace!("{} {}", source.text, Word(word));
        encoded.push(Encoded {
            number: source.number,
            text: source.text.clone(),
            word: Word(word),
        });
    }
    debug!(
        "second pass: {} words, {} variables",
        encoded.len(),
        table.variable_count()
    );
    Ok(encoded)
}

#[cfg(test)]
mod test {
    use super::*;

    fn compute(dest: &str, comp: &str, jump: &str) -> Line {
        Line::Compute {
            dest: dest.to_string(),
            comp: comp.to_string(),
            jump: jump.to_string(),
        }
    }

    #[test]
    fn classify_trivial_lines() {
        assert_eq!(classify(""), Line::Blank);
        assert_eq!(classify(" \t "), Line::Blank);
        assert_eq!(classify("// a comment"), Line::Comment);
        assert_eq!(classify("   //indented"), Line::Comment);
        assert_eq!(classify("%%%"), Line::Malformed);
    }

    #[test]
    fn classify_labels() {
        assert_eq!(classify("(LOOP)"), Line::Label("LOOP".to_string()));
        assert_eq!(classify(" ( END ) // done"), Line::Label("END".to_string()));
        assert_eq!(classify("()"), Line::Malformed);
        assert_eq!(classify("(LOOP"), Line::Malformed);
    }

    #[test]
    fn classify_addresses() {
        assert_eq!(
            classify("@21"),
            Line::Address(Operand::Literal("21".to_string()))
        );
        assert_eq!(
            classify("  @sum // running total"),
            Line::Address(Operand::Symbol("sum".to_string()))
        );
        assert_eq!(
            classify("@1st"),
            Line::Address(Operand::Symbol("1st".to_string()))
        );
        assert_eq!(classify("@"), Line::Malformed);
    }

    #[test]
    fn classify_computes() {
        assert_eq!(classify("D=A"), compute("D", "A", ""));
        assert_eq!(classify("0;JMP"), compute("", "0", "JMP"));
        assert_eq!(classify("AM = M - 1 ; JNE // x"), compute("AM", "M-1", "JNE"));
        assert_eq!(classify("M=-1"), compute("M", "-1", ""));
        assert_eq!(classify("D;JGT"), compute("", "D", "JGT"));
        assert_eq!(classify("D=M-D"), compute("D", "M-D", ""));
        assert_eq!(classify("D=A+D"), Line::Malformed);
        assert_eq!(classify("D=2"), Line::Malformed);
        assert_eq!(classify("D=A;JUMP"), Line::Malformed);
        assert_eq!(classify("ADMX=A"), Line::Malformed);
    }

    #[test]
    fn unknown_dest_is_an_error() {
        let lines = classify_all(&["XY=D"]).unwrap();
        assert!(matches!(
            parse(&lines[0]),
            Err(AssemblerError::UnknownMnemonic { kind: "dest", line: 1, .. })
        ));
        let lines = classify_all(&["D;JZZ"]).unwrap();
        assert!(matches!(
            parse(&lines[0]),
            Err(AssemblerError::UnknownMnemonic { kind: "jump", .. })
        ));
    }

    #[test]
    fn malformed_line_number() {
        let err = classify_all(&["@1", "", "D=D+", "@2"]).unwrap_err();
        assert!(matches!(err, AssemblerError::MalformedLine { line: 3, .. }));
    }

    #[test]
    fn labels_bind_to_next_instruction() {
        let lines = classify_all(&["// start", "(A1)", "(A2)", "@0", "", "D=A", "(END)"]).unwrap();
        let mut table = SymbolTable::new();
        assert_eq!(labels(&lines, &mut table).unwrap(), 2);
        assert_eq!(table.lookup("A1"), Some(0));
        assert_eq!(table.lookup("A2"), Some(0));
        assert_eq!(table.lookup("END"), Some(2));
    }

    #[test]
    fn duplicate_label_at_same_index() {
        let lines = classify_all(&["(X)", "(X)", "@0"]).unwrap();
        let mut table = SymbolTable::new();
        assert!(matches!(
            labels(&lines, &mut table),
            Err(AssemblerError::DuplicateLabel { line: 2, .. })
        ));
    }

    #[test]
    fn literal_range() {
        let lines = classify_all(&["@32767", "@32768", "@999999999999"]).unwrap();
        let mut table = SymbolTable::new();
        assert_eq!(resolve_line(&lines[0], &mut table).unwrap(), 32767);
        assert!(matches!(
            resolve_line(&lines[1], &mut table),
            Err(AssemblerError::OperandOutOfRange { line: 2, .. })
        ));
        assert!(matches!(
            resolve_line(&lines[2], &mut table),
            Err(AssemblerError::OperandOutOfRange { line: 3, .. })
        ));
    }

    fn resolve_line(source: &SourceLine, table: &mut SymbolTable) -> Result<u16> {
        match &source.line {
            Line::Address(operand) => resolve(operand, source.number, table),
            other => panic!("not an address: {other:?}"),
        }
    }

    #[test]
    fn variables_follow_encoding_order() {
        let lines = classify_all(&["@b", "@a", "(a)", "@b", "@c"]).unwrap();
        let mut table = SymbolTable::new();
        labels(&lines, &mut table).unwrap();
        let words: Vec<u16> = encode(&lines, &mut table)
            .unwrap()
            .iter()
            .map(|e| e.word.0)
            .collect();
        assert_eq!(words, vec![16, 2, 16, 17]);
    }
}
