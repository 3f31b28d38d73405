use std::fmt;

use crate::symbol_table::MAX_ADDRESS;

/// An executable Hack instruction, after classification and before symbol resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    A(A),
    C(C),
}

/// The operand of an A instruction as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Decimal digits, kept as text until the range check in [A::encode].
    Literal(String),
    Symbol(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A {
    pub operand: Operand,
}

impl A {
    pub fn new(operand: Operand) -> Self {
        Self { operand }
    }

    /// `0vvvvvvvvvvvvvvv`. `None` if the address needs more than 15 bits.
    pub fn encode(address: u16) -> Option<u16> {
        (address <= MAX_ADDRESS).then_some(address)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    None,
    A,
    M,
    D,
    MD,
    AM,
    AD,
    AMD,
}

impl Destination {
    pub fn new(dest: &str) -> Option<Destination> {
        Some(match dest {
            "" => Destination::None,
            "A" => Destination::A,
            "M" => Destination::M,
            "D" => Destination::D,
            "MD" => Destination::MD,
            "AM" => Destination::AM,
            "AD" => Destination::AD,
            "AMD" => Destination::AMD,
            _ => return None,
        })
    }

    pub fn bits(self) -> u16 {
        match self {
            Destination::None => 0b000,
            Destination::M => 0b001,
            Destination::D => 0b010,
            Destination::MD => 0b011,
            Destination::A => 0b100,
            Destination::AM => 0b101,
            Destination::AD => 0b110,
            Destination::AMD => 0b111,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    None,
    JGT,
    JEQ,
    JGE,
    JLT,
    JNE,
    JLE,
    JMP,
}

impl Jump {
    pub fn new(jump: &str) -> Option<Jump> {
        Some(match jump {
            "" => Jump::None,
            "JGT" => Jump::JGT,
            "JEQ" => Jump::JEQ,
            "JGE" => Jump::JGE,
            "JLT" => Jump::JLT,
            "JNE" => Jump::JNE,
            "JLE" => Jump::JLE,
            "JMP" => Jump::JMP,
            _ => return None,
        })
    }

    pub fn bits(self) -> u16 {
        match self {
            Jump::None => 0b000,
            Jump::JGT => 0b001,
            Jump::JEQ => 0b010,
            Jump::JGE => 0b011,
            Jump::JLT => 0b100,
            Jump::JNE => 0b101,
            Jump::JLE => 0b110,
            Jump::JMP => 0b111,
        }
    }
}

/// ALU computations. The A and M forms share their c-bits and differ only in the a bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comp {
    Zero,
    One,
    MinusOne,
    D,
    A,
    M,
    NotD,
    NotA,
    NotM,
    MinusD,
    MinusA,
    MinusM,
    DPlusOne,
    APlusOne,
    MPlusOne,
    DMinusOne,
    AMinusOne,
    MMinusOne,
    DPlusA,
    DPlusM,
    DMinusA,
    DMinusM,
    AMinusD,
    MMinusD,
    DAndA,
    DAndM,
    DOrA,
    DOrM,
}

impl Comp {
    pub fn new(comp: &str) -> Option<Comp> {
        Some(match comp {
            "0" => Comp::Zero,
            "1" => Comp::One,
            "-1" => Comp::MinusOne,
            "D" => Comp::D,
            "A" => Comp::A,
            "M" => Comp::M,
            "!D" => Comp::NotD,
            "!A" => Comp::NotA,
            "!M" => Comp::NotM,
            "-D" => Comp::MinusD,
            "-A" => Comp::MinusA,
            "-M" => Comp::MinusM,
            "D+1" => Comp::DPlusOne,
            "A+1" => Comp::APlusOne,
            "M+1" => Comp::MPlusOne,
            "D-1" => Comp::DMinusOne,
            "A-1" => Comp::AMinusOne,
            "M-1" => Comp::MMinusOne,
            "D+A" => Comp::DPlusA,
            "D+M" => Comp::DPlusM,
            "D-A" => Comp::DMinusA,
            "D-M" => Comp::DMinusM,
            "A-D" => Comp::AMinusD,
            "M-D" => Comp::MMinusD,
            "D&A" => Comp::DAndA,
            "D&M" => Comp::DAndM,
            "D|A" => Comp::DOrA,
            "D|M" => Comp::DOrM,
            _ => return None,
        })
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Comp::Zero => "0",
            Comp::One => "1",
            Comp::MinusOne => "-1",
            Comp::D => "D",
            Comp::A => "A",
            Comp::M => "M",
            Comp::NotD => "!D",
            Comp::NotA => "!A",
            Comp::NotM => "!M",
            Comp::MinusD => "-D",
            Comp::MinusA => "-A",
            Comp::MinusM => "-M",
            Comp::DPlusOne => "D+1",
            Comp::APlusOne => "A+1",
            Comp::MPlusOne => "M+1",
            Comp::DMinusOne => "D-1",
            Comp::AMinusOne => "A-1",
            Comp::MMinusOne => "M-1",
            Comp::DPlusA => "D+A",
            Comp::DPlusM => "D+M",
            Comp::DMinusA => "D-A",
            Comp::DMinusM => "D-M",
            Comp::AMinusD => "A-D",
            Comp::MMinusD => "M-D",
            Comp::DAndA => "D&A",
            Comp::DAndM => "D&M",
            Comp::DOrA => "D|A",
            Comp::DOrM => "D|M",
        }
    }

    /// The a bit: set when the computation reads RAM[A].
    pub fn reads_memory(self) -> bool {
        self.mnemonic().contains('M')
    }

    /// The six c-bits.
    pub fn bits(self) -> u16 {
        match self {
            Comp::Zero => 0b101010,
            Comp::One => 0b111111,
            Comp::MinusOne => 0b111010,
            Comp::D => 0b001100,
            Comp::A | Comp::M => 0b110000,
            Comp::NotD => 0b001101,
            Comp::NotA | Comp::NotM => 0b110001,
            Comp::MinusD => 0b001111,
            Comp::MinusA | Comp::MinusM => 0b110011,
            Comp::DPlusOne => 0b011111,
            Comp::APlusOne | Comp::MPlusOne => 0b110111,
            Comp::DMinusOne => 0b001110,
            Comp::AMinusOne | Comp::MMinusOne => 0b110010,
            Comp::DPlusA | Comp::DPlusM => 0b000010,
            Comp::DMinusA | Comp::DMinusM => 0b010011,
            Comp::AMinusD | Comp::MMinusD => 0b000111,
            Comp::DAndA | Comp::DAndM => 0b000000,
            Comp::DOrA | Comp::DOrM => 0b010101,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct C {
    pub dest: Destination,
    pub comp: Comp,
    pub jump: Jump,
}

impl C {
    pub fn new(dest: Destination, comp: Comp, jump: Jump) -> Self {
        Self { dest, comp, jump }
    }

    /// `111a cccc ccdd djjj`
    pub fn encode(&self) -> u16 {
        0b111 << 13
            | (self.comp.reads_memory() as u16) << 12
            | self.comp.bits() << 6
            | self.dest.bits() << 3
            | self.jump.bits()
    }
}

/// A 16-bit machine word, displayed as it appears in a `.hack` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word(pub u16);

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016b}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn c(dest: &str, comp: &str, jump: &str) -> String {
        let c = C::new(
            Destination::new(dest).unwrap(),
            Comp::new(comp).unwrap(),
            Jump::new(jump).unwrap(),
        );
        Word(c.encode()).to_string()
    }

    #[test]
    fn a_instruction() {
        assert_eq!(Word(A::encode(2).unwrap()).to_string(), "0000000000000010");
        assert_eq!(Word(A::encode(32767).unwrap()).to_string(), "0111111111111111");
        assert_eq!(A::encode(32768), None);
    }

    #[test]
    fn c_instruction() {
        assert_eq!(c("D", "A", ""), "1110110000010000");
        assert_eq!(c("D", "D+A", ""), "1110000010010000");
        assert_eq!(c("M", "D", ""), "1110001100001000");
        assert_eq!(c("", "0", "JMP"), "1110101010000111");
        assert_eq!(c("AMD", "M-1", "JLE"), "1111110010111110");
        assert_eq!(c("MD", "D|M", "JNE"), "1111010101011101");
    }

    #[test]
    fn a_bit_follows_memory_operand() {
        assert!(!Comp::new("D&A").unwrap().reads_memory());
        assert!(Comp::new("D&M").unwrap().reads_memory());
        assert_eq!(Comp::new("A-D").unwrap().bits(), Comp::new("M-D").unwrap().bits());
    }

    #[test]
    fn mnemonics_round_trip() {
        for m in ["0", "-1", "!M", "D-1", "A+1", "D-M", "D|A"] {
            assert_eq!(Comp::new(m).unwrap().mnemonic(), m);
        }
        assert_eq!(Comp::new("A+D"), None);
        assert_eq!(Destination::new("DM"), None);
        assert_eq!(Jump::new("JNZ"), None);
    }
}
