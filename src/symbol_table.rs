use std::collections::HashMap;

use log::trace;

/// First RAM address handed out to user variables.
pub const VARIABLE_START: u16 = 16;

/// Highest address an A instruction can load.
pub const MAX_ADDRESS: u16 = 0x7FFF;

const PREDEFINED: [(&str, u16); 23] = [
    ("R0", 0),
    ("R1", 1),
    ("R2", 2),
    ("R3", 3),
    ("R4", 4),
    ("R5", 5),
    ("R6", 6),
    ("R7", 7),
    ("R8", 8),
    ("R9", 9),
    ("R10", 10),
    ("R11", 11),
    ("R12", 12),
    ("R13", 13),
    ("R14", 14),
    ("R15", 15),
    ("SCREEN", 16384),
    ("KBD", 24576),
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
];

/// Returned by [SymbolTable::bind_label] when the label already has an address.
#[derive(Debug, PartialEq, Eq)]
pub struct DuplicateLabel;

/// Represents the symbol table used for translating A instructions from names to locations in the
/// ROM (labels) or the RAM (predefined symbols and variables).
///
/// Predefined symbols are looked up first, so a label that reuses a predefined name is shadowed.
#[derive(Debug)]
pub struct SymbolTable {
    predefined: HashMap<&'static str, u16>,
    labels: HashMap<String, u16>,
    variables: HashMap<String, u16>,
    next_variable: u16,
}

impl SymbolTable {
    /// Creates a new symbol table. Includes the default values from the Hack platform, such as
    /// register locations, the screen, the keyboard, and the VM segment pointers.
    /// # Example
    /// ```
    /// let symbol_table = hackasm::SymbolTable::new();
    /// assert_eq!(symbol_table.lookup("SCREEN"), Some(16384));
    /// ```
    pub fn new() -> Self {
        Self {
            predefined: HashMap::from(PREDEFINED),
            labels: HashMap::new(),
            variables: HashMap::new(),
            next_variable: VARIABLE_START,
        }
    }

    /// Resolves a name: predefined symbols, then labels, then variables.
    pub fn lookup(&self, name: &str) -> Option<u16> {
        self.predefined
            .get(name)
            .or_else(|| self.labels.get(name))
            .or_else(|| self.variables.get(name))
            .copied()
    }

    /// Binds a label to an instruction address. Fails if the label was bound before.
    pub fn bind_label(&mut self, name: &str, address: u16) -> Result<(), DuplicateLabel> {
        if self.labels.contains_key(name) {
            return Err(DuplicateLabel);
        }
        trace!("label {name} -> {address}");
        self.labels.insert(name.to_string(), address);
        Ok(())
    }

    /// Returns the address of a variable, allocating the next free one on first use.
    ///
    /// Returns `None` once the 15-bit address space is used up.
    pub fn bind_variable(&mut self, name: &str) -> Option<u16> {
        if let Some(&address) = self.variables.get(name) {
            return Some(address);
        }
        if self.next_variable > MAX_ADDRESS {
            return None;
        }
        let address = self.next_variable;
        trace!("variable {name} -> {address}");
        self.variables.insert(name.to_string(), address);
        self.next_variable += 1;
        Some(address)
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
