// objfile.rs
//
// The caller-visible facade: accumulate symbols and a code blob, then
// hand everything to the layout writer in one shot.

use crate::elf::Class;
use crate::error::Result;
use crate::symbols::Symbol;
use crate::writer::ElfWriter;

/// A synthetic symbols file under construction.
///
/// Collects function/object/generic symbols plus an opaque code payload,
/// then writes a relocatable object that debuggers and disassemblers can
/// use to resolve the names at the given addresses.
pub struct ElfFile {
    class: Class,
    machine: Option<u16>,
    symbols: Vec<Symbol>,
    code: Vec<u8>,
    code_addr: u64,
}

impl ElfFile {
    /// Create a 32-bit or 64-bit ELF file; any other pointer width is a
    /// configuration error.
    pub fn new(ptr_width: u32) -> Result<Self> {
        Ok(Self {
            class: Class::from_ptr_width(ptr_width)?,
            machine: None,
            symbols: Vec::new(),
            // Placeholder payload (three x86 nops); symbols only need a
            // section to point at, not real code.
            code: vec![0x90, 0x90, 0x90],
            code_addr: 0,
        })
    }

    /// Replace the placeholder code payload. The bytes are opaque and
    /// emitted verbatim as the `.text` section at `addr`.
    pub fn set_code(&mut self, data: Vec<u8>, addr: u64) {
        self.code = data;
        self.code_addr = addr;
    }

    /// Override the machine type recorded in the file header.
    pub fn set_machine(&mut self, machine: u16) {
        self.machine = Some(machine);
    }

    /// If you don't know whether the symbol is a function or a variable,
    /// use this.
    pub fn add_generic(&mut self, name: &str, addr: u64, size: u64, bind: u8) {
        self.symbols.push(Symbol::generic(name, addr, size, bind));
    }

    /// Use this if you know the symbol is a function.
    pub fn add_function(&mut self, name: &str, addr: u64, size: u64, bind: u8) {
        self.symbols.push(Symbol::function(name, addr, size, bind));
    }

    /// Use this if you know the symbol is a global or local variable.
    pub fn add_object(&mut self, name: &str, addr: u64, size: u64, bind: u8) {
        self.symbols.push(Symbol::object(name, addr, size, bind));
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Write the object file to `path`, overwriting any existing file.
    /// A fresh writer is built per call, so repeated writes of the same
    /// accumulated state produce identical files.
    pub fn write(&self, path: &str) -> Result<()> {
        let mut writer = ElfWriter::with_class(self.class);
        if let Some(machine) = self.machine {
            writer.set_machine(machine);
        }
        writer.add_code_section(self.code.clone(), self.code_addr);
        writer.add_symbols(&self.symbols);
        writer.write(path)
    }
}
