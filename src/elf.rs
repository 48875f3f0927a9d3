// ELF binary format definitions for relocatable object files
//
// This module provides the fixed-layout records (file header, section
// header, symbol entry) in their 32-bit and 64-bit little-endian variants,
// plus the string table builder. Everything here is write-only: records
// encode to bytes, nothing decodes.
//
// Reference: Tool Interface Standard (TIS) ELF Specification 1.2

use crate::error::{ElfError, Result};
use std::collections::HashMap;

// ============================================================================
// ELF Constants
// ============================================================================

// ELF Identification
pub const EI_MAG0: u8 = 0x7f;
pub const EI_MAG1: u8 = b'E';
pub const EI_MAG2: u8 = b'L';
pub const EI_MAG3: u8 = b'F';
pub const ELFCLASS32: u8 = 1;
pub const ELFCLASS64: u8 = 2;
pub const ELFDATA2LSB: u8 = 1; // little endian
pub const EI_VERSION: u8 = 1; // EV_CURRENT
pub const EI_OSABI: u8 = 0; // ELFOSABI_SYSV
pub const EI_ABIVERSION: u8 = 0;

// ELF File Types
pub const ET_REL: u16 = 1; // Relocatable file

// Machine Types
pub const EM_NONE: u16 = 0;
pub const EM_386: u16 = 3;
pub const EM_X86_64: u16 = 62;

// Object File Version
pub const EV_CURRENT: u32 = 1;

// Section Types
pub const SHT_NULL: u32 = 0;
pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;

// Section Flags
pub const SHF_ALLOC: u64 = 0x2;
pub const SHF_EXECINSTR: u64 = 0x4;

// Symbol Binding
pub const STB_LOCAL: u8 = 0;
pub const STB_GLOBAL: u8 = 1;

// Symbol Types
pub const STT_NOTYPE: u8 = 0;
pub const STT_OBJECT: u8 = 1;
pub const STT_FUNC: u8 = 2;

// Special Section Indices
pub const SHN_UNDEF: u16 = 0;

// ============================================================================
// Word Width Selection
// ============================================================================

/// ELF class, selected once at writer construction and threaded through
/// every encoding call. All record sizes derive from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Elf32,
    Elf64,
}

impl Class {
    /// Map a pointer width in bits to a class; anything but 32 or 64 is
    /// rejected up front.
    pub fn from_ptr_width(bits: u32) -> Result<Self> {
        match bits {
            32 => Ok(Class::Elf32),
            64 => Ok(Class::Elf64),
            other => Err(ElfError::UnsupportedWidth(other)),
        }
    }

    pub fn ei_class(self) -> u8 {
        match self {
            Class::Elf32 => ELFCLASS32,
            Class::Elf64 => ELFCLASS64,
        }
    }

    /// On-disk size of the file header (52 for ELF-32, 64 for ELF-64).
    pub fn ehdr_size(self) -> u64 {
        match self {
            Class::Elf32 => 52,
            Class::Elf64 => 64,
        }
    }

    /// On-disk size of one section header entry.
    pub fn shdr_size(self) -> u64 {
        match self {
            Class::Elf32 => 40,
            Class::Elf64 => 64,
        }
    }

    /// On-disk size of one symbol table entry.
    pub fn sym_size(self) -> u64 {
        match self {
            Class::Elf32 => 16,
            Class::Elf64 => 24,
        }
    }
}

// ============================================================================
// ELF Data Structures
// ============================================================================

/// ELF File Header
///
/// Fields are held at 64-bit width; `encode` narrows them for ELF-32.
#[derive(Debug, Clone)]
pub struct ElfHeader {
    pub e_type: u16,      // Object file type
    pub e_machine: u16,   // Machine type
    pub e_version: u32,   // Object file version
    pub e_entry: u64,     // Entry point address
    pub e_phoff: u64,     // Program header offset
    pub e_shoff: u64,     // Section header offset
    pub e_flags: u32,     // Processor-specific flags
    pub e_phentsize: u16, // Program header entry size
    pub e_phnum: u16,     // Number of program headers
    pub e_shnum: u16,     // Number of section headers
    pub e_shstrndx: u16,  // Section name string table index
}

impl ElfHeader {
    /// Create a header for a relocatable object with no program headers.
    pub fn new(machine: u16) -> Self {
        Self {
            e_type: ET_REL,
            e_machine: machine,
            e_version: EV_CURRENT,
            e_entry: 0,
            e_phoff: 0,
            e_shoff: 0,
            e_flags: 0,
            e_phentsize: 0,
            e_phnum: 0,
            e_shnum: 0,
            e_shstrndx: 0,
        }
    }

    /// Encode to 52 (ELF-32) or 64 (ELF-64) bytes of little-endian binary.
    /// e_ehsize and e_shentsize are computed from the class rather than
    /// stored, so the two widths cannot disagree with their own layout.
    pub fn encode(&self, class: Class) -> Vec<u8> {
        let mut e_ident = [0u8; 16];
        e_ident[0] = EI_MAG0;
        e_ident[1] = EI_MAG1;
        e_ident[2] = EI_MAG2;
        e_ident[3] = EI_MAG3;
        e_ident[4] = class.ei_class();
        e_ident[5] = ELFDATA2LSB;
        e_ident[6] = EI_VERSION;
        e_ident[7] = EI_OSABI;
        e_ident[8] = EI_ABIVERSION;
        // Bytes 9-15 are padding (already zeroed)

        let mut bytes = Vec::with_capacity(class.ehdr_size() as usize);
        bytes.extend_from_slice(&e_ident);
        bytes.extend_from_slice(&self.e_type.to_le_bytes());
        bytes.extend_from_slice(&self.e_machine.to_le_bytes());
        bytes.extend_from_slice(&self.e_version.to_le_bytes());
        match class {
            Class::Elf32 => {
                bytes.extend_from_slice(&(self.e_entry as u32).to_le_bytes());
                bytes.extend_from_slice(&(self.e_phoff as u32).to_le_bytes());
                bytes.extend_from_slice(&(self.e_shoff as u32).to_le_bytes());
            }
            Class::Elf64 => {
                bytes.extend_from_slice(&self.e_entry.to_le_bytes());
                bytes.extend_from_slice(&self.e_phoff.to_le_bytes());
                bytes.extend_from_slice(&self.e_shoff.to_le_bytes());
            }
        }
        bytes.extend_from_slice(&self.e_flags.to_le_bytes());
        bytes.extend_from_slice(&(class.ehdr_size() as u16).to_le_bytes());
        bytes.extend_from_slice(&self.e_phentsize.to_le_bytes());
        bytes.extend_from_slice(&self.e_phnum.to_le_bytes());
        bytes.extend_from_slice(&(class.shdr_size() as u16).to_le_bytes());
        bytes.extend_from_slice(&self.e_shnum.to_le_bytes());
        bytes.extend_from_slice(&self.e_shstrndx.to_le_bytes());
        bytes
    }
}

/// ELF Section Header
#[derive(Debug, Clone)]
pub struct ElfSectionHeader {
    pub sh_name: u32,      // Section name (string table index)
    pub sh_type: u32,      // Section type
    pub sh_flags: u64,     // Section flags
    pub sh_addr: u64,      // Section virtual address
    pub sh_offset: u64,    // Section file offset
    pub sh_size: u64,      // Section size in bytes
    pub sh_link: u32,      // Link to another section
    pub sh_info: u32,      // Additional section information
    pub sh_addralign: u64, // Section alignment
    pub sh_entsize: u64,   // Entry size if section holds table
}

impl ElfSectionHeader {
    /// Create the reserved all-zero section header for index 0.
    pub fn null() -> Self {
        Self {
            sh_name: 0,
            sh_type: SHT_NULL,
            sh_flags: 0,
            sh_addr: 0,
            sh_offset: 0,
            sh_size: 0,
            sh_link: 0,
            sh_info: 0,
            sh_addralign: 0,
            sh_entsize: 0,
        }
    }

    /// Encode to 40 (ELF-32) or 64 (ELF-64) bytes of little-endian binary.
    pub fn encode(&self, class: Class) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(class.shdr_size() as usize);
        bytes.extend_from_slice(&self.sh_name.to_le_bytes());
        bytes.extend_from_slice(&self.sh_type.to_le_bytes());
        match class {
            Class::Elf32 => {
                bytes.extend_from_slice(&(self.sh_flags as u32).to_le_bytes());
                bytes.extend_from_slice(&(self.sh_addr as u32).to_le_bytes());
                bytes
                    .extend_from_slice(&(self.sh_offset as u32).to_le_bytes());
                bytes.extend_from_slice(&(self.sh_size as u32).to_le_bytes());
                bytes.extend_from_slice(&self.sh_link.to_le_bytes());
                bytes.extend_from_slice(&self.sh_info.to_le_bytes());
                bytes.extend_from_slice(
                    &(self.sh_addralign as u32).to_le_bytes(),
                );
                bytes
                    .extend_from_slice(&(self.sh_entsize as u32).to_le_bytes());
            }
            Class::Elf64 => {
                bytes.extend_from_slice(&self.sh_flags.to_le_bytes());
                bytes.extend_from_slice(&self.sh_addr.to_le_bytes());
                bytes.extend_from_slice(&self.sh_offset.to_le_bytes());
                bytes.extend_from_slice(&self.sh_size.to_le_bytes());
                bytes.extend_from_slice(&self.sh_link.to_le_bytes());
                bytes.extend_from_slice(&self.sh_info.to_le_bytes());
                bytes.extend_from_slice(&self.sh_addralign.to_le_bytes());
                bytes.extend_from_slice(&self.sh_entsize.to_le_bytes());
            }
        }
        bytes
    }
}

/// ELF Symbol Table Entry
///
/// The two widths reorder fields: ELF-32 stores value and size before the
/// info byte, ELF-64 stores them after the section index.
#[derive(Debug, Clone)]
pub struct ElfSymbolEntry {
    pub st_name: u32,  // Symbol name (string table index)
    pub st_value: u64, // Symbol value
    pub st_size: u64,  // Symbol size
    pub st_info: u8,   // Symbol type and binding
    pub st_other: u8,  // Symbol visibility
    pub st_shndx: u16, // Section index
}

impl ElfSymbolEntry {
    /// Create the undefined symbol (entry 0).
    pub fn null() -> Self {
        Self {
            st_name: 0,
            st_value: 0,
            st_size: 0,
            st_info: 0,
            st_other: 0,
            st_shndx: SHN_UNDEF,
        }
    }

    /// Encode to 16 (ELF-32) or 24 (ELF-64) bytes of little-endian binary.
    pub fn encode(&self, class: Class) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(class.sym_size() as usize);
        bytes.extend_from_slice(&self.st_name.to_le_bytes());
        match class {
            Class::Elf32 => {
                bytes
                    .extend_from_slice(&(self.st_value as u32).to_le_bytes());
                bytes.extend_from_slice(&(self.st_size as u32).to_le_bytes());
                bytes.push(self.st_info);
                bytes.push(self.st_other);
                bytes.extend_from_slice(&self.st_shndx.to_le_bytes());
            }
            Class::Elf64 => {
                bytes.push(self.st_info);
                bytes.push(self.st_other);
                bytes.extend_from_slice(&self.st_shndx.to_le_bytes());
                bytes.extend_from_slice(&self.st_value.to_le_bytes());
                bytes.extend_from_slice(&self.st_size.to_le_bytes());
            }
        }
        bytes
    }
}

/// Helper to create st_info field from binding and type
pub fn make_st_info(bind: u8, typ: u8) -> u8 {
    (bind << 4) | (typ & 0xf)
}

// ============================================================================
// String Table Builder
// ============================================================================

/// String table builder that deduplicates strings.
///
/// Offset 0 is always the empty string. Adding a name that is already in
/// the table returns the offset of the existing entry, so two symbols that
/// share a name end up sharing one string-table entry.
pub struct StringTable {
    strings: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    pub fn new() -> Self {
        // String tables start with a null byte
        Self { strings: vec![0], offsets: HashMap::new() }
    }

    /// Add a string and return its offset
    pub fn add(&mut self, s: &str) -> u32 {
        if let Some(&offset) = self.offsets.get(s) {
            return offset;
        }

        let offset = self.strings.len() as u32;
        self.offsets.insert(s.to_string(), offset);
        self.strings.extend_from_slice(s.as_bytes());
        self.strings.push(0); // Null terminator
        offset
    }

    pub fn data(&self) -> &[u8] {
        &self.strings
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}
