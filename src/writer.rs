// writer.rs
//
// The layout writer: owns the section list, builds the symbol table and
// its string tables, assigns file offsets, and serializes the object.
//
// File layout, in order: ELF header, each content section's padded payload
// at its aligned offset, the section-header string table, then the
// section-header table at an 8-byte boundary.

use crate::elf::{
    Class, ElfHeader, ElfSectionHeader, ElfSymbolEntry, EM_386, EM_X86_64,
    SHF_ALLOC, SHF_EXECINSTR, SHT_PROGBITS, SHT_STRTAB, SHT_SYMTAB,
    StringTable, make_st_info,
};
use crate::error::Result;
use crate::section::Section;
use crate::symbols::Symbol;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

/// Round `offset` up to the next multiple of `alignment` (a power of two).
pub fn align_up(offset: u64, alignment: u64) -> u64 {
    if alignment <= 1 {
        return offset;
    }
    (offset + alignment - 1) & !(alignment - 1)
}

/// Builder for a minimal relocatable object file.
///
/// Sections are accumulated in memory; `write` runs the layout pass and
/// emits the file in one blocking call. The section list always starts
/// with the reserved null section.
pub struct ElfWriter {
    class: Class,
    machine: u16,
    sections: Vec<Section>,
    section_names: StringTable,
}

impl ElfWriter {
    /// Create a writer for the given pointer width. Widths other than 32
    /// and 64 are rejected before anything is built.
    pub fn new(ptr_width: u32) -> Result<Self> {
        Ok(Self::with_class(Class::from_ptr_width(ptr_width)?))
    }

    pub fn with_class(class: Class) -> Self {
        // Debuggers want a machine type that matches the host being
        // debugged; default to the common x86 family per width.
        let machine = match class {
            Class::Elf32 => EM_386,
            Class::Elf64 => EM_X86_64,
        };
        Self {
            class,
            machine,
            sections: vec![Section::null()],
            section_names: StringTable::new(),
        }
    }

    pub fn class(&self) -> Class {
        self.class
    }

    /// Override the e_machine field of the file header.
    pub fn set_machine(&mut self, machine: u16) {
        self.machine = machine;
    }

    /// Append the `.text` section holding the caller-supplied bytes.
    /// The payload is opaque; no instruction encoding happens here.
    pub fn add_code_section(&mut self, data: Vec<u8>, addr: u64) {
        let sh_name = self.section_names.add(".text");
        self.sections.push(Section {
            name: ".text".to_string(),
            header: ElfSectionHeader {
                sh_name,
                sh_type: SHT_PROGBITS,
                sh_flags: SHF_ALLOC | SHF_EXECINSTR,
                sh_addr: addr,
                sh_offset: 0,
                sh_size: data.len() as u64,
                sh_link: 0,
                sh_info: 0,
                sh_addralign: 4,
                sh_entsize: 0,
            },
            data,
        });
    }

    /// Build the full symbol table in one call and append it, followed by
    /// its string table, to the section list.
    ///
    /// Entry 0 is the mandatory null symbol; each input symbol becomes one
    /// entry referencing its name in a fresh string table. Every entry's
    /// defining section is index 1, the code section.
    pub fn add_symbols(&mut self, symbols: &[Symbol]) {
        let mut symbol_names = StringTable::new();

        let mut entries = vec![ElfSymbolEntry::null()];
        for sym in symbols {
            entries.push(ElfSymbolEntry {
                st_name: symbol_names.add(&sym.name),
                st_value: sym.value,
                st_size: sym.size,
                st_info: make_st_info(sym.bind, sym.typ),
                st_other: 0,
                st_shndx: 1, // the one code section
            });
        }

        let mut symtab_data =
            Vec::with_capacity(entries.len() * self.class.sym_size() as usize);
        for entry in &entries {
            symtab_data.extend_from_slice(&entry.encode(self.class));
        }

        // .symtab lands at the current end of the list and .strtab right
        // after it, so the link target is one past the current length.
        let strtab_index = self.sections.len() as u32 + 1;

        let symtab_name = self.section_names.add(".symtab");
        self.sections.push(Section {
            name: ".symtab".to_string(),
            header: ElfSectionHeader {
                sh_name: symtab_name,
                sh_type: SHT_SYMTAB,
                sh_flags: 0,
                sh_addr: 0,
                sh_offset: 0,
                sh_size: symtab_data.len() as u64,
                sh_link: strtab_index,
                // Index of the first non-local symbol. The null entry at
                // index 0 is local; caller-added symbols follow it.
                sh_info: 1,
                sh_addralign: 8,
                sh_entsize: self.class.sym_size(),
            },
            data: symtab_data,
        });

        let strtab_name = self.section_names.add(".strtab");
        self.sections.push(Section {
            name: ".strtab".to_string(),
            header: ElfSectionHeader {
                sh_name: strtab_name,
                sh_type: SHT_STRTAB,
                sh_flags: 0,
                sh_addr: 0,
                sh_offset: 0,
                sh_size: symbol_names.len() as u64,
                sh_link: 0,
                sh_info: 0,
                sh_addralign: 1,
                sh_entsize: 0,
            },
            data: symbol_names.data().to_vec(),
        });
    }

    /// Run the layout pass and serialize the object to `path`, overwriting
    /// any existing file.
    pub fn write(&mut self, path: &str) -> Result<()> {
        let mut file = File::create(path)?;
        self.write_to(&mut file)
    }

    /// Run the layout pass and serialize the object through any seekable
    /// sink. Layout is deterministic, so writing the same accumulated
    /// state twice produces byte-identical output.
    pub fn write_to<W: Write + Seek>(&mut self, out: &mut W) -> Result<()> {
        // --- Layout pass ---
        // The running offset starts after the file header, whose size
        // depends on the selected class.
        let mut offset = self.class.ehdr_size();
        for sec in self.sections.iter_mut().skip(1) {
            offset = align_up(offset, sec.header.sh_addralign);
            sec.header.sh_offset = offset;
            offset += sec.padded_data().len() as u64;
        }

        // The section-header string table goes last; every content
        // section's name is already registered, so adding its own name
        // completes the table.
        let shstrtab_name = self.section_names.add(".shstrtab");
        let mut shstrtab = Section {
            name: ".shstrtab".to_string(),
            header: ElfSectionHeader {
                sh_name: shstrtab_name,
                sh_type: SHT_STRTAB,
                sh_flags: 0,
                sh_addr: 0,
                sh_offset: 0,
                sh_size: self.section_names.len() as u64,
                sh_link: 0,
                sh_info: 0,
                sh_addralign: 1,
                sh_entsize: 0,
            },
            data: self.section_names.data().to_vec(),
        };
        offset = align_up(offset, shstrtab.header.sh_addralign);
        shstrtab.header.sh_offset = offset;
        offset += shstrtab.padded_data().len() as u64;

        let shoff = align_up(offset, 8);
        let shnum = self.sections.len() as u16 + 1; // all + .shstrtab
        let shstrndx = shnum - 1;

        let mut header = ElfHeader::new(self.machine);
        header.e_shoff = shoff;
        header.e_shnum = shnum;
        header.e_shstrndx = shstrndx;

        // --- Emission ---
        out.seek(SeekFrom::Start(0))?;
        out.write_all(&header.encode(self.class))?;

        // Content sections (the null section has no file body)
        for sec in self.sections.iter().skip(1) {
            out.seek(SeekFrom::Start(sec.header.sh_offset))?;
            out.write_all(&sec.padded_data())?;
        }

        out.seek(SeekFrom::Start(shstrtab.header.sh_offset))?;
        out.write_all(&shstrtab.data)?;

        // Section-header table: null first, .shstrtab last
        out.seek(SeekFrom::Start(shoff))?;
        for sec in self.sections.iter().chain(std::iter::once(&shstrtab)) {
            out.write_all(&sec.header.encode(self.class))?;
        }

        Ok(())
    }
}
