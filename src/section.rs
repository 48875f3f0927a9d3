// section.rs
//
// A named section: header metadata plus raw payload bytes.

use crate::elf::ElfSectionHeader;

/// One section of the output object: its name (for the section-header
/// string table), its header fields, and its payload. `header.sh_offset`
/// is left at zero until the layout pass assigns it.
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub header: ElfSectionHeader,
    pub data: Vec<u8>,
}

impl Section {
    /// The reserved placeholder at section index 0. Its header is all
    /// zeros and its payload is never written to the file body.
    pub fn null() -> Self {
        Self {
            name: String::new(),
            header: ElfSectionHeader::null(),
            data: Vec::new(),
        }
    }

    /// Payload right-padded with zero bytes to a multiple of the section's
    /// declared alignment, so the next section starts on a clean boundary.
    pub fn padded_data(&self) -> Vec<u8> {
        let align = self.header.sh_addralign.max(1) as usize;
        let padded_len = self.data.len().div_ceil(align) * align;
        let mut bytes = self.data.clone();
        bytes.resize(padded_len, 0);
        bytes
    }
}
