// test_utils.rs
//
// A minimal format-aware ELF reader used by the tests to verify emitted
// objects. Decodes the file header, section headers, string tables, and
// the symbol table for both widths. Not part of the library surface.

pub struct ObjSection {
    pub name: String,
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
    pub data: Vec<u8>,
}

pub struct ObjSymbol {
    pub name: String,
    pub value: u64,
    pub size: u64,
    pub bind: u8,
    pub typ: u8,
    pub shndx: u16,
}

pub struct ObjFile {
    pub class_bits: u32,
    pub e_type: u16,
    pub machine: u16,
    pub shoff: u64,
    pub shnum: u16,
    pub shstrndx: u16,
    pub sections: Vec<ObjSection>,
    /// All symbol table entries, including the null entry at index 0.
    pub symbols: Vec<ObjSymbol>,
}

fn u16_at(raw: &[u8], off: usize) -> u16 {
    u16::from_le_bytes(raw[off..off + 2].try_into().unwrap())
}

fn u32_at(raw: &[u8], off: usize) -> u32 {
    u32::from_le_bytes(raw[off..off + 4].try_into().unwrap())
}

fn u64_at(raw: &[u8], off: usize) -> u64 {
    u64::from_le_bytes(raw[off..off + 8].try_into().unwrap())
}

/// Read a null-terminated string from a string table blob.
pub fn read_cstr(table: &[u8], offset: usize) -> Result<String, String> {
    if offset >= table.len() {
        return Err(format!(
            "string offset {} out of bounds (table size: {})",
            offset,
            table.len()
        ));
    }
    let mut end = offset;
    while end < table.len() && table[end] != 0 {
        end += 1;
    }
    if end >= table.len() {
        return Err("unterminated string in string table".to_string());
    }
    Ok(String::from_utf8_lossy(&table[offset..end]).into_owned())
}

pub fn parse_object(raw: &[u8]) -> Result<ObjFile, String> {
    if raw.len() < 52 {
        return Err("ELF data is too short".to_string());
    }
    if raw[0..4] != *b"\x7fELF" {
        return Err("ELF data does not have ELF magic number".to_string());
    }
    let class_bits = match raw[4] {
        1 => 32,
        2 => 64,
        other => return Err(format!("unknown ELF class {}", other)),
    };
    if raw[5] != 1 || raw[6] != 1 || raw[7] != 0 {
        return Err(
            "ELF data is not little-endian, version 1, System V ABI"
                .to_string(),
        );
    }

    let e_type = u16_at(raw, 0x10);
    let machine = u16_at(raw, 0x12);

    // Header field offsets differ between the widths
    let (shoff, shentsize, shnum, shstrndx) = if class_bits == 32 {
        (
            u32_at(raw, 0x20) as u64,
            u16_at(raw, 0x2e) as usize,
            u16_at(raw, 0x30),
            u16_at(raw, 0x32),
        )
    } else {
        (
            u64_at(raw, 0x28),
            u16_at(raw, 0x3a) as usize,
            u16_at(raw, 0x3c),
            u16_at(raw, 0x3e),
        )
    };

    let expected_shentsize = if class_bits == 32 { 40 } else { 64 };
    if shentsize != expected_shentsize {
        return Err(format!("unexpected e_shentsize {}", shentsize));
    }

    // Section headers
    let mut sections = Vec::new();
    for i in 0..shnum as usize {
        let start = shoff as usize + shentsize * i;
        if start + shentsize > raw.len() {
            return Err("section header out of range".to_string());
        }
        let h = &raw[start..start + shentsize];
        let sec = if class_bits == 32 {
            ObjSection {
                name: String::new(),
                sh_name: u32_at(h, 0x00),
                sh_type: u32_at(h, 0x04),
                sh_flags: u32_at(h, 0x08) as u64,
                sh_addr: u32_at(h, 0x0c) as u64,
                sh_offset: u32_at(h, 0x10) as u64,
                sh_size: u32_at(h, 0x14) as u64,
                sh_link: u32_at(h, 0x18),
                sh_info: u32_at(h, 0x1c),
                sh_addralign: u32_at(h, 0x20) as u64,
                sh_entsize: u32_at(h, 0x24) as u64,
                data: Vec::new(),
            }
        } else {
            ObjSection {
                name: String::new(),
                sh_name: u32_at(h, 0x00),
                sh_type: u32_at(h, 0x04),
                sh_flags: u64_at(h, 0x08),
                sh_addr: u64_at(h, 0x10),
                sh_offset: u64_at(h, 0x18),
                sh_size: u64_at(h, 0x20),
                sh_link: u32_at(h, 0x28),
                sh_info: u32_at(h, 0x2c),
                sh_addralign: u64_at(h, 0x30),
                sh_entsize: u64_at(h, 0x38),
                data: Vec::new(),
            }
        };
        sections.push(sec);
    }

    // Section payloads (the null section has none)
    for sec in sections.iter_mut().skip(1) {
        let start = sec.sh_offset as usize;
        let end = start + sec.sh_size as usize;
        if end > raw.len() {
            return Err("section payload out of range".to_string());
        }
        sec.data = raw[start..end].to_vec();
    }

    // Section names via the section-header string table
    if shstrndx as usize >= sections.len() {
        return Err("e_shstrndx out of range".to_string());
    }
    let shstrtab = sections[shstrndx as usize].data.clone();
    for sec in sections.iter_mut() {
        sec.name = read_cstr(&shstrtab, sec.sh_name as usize)?;
    }

    // Symbol table, if present
    let mut symbols = Vec::new();
    if let Some(symtab) = sections.iter().find(|s| s.sh_type == 2) {
        let strtab = sections
            .get(symtab.sh_link as usize)
            .map(|s| s.data.clone())
            .ok_or("symtab sh_link out of range")?;
        let entsize = if class_bits == 32 { 16 } else { 24 };
        if symtab.sh_entsize != entsize as u64 {
            return Err(format!(
                "unexpected symtab sh_entsize {}",
                symtab.sh_entsize
            ));
        }
        let count = symtab.data.len() / entsize;
        for i in 0..count {
            let e = &symtab.data[i * entsize..(i + 1) * entsize];
            let (st_name, value, size, info, shndx) = if class_bits == 32 {
                (
                    u32_at(e, 0x00),
                    u32_at(e, 0x04) as u64,
                    u32_at(e, 0x08) as u64,
                    e[0x0c],
                    u16_at(e, 0x0e),
                )
            } else {
                (
                    u32_at(e, 0x00),
                    u64_at(e, 0x08),
                    u64_at(e, 0x10),
                    e[0x04],
                    u16_at(e, 0x06),
                )
            };
            symbols.push(ObjSymbol {
                name: read_cstr(&strtab, st_name as usize)?,
                value,
                size,
                bind: info >> 4,
                typ: info & 0xf,
                shndx,
            });
        }
    }

    Ok(ObjFile {
        class_bits,
        e_type,
        machine,
        shoff,
        shnum,
        shstrndx,
        sections,
        symbols,
    })
}
