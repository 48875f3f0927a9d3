// symbols.rs
//
// The caller-facing symbol model: a named address with a size, a binding,
// and a type classification. Consumed once by the writer when it builds
// the symbol table.

use crate::elf::{STB_GLOBAL, STT_FUNC, STT_NOTYPE, STT_OBJECT};

/// Default binding for caller-added symbols.
pub const DEFAULT_BIND: u8 = STB_GLOBAL;

/// A symbol to inject: a name bound to an address.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub value: u64,
    pub size: u64,
    pub bind: u8,
    pub typ: u8,
}

impl Symbol {
    /// A symbol of unspecified type. Use this when it is not known whether
    /// the address names a function or a variable.
    pub fn generic(name: &str, value: u64, size: u64, bind: u8) -> Self {
        Self { name: name.to_string(), value, size, bind, typ: STT_NOTYPE }
    }

    /// A function symbol.
    pub fn function(name: &str, value: u64, size: u64, bind: u8) -> Self {
        Self { name: name.to_string(), value, size, bind, typ: STT_FUNC }
    }

    /// A data object symbol (global or local variable).
    pub fn object(name: &str, value: u64, size: u64, bind: u8) -> Self {
        Self { name: name.to_string(), value, size, bind, typ: STT_OBJECT }
    }
}
