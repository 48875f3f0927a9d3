// error.rs
//
// Error type for the ELF object writer.

use std::fmt;
use std::io;

/// Errors that can occur while building or writing an object file.
#[derive(Debug)]
pub enum ElfError {
    /// The requested pointer width is not 32 or 64.
    UnsupportedWidth(u32),
    /// An underlying write or seek failed.
    Io(io::Error),
}

pub type Result<T> = std::result::Result<T, ElfError>;

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElfError::UnsupportedWidth(bits) => {
                write!(f, "pointer width must be 32 or 64, but is {}", bits)
            }
            ElfError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ElfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ElfError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ElfError {
    fn from(e: io::Error) -> Self {
        ElfError::Io(e)
    }
}
