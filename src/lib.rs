pub mod elf;
pub mod error;
pub mod objfile;
pub mod section;
pub mod symbols;
pub mod writer;

#[cfg(test)]
mod test_utils;
