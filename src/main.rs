// main.rs
//
// Command-line front end: build a synthetic symbols object from symbol
// specs given on the command line.
//
// Example:
//     symelf -o symbols.o func:handler=0x1337:4 obj:counter=0x2000

use std::env;
use std::fs;
use std::process::exit;
use symelf::objfile::ElfFile;
use symelf::symbols::DEFAULT_BIND;

struct Config {
    output_file: String,
    ptr_width: u32,
    code_file: Option<String>,
    code_addr: u64,
    machine: Option<u16>,
    verbose: bool,
    symbols: Vec<SymbolSpec>,
}

enum SymbolKind {
    Generic,
    Function,
    Object,
}

struct SymbolSpec {
    kind: SymbolKind,
    name: String,
    addr: u64,
    size: u64,
}

fn print_help(program: &str) -> String {
    format!(
        "usage: {} [options] KIND:NAME=ADDR[:SIZE]...\n\
         \n\
         KIND is one of: sym, func, obj\n\
         ADDR and SIZE accept decimal or 0x-prefixed hex\n\
         \n\
         options:\n\
         \x20 -o FILE        output file (default symbols.o)\n\
         \x20 --bits N       pointer width, 32 or 64 (default 64)\n\
         \x20 --code FILE    raw bytes for the code section\n\
         \x20 --addr ADDR    address of the code section (default 0)\n\
         \x20 --machine N    e_machine value for the file header\n\
         \x20 -v             verbose output",
        program
    )
}

fn parse_number(s: &str) -> Result<u64, String> {
    let parsed = if let Some(hex) = s.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        s.parse::<u64>()
    };
    parsed.map_err(|_| format!("invalid number: {}", s))
}

fn parse_symbol_spec(arg: &str) -> Result<SymbolSpec, String> {
    let (kind_str, rest) = arg
        .split_once(':')
        .ok_or_else(|| format!("invalid symbol spec: {}", arg))?;
    let kind = match kind_str {
        "sym" => SymbolKind::Generic,
        "func" => SymbolKind::Function,
        "obj" => SymbolKind::Object,
        other => return Err(format!("unknown symbol kind: {}", other)),
    };

    let (name, value_str) = rest
        .split_once('=')
        .ok_or_else(|| format!("invalid symbol spec: {}", arg))?;
    if name.is_empty() {
        return Err(format!("empty symbol name in spec: {}", arg));
    }

    let (addr_str, size) = match value_str.split_once(':') {
        Some((a, s)) => (a, parse_number(s)?),
        None => (value_str, 0),
    };
    let addr = parse_number(addr_str)?;

    Ok(SymbolSpec { kind, name: name.to_string(), addr, size })
}

fn process_cli_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        return Err(print_help(&args[0]));
    }

    let mut output_file = "symbols.o".to_string();
    let mut ptr_width = 64u32;
    let mut code_file = None;
    let mut code_addr = 0u64;
    let mut machine = None;
    let mut verbose = false;
    let mut symbols = Vec::new();
    let mut i = 1;

    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => return Err(print_help(&args[0])),
            "-o" => {
                i += 1;
                output_file = args
                    .get(i)
                    .ok_or("-o requires a file name")?
                    .clone();
            }
            "--bits" => {
                i += 1;
                let value = args.get(i).ok_or("--bits requires a value")?;
                ptr_width = value
                    .parse()
                    .map_err(|_| format!("invalid --bits value: {}", value))?;
            }
            "--code" => {
                i += 1;
                code_file = Some(
                    args.get(i).ok_or("--code requires a file name")?.clone(),
                );
            }
            "--addr" => {
                i += 1;
                let value = args.get(i).ok_or("--addr requires a value")?;
                code_addr = parse_number(value)?;
            }
            "--machine" => {
                i += 1;
                let value = args.get(i).ok_or("--machine requires a value")?;
                machine = Some(parse_number(value)? as u16);
            }
            "-v" | "--verbose" => verbose = true,
            _ => {
                if arg.starts_with('-') {
                    return Err(format!("unknown option: {}", arg));
                }
                symbols.push(parse_symbol_spec(arg)?);
            }
        }
        i += 1;
    }

    Ok(Config {
        output_file,
        ptr_width,
        code_file,
        code_addr,
        machine,
        verbose,
        symbols,
    })
}

fn run(config: &Config) -> Result<(), String> {
    let mut elf = ElfFile::new(config.ptr_width).map_err(|e| e.to_string())?;

    if let Some(machine) = config.machine {
        elf.set_machine(machine);
    }

    if let Some(path) = &config.code_file {
        let data = fs::read(path)
            .map_err(|e| format!("reading {}: {}", path, e))?;
        elf.set_code(data, config.code_addr);
    }

    for spec in &config.symbols {
        match spec.kind {
            SymbolKind::Generic => {
                elf.add_generic(&spec.name, spec.addr, spec.size, DEFAULT_BIND)
            }
            SymbolKind::Function => {
                elf.add_function(&spec.name, spec.addr, spec.size, DEFAULT_BIND)
            }
            SymbolKind::Object => {
                elf.add_object(&spec.name, spec.addr, spec.size, DEFAULT_BIND)
            }
        }
        if config.verbose {
            eprintln!(
                "symbol {} at {:#x} (size {})",
                spec.name, spec.addr, spec.size
            );
        }
    }

    elf.write(&config.output_file).map_err(|e| {
        format!("writing {}: {}", config.output_file, e)
    })?;

    if config.verbose {
        eprintln!(
            "wrote {} ({} symbols, {}-bit)",
            config.output_file,
            elf.symbol_count(),
            config.ptr_width
        );
    }

    Ok(())
}

fn main() {
    let config = match process_cli_args() {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("{}", msg);
            exit(1);
        }
    };

    if let Err(msg) = run(&config) {
        eprintln!("{}", msg);
        exit(1);
    }
}
