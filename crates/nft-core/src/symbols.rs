//! Function symbols of fixture executables.
//!
//! Debugger tests need the address and size of a few functions inside the
//! fixture binaries. ELF images report both in the symbol table. Mach-O
//! images carry sizes only in the `N_BNSYM`/`N_FUN`/`N_ENSYM` debug stabs, so
//! plain section symbols are kept as a fallback with a size of zero.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use goblin::{mach::Mach, Object};
use serde::Serialize;

const N_STAB: u8 = 0xe0;
const N_TYPE: u8 = 0x0e;
const N_SECT: u8 = 0x0e;
const N_FUN: u8 = 0x24;
const N_BNSYM: u8 = 0x2e;
const N_ENSYM: u8 = 0x4e;

#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
    #[error("failed to read executable {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse executable {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: goblin::error::Error,
    },
    #[error("{} is a {format} image, not an ELF or Mach-O executable", path.display())]
    UnsupportedFormat { path: PathBuf, format: &'static str },
    #[error("symbol '{symbol}' not found in {}", path.display())]
    NotFound { path: PathBuf, symbol: String },
}

impl SymbolError {
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Read { .. } => "executable_unreadable",
            Self::Parse { .. } => "executable_invalid",
            Self::UnsupportedFormat { .. } => "executable_unsupported",
            Self::NotFound { .. } => "symbol_missing",
        }
    }

    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub address: u64,
    pub size: u64,
}

/// Named symbols of one executable, keyed without any Mach-O `_` prefix.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    path: PathBuf,
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolTable {
    pub fn read(path: &Path) -> Result<Self, SymbolError> {
        let bytes = fs::read(path).map_err(|source| SymbolError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &bytes)
    }

    pub fn parse(path: &Path, bytes: &[u8]) -> Result<Self, SymbolError> {
        let object = Object::parse(bytes).map_err(|source| SymbolError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let unsupported = |format| SymbolError::UnsupportedFormat {
            path: path.to_path_buf(),
            format,
        };
        let symbols = match object {
            Object::Elf(elf) => {
                let mut symbols = BTreeMap::new();
                collect_elf(&mut symbols, elf.syms.iter(), |idx| elf.strtab.get_at(idx));
                collect_elf(&mut symbols, elf.dynsyms.iter(), |idx| {
                    elf.dynstrtab.get_at(idx)
                });
                symbols
            }
            Object::Mach(Mach::Binary(macho)) => {
                collect_macho(macho.symbols()).map_err(|source| SymbolError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            Object::Mach(Mach::Fat(_)) => return Err(unsupported("universal Mach-O")),
            Object::PE(_) => return Err(unsupported("PE")),
            Object::Archive(_) => return Err(unsupported("static archive")),
            _ => return Err(unsupported("unknown")),
        };
        tracing::debug!(
            path = %path.display(),
            symbols = symbols.len(),
            "read executable symbols"
        );
        Ok(Self {
            path: path.to_path_buf(),
            symbols,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name).copied()
    }

    /// Like [`SymbolTable::get`], but a missing symbol is an error naming the executable.
    pub fn require(&self, name: &str) -> Result<Symbol, SymbolError> {
        self.get(name).ok_or_else(|| SymbolError::NotFound {
            path: self.path.clone(),
            symbol: name.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Symbol)> {
        self.symbols.iter().map(|(name, symbol)| (name.as_str(), *symbol))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

fn collect_elf<'a, F>(
    symbols: &mut BTreeMap<String, Symbol>,
    syms: impl Iterator<Item = goblin::elf::Sym>,
    name_at: F,
) where
    F: Fn(usize) -> Option<&'a str>,
{
    for sym in syms {
        let Some(name) = name_at(sym.st_name).filter(|name| !name.is_empty()) else {
            continue;
        };
        let symbol = Symbol {
            address: sym.st_value,
            size: sym.st_size,
        };
        // sized definitions win over undefined or zero-sized duplicates
        symbols
            .entry(name.to_string())
            .and_modify(|known: &mut Symbol| {
                if known.size == 0 && symbol.size > 0 {
                    *known = symbol;
                }
            })
            .or_insert(symbol);
    }
}

fn collect_macho<'a>(
    nlists: impl Iterator<Item = goblin::error::Result<(&'a str, goblin::mach::symbols::Nlist)>>,
) -> goblin::error::Result<BTreeMap<String, Symbol>> {
    let mut stabs = BTreeMap::new();
    let mut sections = BTreeMap::new();
    let mut start = 0;
    let mut current: Option<String> = None;
    for entry in nlists {
        let (name, nlist) = entry?;
        let unprefixed = name.strip_prefix('_').unwrap_or(name);
        if nlist.n_type & N_STAB == 0 {
            if nlist.n_type & N_TYPE == N_SECT && !unprefixed.is_empty() {
                sections.entry(unprefixed.to_string()).or_insert(Symbol {
                    address: nlist.n_value,
                    size: 0,
                });
            }
            continue;
        }
        match nlist.n_type {
            N_BNSYM => start = nlist.n_value,
            N_FUN if !unprefixed.is_empty() => current = Some(unprefixed.to_string()),
            N_ENSYM => {
                if let Some(name) = current.take() {
                    stabs.insert(
                        name,
                        Symbol {
                            address: start,
                            size: nlist.n_value,
                        },
                    );
                }
            }
            _ => {}
        }
    }
    sections.extend(stabs);
    Ok(sections)
}
