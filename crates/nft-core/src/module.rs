use std::{
    collections::{btree_map::Entry, BTreeMap},
    str::FromStr,
};

use crate::{
    error::LookupError,
    index::NativeFileTestsIndex,
    symbols::{SymbolError, SymbolTable},
};

#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Symbols(#[from] SymbolError),
}

impl ModuleError {
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Lookup(err) => err.reason(),
            Self::Symbols(err) => err.reason(),
        }
    }

    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Lookup(_) => true,
            Self::Symbols(err) => err.is_user_error(),
        }
    }
}

/// A function symbol of a fixture executable to bake into the module.
///
/// Written `<base>:<symbol>` or `<base>:<symbol>=<CONST>`. Without an explicit
/// constant the name is `<BASE>_<SYMBOL>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolRequest {
    pub base_name: String,
    pub symbol: String,
    pub constant: Option<String>,
}

impl SymbolRequest {
    pub fn constant(&self) -> String {
        match &self.constant {
            Some(constant) => constant.clone(),
            None => format!(
                "{}_{}",
                constant_name(&self.base_name),
                constant_name(&self.symbol)
            ),
        }
    }
}

impl FromStr for SymbolRequest {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (target, constant) = match value.split_once('=') {
            Some((target, constant)) => (target, Some(constant)),
            None => (value, None),
        };
        let Some((base_name, symbol)) = target.split_once(':') else {
            return Err(format!("expected <base>:<symbol>[=<CONST>], got '{value}'"));
        };
        if base_name.is_empty() || symbol.is_empty() || constant.is_some_and(str::is_empty) {
            return Err(format!("expected <base>:<symbol>[=<CONST>], got '{value}'"));
        }
        Ok(Self {
            base_name: base_name.to_string(),
            symbol: symbol.to_string(),
            constant: constant.map(constant_name),
        })
    }
}

/// Renders a Rust module with one `<NAME>_EXEC_PATH` constant per requested
/// test, followed by an address and a `_LENGTH` constant per requested symbol.
///
/// Meant for build scripts that bake fixture locations into a test crate.
pub fn render_constants_module<S: AsRef<str>>(
    index: &NativeFileTestsIndex,
    base_names: &[S],
    symbols: &[SymbolRequest],
) -> Result<String, ModuleError> {
    let mut out = String::from("// @generated by nft; do not edit.\n\n");
    for base_name in base_names {
        let base_name = base_name.as_ref();
        let path = index.first_executable_path(base_name)?;
        out.push_str(&format!(
            "pub const {}_EXEC_PATH: &str = {:?};\n",
            constant_name(base_name),
            path.to_string_lossy()
        ));
    }

    if symbols.is_empty() {
        return Ok(out);
    }
    out.push('\n');
    let mut tables: BTreeMap<&str, SymbolTable> = BTreeMap::new();
    for request in symbols {
        let table = match tables.entry(request.base_name.as_str()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = index.first_executable_path(entry.key())?;
                entry.insert(SymbolTable::read(path)?)
            }
        };
        let symbol = table.require(&request.symbol)?;
        let constant = request.constant();
        out.push_str(&format!(
            "pub const {constant}: u64 = 0x{:x};\n",
            symbol.address
        ));
        out.push_str(&format!(
            "pub const {constant}_LENGTH: u64 = {};\n",
            symbol.size
        ));
    }
    Ok(out)
}

fn constant_name(base_name: &str) -> String {
    let mut name: String = base_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "NFT_");
    }
    name
}
