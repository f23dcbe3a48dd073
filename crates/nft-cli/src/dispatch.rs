use std::{fs, path::Path};

use nft_core::{
    extract_bundle, render_constants_module, IndexError, IndexOptions, NativeFileTestsIndex,
    PlatformFilter, Symbol, SymbolTable, DIR_ENV,
};
use serde_json::json;

use crate::{
    cli::{CommandCli, ExtractArgs, ListArgs, ModuleArgs, NftCli, SymbolsArgs},
    outcome::ExecutionOutcome,
};

pub fn execute(cli: &NftCli) -> ExecutionOutcome {
    match &cli.command {
        CommandCli::Exec(args) => with_index(cli, |index| {
            let path = index.first_executable_path(&args.name)?;
            Ok(path_outcome("executable", &args.name, path))
        }),
        CommandCli::Object(args) => with_index(cli, |index| {
            let path = index.first_object_path(&args.name)?;
            Ok(path_outcome("object", &args.name, path))
        }),
        CommandCli::List(args) => with_index(cli, |index| Ok(list(index, args))),
        CommandCli::Check => with_index(cli, |index| Ok(check(index))),
        CommandCli::Symbols(args) => with_index(cli, |index| symbols(index, args)),
        CommandCli::Module(args) => with_index(cli, |index| module(index, args)),
        CommandCli::Extract(args) => extract(cli, args),
    }
}

fn open_index(cli: &NftCli) -> Result<NativeFileTestsIndex, IndexError> {
    let dir = cli
        .dir
        .as_ref()
        .ok_or(IndexError::MissingConfig { var: DIR_ENV })?;
    let platform = match cli.platform.as_deref() {
        Some(value) => PlatformFilter::parse(value)?,
        None => PlatformFilter::host()?,
    };
    NativeFileTestsIndex::build(dir, IndexOptions { platform })
}

fn with_index<F>(cli: &NftCli, run: F) -> ExecutionOutcome
where
    F: FnOnce(&NativeFileTestsIndex) -> Result<ExecutionOutcome, ExecutionOutcome>,
{
    let index = match open_index(cli) {
        Ok(index) => index,
        Err(err) => return err.into(),
    };
    run(&index).unwrap_or_else(|outcome| outcome)
}

fn path_outcome(kind: &str, name: &str, path: &Path) -> ExecutionOutcome {
    let display = path.display().to_string();
    ExecutionOutcome::success(
        format!("{kind} for {name}: {display}"),
        json!({ "base_name": name, "kind": kind, "path": display }),
        vec![display.clone()],
    )
}

fn list(index: &NativeFileTestsIndex, args: &ListArgs) -> ExecutionOutcome {
    let both = !args.objects && !args.executables;
    let render = |paths: Vec<&Path>| -> Vec<String> {
        let mut paths: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        paths.sort();
        paths
    };
    let objects = if both || args.objects {
        render(index.all_object_paths())
    } else {
        Vec::new()
    };
    let executables = if both || args.executables {
        render(index.all_executable_paths())
    } else {
        Vec::new()
    };
    let lines = objects.iter().chain(executables.iter()).cloned().collect();
    ExecutionOutcome::success(
        format!(
            "{} objects, {} executables in {}",
            objects.len(),
            executables.len(),
            index.base_dir().display()
        ),
        json!({
            "dir": index.base_dir().display().to_string(),
            "platform": index.platform_filter().to_string(),
            "base_names": index.base_names(),
            "objects": objects,
            "executables": executables,
            "stats": index.stats(),
        }),
        lines,
    )
}

fn check(index: &NativeFileTestsIndex) -> ExecutionOutcome {
    let missing: Vec<String> = index
        .missing_artifacts()
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    if missing.is_empty() {
        let total = index.all_object_paths().len() + index.all_executable_paths().len();
        return ExecutionOutcome::success(
            format!("all {total} recorded artifacts present"),
            json!({ "missing": missing, "total": total }),
            Vec::new(),
        );
    }
    tracing::debug!(?missing, "recorded artifacts missing on disk");
    ExecutionOutcome::user_error(
        format!("{} recorded artifacts missing on disk", missing.len()),
        json!({
            "reason": "artifacts_missing",
            "missing": missing,
            "hint": "Re-extract the fixture bundle or rebuild the native file tests.",
        }),
    )
}

fn module(
    index: &NativeFileTestsIndex,
    args: &ModuleArgs,
) -> Result<ExecutionOutcome, ExecutionOutcome> {
    let source = render_constants_module(index, args.names.as_slice(), &args.symbols)?;
    match &args.out {
        Some(out) => {
            fs::write(out, &source).map_err(|err| {
                ExecutionOutcome::failure(
                    format!("failed to write {}: {err}", out.display()),
                    json!({ "reason": "module_write_failed" }),
                )
            })?;
            Ok(ExecutionOutcome::success(
                format!(
                    "wrote {} path and {} symbol constants to {}",
                    args.names.len(),
                    args.symbols.len(),
                    out.display()
                ),
                json!({ "out": out.display().to_string(), "names": args.names }),
                Vec::new(),
            ))
        }
        None => Ok(ExecutionOutcome::success(
            format!(
                "rendered {} path and {} symbol constants",
                args.names.len(),
                args.symbols.len()
            ),
            json!({ "names": args.names, "source": source }),
            vec![source.trim_end().to_string()],
        )),
    }
}

fn symbols(
    index: &NativeFileTestsIndex,
    args: &SymbolsArgs,
) -> Result<ExecutionOutcome, ExecutionOutcome> {
    let path = index.first_executable_path(&args.name)?;
    let table = SymbolTable::read(path)?;
    let selected: Vec<(&str, Symbol)> = if args.symbols.is_empty() {
        table.iter().collect()
    } else {
        args.symbols
            .iter()
            .map(|name| table.require(name).map(|symbol| (name.as_str(), symbol)))
            .collect::<Result<Vec<_>, _>>()?
    };
    let lines = selected
        .iter()
        .map(|(name, symbol)| format!("0x{:x}\t{}\t{name}", symbol.address, symbol.size))
        .collect();
    let details: Vec<_> = selected
        .iter()
        .map(|(name, symbol)| {
            json!({ "name": name, "address": symbol.address, "size": symbol.size })
        })
        .collect();
    Ok(ExecutionOutcome::success(
        format!("{} symbols in {}", selected.len(), path.display()),
        json!({
            "base_name": args.name,
            "path": path.display().to_string(),
            "symbols": details,
        }),
        lines,
    ))
}

fn extract(cli: &NftCli, args: &ExtractArgs) -> ExecutionOutcome {
    let Some(dest) = args.dest.as_ref().or(cli.dir.as_ref()) else {
        return IndexError::MissingConfig { var: DIR_ENV }.into();
    };
    match extract_bundle(&args.bundle, dest) {
        Ok(summary) => {
            let files: Vec<String> = summary
                .files
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            let message = if summary.extracted {
                format!("extracted {} files into {}", files.len(), dest.display())
            } else {
                format!("{} already exists; nothing extracted", dest.display())
            };
            ExecutionOutcome::success(
                message,
                json!({
                    "dest": dest.display().to_string(),
                    "extracted": summary.extracted,
                    "files": files,
                }),
                Vec::new(),
            )
        }
        Err(err) => err.into(),
    }
}
