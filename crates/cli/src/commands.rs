//! Subcommand implementations
//!
//! Each command writes its output to the supplied writer so it can be
//! exercised without touching the process stdout.

use crate::cli::Commands;
use crate::errors::CliError;
use chrono::Utc;
use slideshow_cache::codec::{self, Index, IndexedEntry};
use slideshow_cache::{CacheEntry, CacheStorage, Header, Resource, StatusLine};
use std::io::Write;
use std::path::PathBuf;

/// Run one subcommand against an opened cache
pub fn execute(
    storage: &CacheStorage,
    command: Commands,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Commands::List => list(storage, out),
        Commands::Show { key } => show(storage, &key, out),
        Commands::Cat { key } => cat(storage, &key, out),
        Commands::Put {
            key,
            file,
            headers,
            status_line,
        } => put(storage, key, file, &headers, &status_line, out),
        Commands::Remove { key } => {
            storage.remove(&key);
            writeln!(out, "removed {key}")?;
            Ok(())
        }
    }
}

fn lookup(storage: &CacheStorage, key: &str) -> Result<CacheEntry, CliError> {
    storage.get(key).ok_or_else(|| CliError::NotFound {
        key: key.to_string(),
    })
}

fn list(storage: &CacheStorage, out: &mut impl Write) -> Result<(), CliError> {
    for key in storage.keys() {
        // Entries whose body vanished are dropped by `get`
        let Some(entry) = storage.get(&key) else {
            continue;
        };
        let path = entry
            .resource
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        writeln!(out, "{}\t{key}\t{path}", entry.status_line.code)?;
    }
    Ok(())
}

fn show(storage: &CacheStorage, key: &str, out: &mut impl Write) -> Result<(), CliError> {
    let entry = lookup(storage, key)?;
    let path = entry
        .resource
        .path()
        .map(PathBuf::from)
        .unwrap_or_default();

    let mut single = Index::new();
    single.insert(key.to_string(), IndexedEntry::new(path, entry));
    out.write_all(&codec::encode(&single)?)?;
    writeln!(out)?;
    Ok(())
}

fn cat(storage: &CacheStorage, key: &str, out: &mut impl Write) -> Result<(), CliError> {
    let entry = lookup(storage, key)?;
    out.write_all(&entry.resource.bytes()?)?;
    out.flush()?;
    Ok(())
}

fn put(
    storage: &CacheStorage,
    key: String,
    file: PathBuf,
    headers: &[String],
    status_line: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let status_line: StatusLine = status_line
        .parse()
        .map_err(|source| CliError::InvalidArgument {
            argument: "--status-line".to_string(),
            source,
        })?;
    let headers = headers
        .iter()
        .map(|raw| {
            raw.parse::<Header>()
                .map_err(|source| CliError::InvalidArgument {
                    argument: "--header".to_string(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let now = Utc::now();
    let entry = CacheEntry::new(now, now, status_line, headers, Resource::File(file));
    storage.put(key.as_str(), entry)?;

    tracing::info!(key = %key, "Cached local file");
    if let Some(path) = storage.get(&key).and_then(|e| e.resource.path().map(PathBuf::from)) {
        writeln!(out, "{}", path.display())?;
    }
    Ok(())
}
