use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use thiserror::Error;

use crate::config::Config;
use crate::locales::LocaleTable;
use crate::rewrite::{Marker, Rewriter, Target};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub base_url: String,
    pub cache_bust: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub code: String,
    /// Relative to the output directory. See [`destination`] for the
    /// default locale's file name.
    pub path: PathBuf,
    pub html: String,
    pub missing: Vec<Marker>,
}

impl GeneratedDocument {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Debug, Error)]
#[error("template markers not found: {}", list_markers(.0))]
pub struct MissingMarkers(pub Vec<(String, Marker)>);

fn list_markers(missing: &[(String, Marker)]) -> String {
    missing
        .iter()
        .map(|(code, marker)| format!("{code}:{marker}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub missing: Vec<(String, Marker)>,
    pub cache_bust: i64,
}

pub fn output_path(table: &LocaleTable, code: &str) -> PathBuf {
    if table.is_default(code) {
        PathBuf::from("index.html")
    } else {
        Path::new(code).join("index.html")
    }
}

/// Renders one document per locale, in table order, each from the same
/// pristine template.
pub fn generate(
    template: &str,
    table: &LocaleTable,
    options: &RenderOptions,
) -> Result<Vec<GeneratedDocument>> {
    let rewriter = Rewriter::new().context("failed to compile rewrite patterns")?;
    let base_url = options.base_url.trim_end_matches('/');
    let documents = table
        .entries()
        .iter()
        .map(|entry| {
            let target = Target {
                table,
                entry,
                base_url,
                cache_bust: options.cache_bust,
            };
            let localized = rewriter.localize(template, &target);
            GeneratedDocument {
                code: entry.code.clone(),
                path: output_path(table, &entry.code),
                html: localized.html,
                missing: localized.missing,
            }
        })
        .collect();
    Ok(documents)
}

/// Where a document lands on disk. The default locale's document takes the
/// template's file name so it replaces the template in place.
pub fn destination(
    out_dir: &Path,
    root_file: &Path,
    table: &LocaleTable,
    doc: &GeneratedDocument,
) -> PathBuf {
    if table.is_default(&doc.code) {
        out_dir.join(root_file)
    } else {
        out_dir.join(&doc.path)
    }
}

pub fn write_documents(
    out_dir: &Path,
    root_file: &Path,
    table: &LocaleTable,
    documents: &[GeneratedDocument],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(documents.len());
    for doc in documents {
        let path = destination(out_dir, root_file, table, doc);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &doc.html)
            .with_context(|| format!("failed to write {}", path.display()))?;

        let rel = path.strip_prefix(out_dir).unwrap_or(&path);
        let shown = format!("/{}", rel.to_string_lossy().replace('\\', "/"));
        if table.is_default(&doc.code) {
            println!("Updated {shown} ({})", doc.code);
        } else {
            println!("Created {shown}");
        }
        written.push(path);
    }
    Ok(written)
}

pub fn run(config: &Config) -> Result<RunSummary> {
    let template = fs::read_to_string(&config.template)
        .with_context(|| format!("failed to read template {}", config.template.display()))?;

    let table = match &config.locales {
        Some(path) => LocaleTable::load(path)?,
        None => LocaleTable::builtin(),
    };

    let options = RenderOptions {
        base_url: config.base_url.clone(),
        cache_bust: config.cache_bust.unwrap_or_else(|| Utc::now().timestamp()),
    };

    let documents = generate(&template, &table, &options)?;

    let missing: Vec<(String, Marker)> = documents
        .iter()
        .filter(|doc| !doc.is_complete())
        .flat_map(|doc| doc.missing.iter().map(|m| (doc.code.clone(), *m)))
        .collect();
    for (code, marker) in &missing {
        eprintln!("warning: {code}: marker `{marker}` not found, step skipped");
    }
    if config.strict && !missing.is_empty() {
        return Err(MissingMarkers(missing).into());
    }

    let root_file = config
        .template
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("index.html"));

    let written = if config.dry_run {
        for doc in &documents {
            let path = destination(&config.out_dir, &root_file, &table, doc);
            println!("Would write {}", path.display());
        }
        Vec::new()
    } else {
        write_documents(&config.out_dir, &root_file, &table, &documents)?
    };

    println!("Generated {} language versions", documents.len());

    Ok(RunSummary {
        written,
        missing,
        cache_bust: options.cache_bust,
    })
}
