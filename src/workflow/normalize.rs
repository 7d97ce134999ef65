use crate::config::NormalizeSettings;
use crate::console;
use crate::error::Result;
use crate::runner::{CommandLine, CommandRunner};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static COMMENT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid comment regex"));

static LEGACY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"This script belongs to the [^"\n]*package "([^"]+)""#).expect("valid header regex")
});

fn neos_header(package: &str) -> String {
    format!(
        "/*\n\
         \x20* This file is part of the {package} package.\n\
         \x20*\n\
         \x20* (c) Contributors of the Neos Project - www.neos.io\n\
         \x20*\n\
         \x20* This package is Open Source Software. For the full copyright and license\n\
         \x20* information, please view the LICENSE file which was distributed with this\n\
         \x20* source code.\n\
         \x20*/"
    )
}

// Replaces the first legacy Flow license block. `None` when there is none.
pub fn rewrite_license_header(source: &str) -> Option<String> {
    let block = COMMENT_BLOCK
        .find_iter(source)
        .find(|m| LEGACY_HEADER.is_match(m.as_str()))?;
    let package = LEGACY_HEADER.captures(block.as_str())?.get(1)?.as_str();

    let mut out = String::with_capacity(source.len());
    out.push_str(&source[..block.start()]);
    out.push_str(&neos_header(package));
    out.push_str(&source[block.end()..]);
    Some(out)
}

pub struct Normalizer<'a> {
    runner: &'a CommandRunner,
    settings: &'a NormalizeSettings,
}

impl<'a> Normalizer<'a> {
    pub fn new(runner: &'a CommandRunner, settings: &'a NormalizeSettings) -> Self {
        Self { runner, settings }
    }

    fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.settings.extensions.iter().any(|x| x == ext))
    }

    // Formats and relicenses the touched source files, returning the ones
    // whose license header was rewritten.
    pub fn normalize(&self, collection_path: &Path, files: &[String]) -> Result<Vec<PathBuf>> {
        let mut relicensed = Vec::new();
        for file in files {
            let path = collection_path.join(file);
            if !path.is_file() || !self.is_source_file(&path) {
                continue;
            }

            self.format(collection_path, &path);

            let source = std::fs::read_to_string(&path)?;
            if let Some(rewritten) = rewrite_license_header(&source) {
                std::fs::write(&path, rewritten)?;
                relicensed.push(path);
            }
        }
        Ok(relicensed)
    }

    fn format(&self, collection_path: &Path, path: &Path) {
        let Some((program, args)) = self.settings.formatter.split_first() else {
            return;
        };
        let command = CommandLine::new(program.as_str()).args(args).arg(path);
        if let Err(e) = self.runner.run_forced(&command, collection_path) {
            // a missing formatter is cosmetic, keep going
            console::warning(&format!("formatter skipped for {}: {e}", path.display()));
        }
    }
}
