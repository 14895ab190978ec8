//! Inspect command CLI handler.

use crate::augment::SyntheticAugmenter;
use crate::config::DEFAULT_AUGMENT_TABLE;
use crate::importer::Importer;
use crate::loader::MemoryLoader;
use std::io::{self, Write};
use std::path::PathBuf;

pub fn run(file: PathBuf, seed: Option<u64>, no_augment: bool) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("input file does not exist: {}", file.display());
    }

    let mut sink = MemoryLoader::new();
    let mut importer = Importer::new(&mut sink);
    if !no_augment {
        let seed = seed.unwrap_or_else(rand::random);
        importer = importer.with_augmentation(DEFAULT_AUGMENT_TABLE, SyntheticAugmenter::new(seed));
    }

    importer.import_file(&file)?;
    let summary = importer.finish();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for record in sink.records() {
        writeln!(out, "{}", serde_json::to_string(record)?)?;
    }

    eprint!("{}", summary);
    Ok(())
}
