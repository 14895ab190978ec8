//! Import command CLI handler.

use crate::augment::SyntheticAugmenter;
use crate::config::{CliOverrides, ImportSettings, ImportYamlConfig};
use crate::importer::{secondary_files, Importer};
use crate::loader::DuckDbStore;
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[allow(clippy::too_many_arguments)]
pub fn run(
    dump: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    database: Option<PathBuf>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    no_augment: bool,
    progress: bool,
    json: bool,
) -> anyhow::Result<()> {
    let file_config = match config {
        Some(path) => Some(
            ImportYamlConfig::load(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
        ),
        None => None,
    };

    let settings = ImportSettings::resolve(
        CliOverrides {
            dump,
            data_dir,
            database,
            seed,
            no_augment,
        },
        file_config,
    )?;

    info!(
        dump = %settings.dump.display(),
        data_dir = %settings.data_dir.display(),
        database = %settings.database.display(),
        seed = settings.seed,
        "starting import"
    );

    let mut store = DuckDbStore::open(&settings.database)?;

    let mut files = vec![settings.dump.clone()];
    files.extend(secondary_files(&settings.data_dir)?);

    let start = Instant::now();
    let mut importer = Importer::new(&mut store);
    if let Some(augment) = &settings.augment {
        importer = importer.with_augmentation(
            augment.table.clone(),
            SyntheticAugmenter::with_options(settings.seed, augment.options),
        );
    }

    let progress_bar = if progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("invalid progress template")?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    for path in &files {
        if let Some(pb) = &progress_bar {
            pb.set_message(path.display().to_string());
        }
        importer.import_file(path)?;
        if let Some(pb) = &progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Import complete");
    }

    let summary = importer.finish();
    let elapsed = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "✓ Imported {} file(s) into {} in {:.3?}\n",
            summary.files,
            settings.database.display(),
            elapsed
        );
        print!("{}", summary);
    }

    Ok(())
}
