//! Classify command implementation.

use crate::cli::ClassifyArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use nfse_domain::{Category, InputFile};
use nfse_extractor::{ExtractorConfig, ExtractorError, Pipeline};
use nfse_store::{write_archive, write_directory, CategoryStore};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Execute the classify command.
pub async fn execute_classify(
    args: ClassifyArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let extractor_config = build_config(&args, config)?;
    let inputs = collect_inputs(&args.paths)?;
    if inputs.is_empty() {
        return Err(CliError::InvalidInput("No input files found".to_string()));
    }
    info!("Classifying {} file(s)", inputs.len());

    let pipeline = Pipeline::new(CategoryStore::new(), extractor_config);
    let outcome = pipeline.run(inputs).await?;

    let selected: Vec<Category> = match args.category {
        Some(category) => vec![category.into()],
        None => Category::ALL.to_vec(),
    };
    let filter = args.category.map(Category::from);

    println!("{}", formatter.format_outcome(&outcome, filter)?);

    let store = pipeline.store();
    let store = store
        .lock()
        .map_err(|e| ExtractorError::Lock(e.to_string()))?;

    if let Some(dir) = &args.output {
        let mut count = 0;
        for category in &selected {
            if store.count(*category) == 0 {
                continue;
            }
            let target = dir.join(category.as_str());
            count += write_directory(store.by_category(*category), &target)?.len();
        }
        eprintln!("{}", formatter.exported(count, &dir.display().to_string()));
    }

    if let Some(path) = &args.zip {
        let records = store
            .records()
            .iter()
            .filter(|r| selected.contains(&r.category));
        let count = records.clone().count();
        write_archive(records, File::create(path)?)?;
        eprintln!("{}", formatter.exported(count, &path.display().to_string()));
    }

    if args.strict && outcome.summary.errors > 0 {
        return Err(CliError::UnreadableFiles(outcome.summary.errors));
    }

    Ok(())
}

/// Saved settings with this invocation's overrides applied.
fn build_config(args: &ClassifyArgs, config: &Config) -> Result<ExtractorConfig> {
    let mut extractor_config = config.extractor_config();
    let rule = &mut extractor_config.classification;

    if let Some(tag) = &args.tag {
        rule.tag_name = tag.clone();
    }
    if let Some(value) = &args.tomador {
        rule.tomador_value = value.clone();
    }
    if let Some(value) = &args.prestador {
        rule.prestador_value = value.clone();
    }
    if let Some(parallel) = args.parallel {
        extractor_config.max_parallel_files = parallel;
    }

    extractor_config.validate().map_err(CliError::Config)?;
    Ok(extractor_config)
}

/// Read every path into an input file
///
/// Directories contribute their regular files, sorted by name, without
/// descending into subdirectories.
fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>> {
    let mut inputs = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            files.sort();
            debug!("{}: {} file(s)", path.display(), files.len());

            for file in files {
                inputs.push(read_input(&file)?);
            }
        } else {
            inputs.push(read_input(path)?);
        }
    }

    Ok(inputs)
}

fn read_input(path: &Path) -> Result<InputFile> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::InvalidInput(format!("Not a file: {}", path.display())))?;
    Ok(InputFile::new(name, fs::read(path)?))
}
