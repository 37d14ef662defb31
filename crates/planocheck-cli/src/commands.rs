//! Command handlers

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{info, warn};

use planocheck_app::app::{AuditService, AuditServiceError};
use planocheck_app::config::Config;
use planocheck_app::repository::{open_audit_repo, open_store_repo};
use planocheck_app::scanner::scan_directory;
use planocheck_app::seed::seed_demo_store;
use planocheck_domain::model::NewStore;
use planocheck_domain::repository::{AuditRepository, StoreRepository};
use planocheck_domain::service::audit_detections;
use planocheck_infra::planogram_loader::load_planogram;
use planocheck_types::{Error, OutputFormat, Planogram};
use planocheck_vision::{
    parse_detections, CommandDetectionProvider, DetectionProvider, JsonFileDetectionProvider,
};

use crate::cli::{Cli, Commands, StoreAction};
use crate::output::{
    output_audit, output_history, output_report, output_store, output_stores,
};

/// Failure of a CLI command, classified for the process exit code
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Domain(#[from] Error),

    #[error(transparent)]
    Audit(#[from] AuditServiceError),
}

impl CommandError {
    /// 2 = not found, 3 = invalid input, 1 = anything else
    pub fn exit_code(&self) -> i32 {
        let (not_found, invalid) = match self {
            CommandError::Domain(e) => (e.is_not_found(), e.is_invalid_input()),
            CommandError::Audit(e) => (e.is_not_found(), e.is_invalid_input()),
        };
        if not_found {
            2
        } else if invalid {
            3
        } else {
            1
        }
    }
}

type CmdResult = std::result::Result<(), CommandError>;

pub fn execute(cli: Cli) -> CmdResult {
    let mut config = Config::load()?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = Some(dir);
    }
    if let Some(cmd) = cli.detector.clone() {
        config.detector_command = Some(cmd);
    }
    let format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Store { action } => cmd_store(&config, format, action),
        Commands::Audit { store_id, image } => cmd_audit(&config, format, store_id, &image),
        Commands::Batch { store_id, folder } => cmd_batch(&config, format, store_id, &folder),
        Commands::Evaluate {
            planogram,
            detections,
        } => cmd_evaluate(&config, format, &planogram, &detections),
        Commands::History { store } => cmd_history(&config, format, store),
        Commands::Report { audit_id } => cmd_report(&config, format, audit_id),
        Commands::Seed => cmd_seed(&config, format),
        Commands::Config {
            show,
            set_data_dir,
            set_detector,
            clear_detector,
            set_min_confidence,
            set_low_confidence,
            set_output,
        } => {
            // Persist only values passed to `config`, not global overrides
            let mut saved = Config::load()?;
            let mut changed = false;
            if let Some(dir) = set_data_dir {
                saved.data_dir = Some(dir);
                changed = true;
            }
            if let Some(cmd) = set_detector {
                saved.detector_command = Some(cmd);
                changed = true;
            }
            if clear_detector {
                saved.detector_command = None;
                changed = true;
            }
            if let Some(c) = set_min_confidence {
                saved.min_confidence = c;
                changed = true;
            }
            if let Some(c) = set_low_confidence {
                saved.low_confidence_threshold = c;
                changed = true;
            }
            if let Some(f) = set_output {
                saved.output_format = f;
                changed = true;
            }
            if changed {
                saved.save()?;
                println!("Configuration saved.");
            }
            if show || !changed {
                print!("{}", saved);
            }
            Ok(())
        }
    }
}

/// Composition root for the detection provider
fn build_detector(config: &Config) -> std::result::Result<Box<dyn DetectionProvider>, Error> {
    match config.detector_command.as_deref() {
        Some(cmd) if !cmd.trim().is_empty() => {
            let provider = CommandDetectionProvider::new(cmd)?
                .with_min_confidence(config.min_confidence)
                .with_low_confidence(config.low_confidence_threshold);
            info!("Using detector command: {}", provider.program());
            Ok(Box::new(provider))
        }
        _ => {
            info!("No detector command configured, reading sidecar detection files");
            Ok(Box::new(JsonFileDetectionProvider::new()))
        }
    }
}

fn build_service(config: &Config) -> std::result::Result<AuditService, Error> {
    Ok(AuditService::new(
        Box::new(open_store_repo(config)?),
        Box::new(open_audit_repo(config)?),
        build_detector(config)?,
        config.images_dir()?,
    ))
}

fn cmd_store(config: &Config, format: OutputFormat, action: StoreAction) -> CmdResult {
    let repo = open_store_repo(config)?;
    match action {
        StoreAction::Add {
            name,
            location,
            planogram,
        } => {
            let planogram = match planogram {
                Some(path) => load_planogram(&path)?,
                None => Planogram::new(),
            };
            if let Some(entry) = planogram.iter().find(|e| e.expected < 0) {
                return Err(Error::InvalidPlanogram(format!(
                    "{} has negative expected quantity {}",
                    entry.product, entry.expected
                ))
                .into());
            }
            let store = repo.create(NewStore {
                name,
                location,
                planogram,
            })?;
            output_store(format, &store)?;
        }
        StoreAction::List => output_stores(format, &repo.find_all()?)?,
        StoreAction::Show { store_id } => {
            let store = repo
                .find_by_id(store_id)?
                .ok_or(Error::StoreNotFound(store_id))?;
            output_store(format, &store)?;
        }
    }
    Ok(())
}

fn cmd_audit(config: &Config, format: OutputFormat, store_id: u64, image: &Path) -> CmdResult {
    let service = build_service(config)?;
    let audit = service.process_shelf_audit(store_id, image)?;
    let store_name = service
        .stores()
        .find_by_id(store_id)?
        .map(|s| s.name)
        .unwrap_or_default();
    output_audit(format, &audit, &store_name, config.low_confidence_threshold)?;
    Ok(())
}

fn cmd_batch(config: &Config, format: OutputFormat, store_id: u64, folder: &Path) -> CmdResult {
    let service = build_service(config)?;
    if service.stores().find_by_id(store_id)?.is_none() {
        return Err(Error::StoreNotFound(store_id).into());
    }
    let images = scan_directory(folder)?;
    if images.is_empty() {
        warn!("No images found in {}", folder.display());
        return Ok(());
    }

    let pb = ProgressBar::new(images.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let mut audits = Vec::new();
    let mut failures = 0usize;
    for image in &images {
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        pb.set_message(name);
        match service.process_shelf_audit(store_id, image) {
            Ok(audit) => audits.push(audit),
            Err(e) => {
                failures += 1;
                pb.suspend(|| warn!("{}: {}", image.display(), e));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&audits).map_err(Error::from)?);
        return Ok(());
    }

    output_history(format, &audits)?;
    println!();
    println!("Audited: {}  Failed: {}", audits.len(), failures);
    if !audits.is_empty() {
        let mean = audits.iter().map(|a| a.report.compliance_score).sum::<f64>() / audits.len() as f64;
        println!("Mean compliance score: {:.2}%", mean);
    }
    Ok(())
}

fn cmd_evaluate(
    config: &Config,
    format: OutputFormat,
    planogram_path: &Path,
    detections_path: &Path,
) -> CmdResult {
    let planogram = load_planogram(planogram_path)?;
    if !detections_path.exists() {
        return Err(Error::FileNotFound(detections_path.display().to_string()).into());
    }
    let content = std::fs::read_to_string(detections_path).map_err(Error::from)?;
    let detections = parse_detections(&content)?;
    let report = audit_detections(detections, &planogram)?;
    output_report(
        format,
        &report,
        &planogram_path.display().to_string(),
        config.low_confidence_threshold,
    )?;
    Ok(())
}

fn cmd_history(config: &Config, format: OutputFormat, store: Option<u64>) -> CmdResult {
    let repo = open_audit_repo(config)?;
    let audits = match store {
        Some(id) => repo.find_by_store(id)?,
        None => repo.find_all()?,
    };
    output_history(format, &audits)?;
    Ok(())
}

fn cmd_report(config: &Config, format: OutputFormat, audit_id: u64) -> CmdResult {
    let audits = open_audit_repo(config)?;
    let audit = audits
        .find_by_id(audit_id)?
        .ok_or(Error::AuditNotFound(audit_id))?;
    let store_name = open_store_repo(config)?
        .find_by_id(audit.store_id)?
        .map(|s| s.name)
        .unwrap_or_else(|| format!("store #{}", audit.store_id));
    output_audit(format, &audit, &store_name, config.low_confidence_threshold)?;
    Ok(())
}

fn cmd_seed(config: &Config, format: OutputFormat) -> CmdResult {
    let repo = open_store_repo(config)?;
    match seed_demo_store(&repo)? {
        Some(store) => output_store(format, &store)?,
        None => println!("Stores already exist; nothing seeded."),
    }
    Ok(())
}
