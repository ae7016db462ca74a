//! Command-line interface for eulaw-report
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and CLI overrides
//! - Dispatch of the `export`, `presets`, `templates` and `config` commands
//! - Table output for presets and templates

use clap::{Args, Parser, Subcommand};
use nu_ansi_term::Color;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{
    builder::Builder,
    settings::{Alignment, Color as TableColor, Modify, Style, object::Rows, width::Width},
};
use tracing::{debug, info};

use crate::config::{Config, LogLevel};
use crate::error::{PresetError, Result};
use crate::export::{DirectorySink, ExportFormat, ExportManager, ExportOutcome, ProgressTracker};
use crate::model::ExportData;
use crate::report::{ExportOptions, PresetFilters, PresetStore, TemplateCategory, templates};
use crate::utils::convert::format_bytes;
use crate::utils::fs::ensure_dir_exists;

/// Maximum width of a table column (characters)
const MAX_COLUMN_WIDTH: usize = 48;

/// EU case law report exporter
#[derive(Parser, Debug)]
#[command(
    name = "eulaw-report",
    version,
    about = "Export EU case law reports as CSV, HTML, Word or PDF",
    long_about = "Turns a JSON report of EU court cases and their operative parts into a
downloadable CSV, HTML, Word or PDF file, with saved filter presets and report templates."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (no progress bar, errors only)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable the progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for eulaw-report
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a report file
    Export(ExportArgs),

    /// Manage saved filter presets
    Presets {
        #[command(subcommand)]
        action: PresetCommand,
    },

    /// List report templates
    Templates {
        /// Only show one category (standard, analytical, compliance)
        #[arg(long, value_name = "CATEGORY")]
        category: Option<TemplateCategory>,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// Arguments of the `export` command
#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Report data (JSON)
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output format (csv, html, word, pdf)
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub format: Option<ExportFormat>,

    /// Directory the file is written to
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Custom report title
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Custom report subtitle
    #[arg(long, value_name = "SUBTITLE")]
    pub subtitle: Option<String>,

    /// Export verbatim operative part text instead of simplified
    #[arg(long)]
    pub verbatim: bool,

    /// Leave operative parts out of the report
    #[arg(long)]
    pub no_operative_parts: bool,

    /// Leave parties out of the report
    #[arg(long)]
    pub no_parties: bool,

    /// Show the filters of a saved preset in the report header
    #[arg(long, value_name = "ID")]
    pub preset: Option<String>,

    /// Shape the report with a template
    #[arg(long, value_name = "ID")]
    pub template: Option<String>,
}

/// Actions of the `presets` command
#[derive(Subcommand, Debug)]
pub enum PresetCommand {
    /// List saved presets
    List,

    /// Save a new preset
    Save {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_name = "DATE")]
        date_from: Option<String>,
        #[arg(long, value_name = "DATE")]
        date_to: Option<String>,
        #[arg(long)]
        court: Option<String>,
        #[arg(long)]
        legislation: Option<String>,
        #[arg(long)]
        article: Option<String>,
    },

    /// Delete a preset
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Parse the process arguments and load configuration
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Build from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply CLI arguments to configuration
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };

        if args.quiet || args.no_progress {
            config.export.progress_bar = false;
        }

        if let Commands::Export(export) = &args.command {
            if let Some(dir) = &export.output_dir {
                config.export.output_dir = dir.clone();
            }
            if let Some(format) = export.format {
                config.export.default_format = format;
            }
            if export.verbatim {
                config.export.show_simplified = Some(false);
            }
        }
    }

    /// Run the selected subcommand
    pub async fn handle_command(&self) -> Result<()> {
        match &self.args.command {
            Commands::Export(args) => {
                let outcome = self.run_export(args).await?;
                self.print_outcome(&outcome);
                Ok(())
            }
            Commands::Presets { action } => self.handle_presets_command(action),
            Commands::Templates { category } => {
                self.show_templates(*category);
                Ok(())
            }
            Commands::Config { show, validate } => self.handle_config_command(*show, *validate),
        }
    }

    /// Read report data, prepare it and export it
    ///
    /// Ctrl+C cancels the export cooperatively; a cancelled export returns
    /// `Ok(ExportOutcome::Cancelled)`.
    pub async fn run_export(&self, args: &ExportArgs) -> Result<ExportOutcome> {
        let data = read_export_data(&args.input).await?;
        let data = self.prepare_data(data, args)?;
        let format = self.config.export.default_format;

        let output_dir = self.config.output_dir();
        ensure_dir_exists(&output_dir)?;
        let sink = Arc::new(DirectorySink::new(output_dir)?);

        let tracker = ProgressTracker::new(self.config.export.progress_bar);
        let manager = ExportManager::new(sink).with_callback(tracker.observer());

        // Ctrl+C cancels the running export
        let cancel_handle = manager.cancel_handle();
        let ctrl_c_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, cancelling export");
                    cancel_handle.cancel();
                }
                Err(err) => {
                    eprintln!("Failed to listen for Ctrl+C: {}", err);
                }
            }
        });

        let outcome = manager.export(format, &data).await;
        ctrl_c_handle.abort();
        tracker.finish();
        outcome
    }

    /// Apply template, preset and export options in that order
    fn prepare_data(&self, data: ExportData, args: &ExportArgs) -> Result<ExportData> {
        let mut data = data;
        if let Some(show_simplified) = self.config.export.show_simplified {
            data.show_simplified = show_simplified;
        }

        if let Some(id) = &args.template {
            let template = templates::find(id)?;
            debug!("Applying template '{}'", template.id);
            data = template.apply(&data);
        }

        if let Some(id) = &args.preset {
            let store = PresetStore::load(self.config.presets_path())?;
            let preset = store
                .get(id)
                .ok_or_else(|| PresetError::NotFound(id.clone()))?;
            debug!("Using filters of preset '{}'", preset.name);
            data.filters = Some(preset.filters.to_export_filters());
        }

        let options = ExportOptions {
            custom_title: args.title.clone().unwrap_or_default(),
            custom_subtitle: args.subtitle.clone().unwrap_or_default(),
            include_operative_parts: !args.no_operative_parts,
            include_parties: !args.no_parties,
        };
        Ok(options.apply(&data))
    }

    fn print_outcome(&self, outcome: &ExportOutcome) {
        match outcome {
            ExportOutcome::Completed(result) => {
                let status = self.paint(Color::Green, "Export complete");
                println!(
                    "{}: {} ({}, {} case(s), {} ms)",
                    status,
                    result.location,
                    format_bytes(result.file_size_bytes),
                    result.cases_exported,
                    result.elapsed_ms
                );
            }
            ExportOutcome::Cancelled => {
                println!("{}", self.paint(Color::Yellow, "Export cancelled"));
            }
        }
    }

    /// Handle presets subcommand
    fn handle_presets_command(&self, action: &PresetCommand) -> Result<()> {
        let mut store = PresetStore::load(self.config.presets_path())?;

        match action {
            PresetCommand::List => {
                if store.list().is_empty() {
                    println!("No saved presets");
                    return Ok(());
                }
                let rows = store.list().iter().map(|p| {
                    vec![
                        p.id.clone(),
                        p.name.clone(),
                        p.description.clone().unwrap_or_default(),
                        format_filter_summary(&p.filters),
                        p.created_at.clone(),
                    ]
                });
                println!(
                    "{}",
                    self.render_table(&["ID", "Name", "Description", "Filters", "Created"], rows)
                );
            }
            PresetCommand::Save {
                name,
                description,
                date_from,
                date_to,
                court,
                legislation,
                article,
            } => {
                let filters = PresetFilters {
                    date_from: date_from.clone(),
                    date_to: date_to.clone(),
                    court: court.clone(),
                    legislation: legislation.clone(),
                    article: article.clone(),
                };
                if !filters.has_active_filters() {
                    return Err("A preset needs at least one filter value".into());
                }
                let preset = store.save_preset(name, description.as_deref(), filters)?;
                println!(
                    "{} '{}' ({})",
                    self.paint(Color::Green, "Saved preset"),
                    preset.name,
                    preset.id
                );
            }
            PresetCommand::Delete { id } => {
                let removed = store.delete(id)?;
                println!(
                    "{} '{}'",
                    self.paint(Color::Green, "Deleted preset"),
                    removed.name
                );
            }
        }
        Ok(())
    }

    /// Print the template catalog
    fn show_templates(&self, category: Option<TemplateCategory>) {
        let rows = templates::by_category(category).into_iter().map(|t| {
            vec![
                t.id.to_string(),
                t.name.to_string(),
                t.category.to_string(),
                t.description.to_string(),
                t.field_list(),
            ]
        });
        println!(
            "{}",
            self.render_table(&["ID", "Name", "Category", "Description", "Fields"], rows)
        );
    }

    /// Handle config subcommand
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file();
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("{}", self.paint(Color::Red, "Configuration file does not exist"));
            return;
        }

        match Config::from_file(&path) {
            Ok(_) => println!("{}", self.paint(Color::Green, "Configuration is valid")),
            Err(e) => println!(
                "{}: {}",
                self.paint(Color::Red, "Configuration is invalid"),
                e
            ),
        }
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        println!("Configuration file: {}", self.get_config_path().display());
        println!();
        println!("{}", self.config.to_toml()?);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }

    fn use_colors(&self) -> bool {
        !self.args.no_color
    }

    fn paint(&self, color: Color, text: &str) -> String {
        if self.use_colors() {
            color.bold().paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Render rows as a table with a styled header
    fn render_table<I>(&self, headers: &[&str], rows: I) -> String
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut builder = Builder::default();
        builder.push_record(headers.iter().copied());
        for row in rows {
            builder.push_record(row);
        }

        let mut table = builder.build();
        table.with(Style::modern());
        table.with(Modify::new(Rows::new(1..)).with(Width::wrap(MAX_COLUMN_WIDTH)));
        table.with(Modify::new(Rows::first()).with(Alignment::center()));
        if self.use_colors() {
            table.modify(Rows::first(), TableColor::FG_CYAN | TableColor::BOLD);
        }
        table.to_string()
    }
}

/// Read and parse report data from a JSON file
pub async fn read_export_data(path: &Path) -> Result<ExportData> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
    })?;
    let data: ExportData = serde_json::from_str(&content)?;
    debug!("Read {} case(s) from {}", data.cases.len(), path.display());
    Ok(data)
}

fn format_filter_summary(filters: &PresetFilters) -> String {
    filters
        .summary()
        .into_iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::FILENAME_PREFIX;
    use tempfile::TempDir;

    const DATA_JSON: &str = r#"{
        "title": "EU Law Report: GDPR",
        "showSimplified": true,
        "cases": [
            {
                "id": "1",
                "case_id_text": "C-131/12",
                "title": "Google Spain",
                "court": "Court of Justice",
                "date_of_judgment": "2014-05-13",
                "parties": "Google Spain SL v AEPD",
                "operative_parts": [
                    {"id": "p1", "part_number": 1, "verbatim_text": "VERBATIM", "simplified_text": "SIMPLE"}
                ]
            },
            {
                "id": "2",
                "case_id_text": "T-1/20",
                "title": "Second",
                "court": "General Court",
                "date_of_judgment": "2020-02-01"
            }
        ]
    }"#;

    fn cli(dir: &TempDir, extra: &[&str]) -> CliInterface {
        let config_path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.export.output_dir = dir.path().join("out");
        config.export.progress_bar = false;
        config.presets.file_path = dir.path().join("presets.json");
        config.save(&config_path).unwrap();

        let input = dir.path().join("data.json");
        std::fs::write(&input, DATA_JSON).unwrap();

        let mut argv = vec![
            "eulaw-report".to_string(),
            "-c".to_string(),
            config_path.display().to_string(),
            "export".to_string(),
            "--input".to_string(),
            input.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        CliInterface::from_args(CliArgs::try_parse_from(argv).unwrap()).unwrap()
    }

    fn export_args(cli: &CliInterface) -> ExportArgs {
        match &cli.args().command {
            Commands::Export(args) => args.clone(),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(["eulaw-report", "templates"]).unwrap();
        assert!(matches!(args.command, Commands::Templates { category: None }));

        let args = CliArgs::try_parse_from([
            "eulaw-report",
            "export",
            "-i",
            "data.json",
            "--format",
            "docx",
            "--no-parties",
            "-q",
        ])
        .unwrap();
        assert!(args.quiet);
        match args.command {
            Commands::Export(export) => {
                assert_eq!(export.format, Some(ExportFormat::Word));
                assert!(export.no_parties);
                assert!(!export.no_operative_parts);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_invalid_format_is_rejected() {
        assert!(
            CliArgs::try_parse_from(["eulaw-report", "export", "-i", "x.json", "-f", "xml"])
                .is_err()
        );
    }

    #[test]
    fn test_args_override_config() {
        let dir = TempDir::new().unwrap();
        let cli = cli(&dir, &["--format", "pdf", "--verbatim", "--vv"]);
        assert_eq!(cli.config().export.default_format, ExportFormat::Pdf);
        assert_eq!(cli.config().export.show_simplified, Some(false));
        assert_eq!(cli.config().logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_prepare_data_applies_template_and_options() {
        let dir = TempDir::new().unwrap();
        let cli = cli(
            &dir,
            &["--template", "court-analysis", "--title", "Custom", "--verbatim"],
        );
        let data: ExportData = serde_json::from_str(DATA_JSON).unwrap();

        let prepared = cli.prepare_data(data, &export_args(&cli)).unwrap();
        assert_eq!(prepared.title, "Custom");
        assert!(!prepared.show_simplified);
        // Court of Justice sorts before General Court
        assert_eq!(prepared.cases[0].case_id_text, "C-131/12");
        assert_eq!(prepared.cases[0].parties, "Google Spain SL v AEPD");
    }

    #[test]
    fn test_prepare_data_uses_preset_filters() {
        let dir = TempDir::new().unwrap();
        let mut store = PresetStore::load(dir.path().join("presets.json")).unwrap();
        let preset = store
            .save_preset(
                "Court",
                None,
                PresetFilters {
                    court: Some("Court of Justice".to_string()),
                    article: Some("17".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let cli = cli(&dir, &["--preset", &preset.id]);
        let data: ExportData = serde_json::from_str(DATA_JSON).unwrap();
        let prepared = cli.prepare_data(data, &export_args(&cli)).unwrap();
        let filters = prepared.filters.unwrap();
        assert_eq!(filters.court.as_deref(), Some("Court of Justice"));
        assert_eq!(filters.date_from, None);
    }

    #[test]
    fn test_unknown_template_is_error() {
        let dir = TempDir::new().unwrap();
        let cli = cli(&dir, &["--template", "missing"]);
        let data: ExportData = serde_json::from_str(DATA_JSON).unwrap();
        assert!(cli.prepare_data(data, &export_args(&cli)).is_err());
    }

    #[test]
    fn test_run_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let cli = cli(&dir, &["--format", "csv", "--no-parties"]);

        let outcome = tokio_test::block_on(cli.run_export(&export_args(&cli))).unwrap();
        let result = outcome.result().unwrap();
        assert_eq!(result.cases_exported, 2);
        assert!(result.filename.starts_with(FILENAME_PREFIX));

        let written = std::fs::read_to_string(dir.path().join("out").join(&result.filename))
            .unwrap();
        assert_eq!(written.lines().count(), 3);
        assert!(written.contains("SIMPLE"));
        assert!(!written.contains("Google Spain SL v AEPD"));
    }

    #[test]
    fn test_export_keeps_input_text_variant() {
        let dir = TempDir::new().unwrap();
        let cli = cli(&dir, &["--format", "csv"]);
        let verbatim_input =
            DATA_JSON.replace("\"showSimplified\": true", "\"showSimplified\": false");
        std::fs::write(dir.path().join("data.json"), verbatim_input).unwrap();

        let outcome = tokio_test::block_on(cli.run_export(&export_args(&cli))).unwrap();
        let result = outcome.result().unwrap();
        let written = std::fs::read_to_string(dir.path().join("out").join(&result.filename))
            .unwrap();
        assert!(written.contains("VERBATIM"));
        assert!(!written.contains("SIMPLE"));
    }

    #[test]
    fn test_configured_text_variant_overrides_input() {
        let dir = TempDir::new().unwrap();
        let cli = cli(&dir, &[]);
        let mut config = cli.config().clone();
        config.export.show_simplified = Some(false);
        let cli = CliInterface {
            args: cli.args,
            config,
        };
        let data: ExportData = serde_json::from_str(DATA_JSON).unwrap();
        assert!(data.show_simplified);

        let prepared = cli.prepare_data(data, &export_args(&cli)).unwrap();
        assert!(!prepared.show_simplified);
    }

    #[test]
    fn test_render_table_without_colors() {
        let args = CliArgs::try_parse_from(["eulaw-report", "--no-color", "templates"]).unwrap();
        let cli = CliInterface {
            args,
            config: Config::default(),
        };
        let table = cli.render_table(
            &["ID", "Name"],
            vec![vec!["court-analysis".to_string(), "Court Analysis".to_string()]],
        );
        assert!(table.contains("court-analysis"));
        assert!(!table.contains('\u{1b}'));
    }
}
