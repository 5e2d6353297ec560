use anyhow::{Context, anyhow};

use transform_xml::{
    Cli, ConfigManager, ErrorLog, Output, OutputLayout, Pipeline, Reporter, SaxonTransformer,
    StylesheetIndex, SystemEnvProvider, VerbosityLevel, XmllintFormatter, XmllintValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    cli.validate().map_err(|e| anyhow!(e))?;

    let config = ConfigManager::load_config(&cli, &SystemEnvProvider)
        .await
        .context("failed to load configuration")?;

    let input_root = config
        .layout
        .input_root
        .clone()
        .ok_or_else(|| anyhow!("input root is required"))?;
    let stylesheet_dir = config
        .layout
        .stylesheet_dir
        .clone()
        .ok_or_else(|| anyhow!("stylesheet directory is required"))?;
    let saxon_jar = config
        .engine
        .saxon_jar
        .clone()
        .ok_or_else(|| anyhow!("Saxon jar location is required"))?;

    let index = StylesheetIndex::load(&stylesheet_dir)
        .await
        .with_context(|| format!("failed to load stylesheets from {}", stylesheet_dir.display()))?;
    if index.is_empty() && config.verbosity() > VerbosityLevel::Quiet {
        eprintln!(
            "Warning: no stylesheets found in {}",
            stylesheet_dir.display()
        );
    }

    let layout = OutputLayout::new(
        &input_root,
        &config.layout.output_folder,
        config.layout.placement,
    )?;

    let timeout = config.timeout();
    let pipeline = Pipeline::new(
        index,
        layout,
        SaxonTransformer::new(&config.engine.java_bin, saxon_jar, timeout),
        XmllintFormatter::new(&config.engine.xmllint_bin, timeout),
        XmllintValidator::new(&config.engine.xmllint_bin, timeout),
        ErrorLog::new(&config.reports.error_log),
    )
    .with_schema(config.layout.schema.clone())
    .with_quiet(config.output.quiet)
    .with_include_patterns(&config.files.include_patterns)?
    .with_exclude_patterns(&config.files.exclude_patterns)?;

    let report = pipeline.run().await.context("transformation run failed")?;

    let output = Output::new(config.verbosity());
    print!("{}", output.format_summary(&report));

    let reporter = Reporter::new(
        config
            .reports
            .report_dir
            .clone()
            .unwrap_or_else(Reporter::default_dir),
    );

    match reporter.write_validation_report(&report).await? {
        Some(path) => println!("Validation report written to: {}", path.display()),
        None => {
            if config.layout.schema.is_some() && config.verbosity() > VerbosityLevel::Quiet {
                println!("No validation errors.");
            }
        }
    }
    match reporter.write_unmatched_report(&report).await? {
        Some(path) => println!("Unmatched files report written to: {}", path.display()),
        None => {
            if config.verbosity() > VerbosityLevel::Quiet {
                println!("All XML files matched with XSLTs.");
            }
        }
    }

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
