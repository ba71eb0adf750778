mod bootstrap;
mod report;

use anyhow::Result;
use callstats_core::settings::Settings;
use callstats_data::analysis::analyze_export;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("callstats v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "File: {}, View: {}, Format: {}",
        settings.file.display(),
        settings.view,
        settings.format
    );

    let mut analysis = analyze_export(&settings.file)?;

    if settings.strict {
        analysis.aggregation = analysis.aggregation.into_strict()?;
    }

    let output = match settings.format.as_str() {
        "json" => report::to_json(&analysis)?,
        _ => report::render_text(&analysis.aggregation, |view| settings.shows(view)),
    };
    println!("{}", output);

    Ok(())
}
