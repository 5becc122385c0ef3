use anyhow::Context;
use ridingmap::{
    init_logging, render_settled, CliArgs, MapDocument, RenderSettings, BUILD_DATE,
    SETTLE_TIMEOUT, VERSION,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging()?;
    info!("RidingMap {} (built {})", VERSION, BUILD_DATE);

    let cli = CliArgs::parse(std::env::args().skip(1))?;

    let settings = match &cli.config {
        Some(path) => RenderSettings::load_from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => RenderSettings::load_or_default()?,
    };

    let scene = MapDocument::load(&cli.map)
        .and_then(|doc| doc.to_scene())
        .with_context(|| format!("loading map {}", cli.map.display()))?;
    info!(
        "Rendering {} shapes and {} outlines at {}x{}",
        scene.shapes.len(),
        scene.outline.len(),
        cli.width,
        cli.height
    );

    let (surface, stats) = render_settled(&scene, &settings, cli.width, cli.height, SETTLE_TIMEOUT)?;
    surface.save_png(&cli.output)?;
    info!(
        "Wrote {} ({} drawn, {} merged groups, {} pending)",
        cli.output.display(),
        stats.drawn,
        stats.merged_groups,
        stats.pending
    );

    Ok(())
}
