//! Chart rendering: a repaired chart description plus the query result it
//! was built from become a PNG artifact on disk and a base64 copy of the
//! same bytes.

pub mod figure;
pub mod palette;

use crate::fonts::FontResolver;
use crate::spec::{ChartSpec, ChartType};
use crate::table::ResultSet;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use figure::Figure;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info};

/// One finished render. `png_base64` encodes exactly the bytes at `path`.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub path: PathBuf,
    pub png_base64: String,
}

/// Draws chart descriptions into `<type>_<timestamp>.png` artifacts under a
/// fixed output directory. Renders are serialized through a mutex so
/// concurrent callers never interleave work on a drawing surface.
pub struct ChartRenderer {
    output_dir: PathBuf,
    title_family: String,
    render_lock: Mutex<()>,
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        Ok(ChartRenderer {
            output_dir,
            title_family: "sans-serif".to_string(),
            render_lock: Mutex::new(()),
        })
    }

    /// Renderer whose caption font comes from `resolver`. A resolver miss
    /// keeps the default family.
    pub fn with_resolver(
        output_dir: impl Into<PathBuf>,
        resolver: &dyn FontResolver,
    ) -> Result<Self> {
        let mut renderer = ChartRenderer::new(output_dir)?;
        if let Some(family) = resolver.title_family() {
            renderer.title_family = family;
        }
        Ok(renderer)
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    /// Draw `spec` and write the artifact. The only error paths left are
    /// drawing-surface and filesystem failures; the description itself has
    /// already been repaired into drawable shape.
    pub fn render(&self, spec: &ChartSpec, table: &ResultSet) -> Result<RenderedChart> {
        let _guard = self
            .render_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        debug!(
            "rendering {} chart over {} rows",
            spec.chart_type,
            table.row_count()
        );

        let mut figure = Figure::new(spec, &self.title_family);
        match spec.chart_type {
            ChartType::Line => figure.draw_line(spec)?,
            ChartType::Pie => figure.draw_pie(spec)?,
            ChartType::Scatter => figure.draw_scatter(spec)?,
            ChartType::Area => figure.draw_area(spec)?,
            ChartType::Histogram => figure.draw_histogram(spec)?,
            ChartType::StackedBar => figure.draw_stacked_bar(spec)?,
            // Bar doubles as the fallback shape, so it rides the catch-all arm.
            _ => figure.draw_bar(spec)?,
        }

        let png = figure.into_png()?;
        let filename = format!("{}_{}.png", spec.chart_type.as_str(), Utc::now().timestamp());
        let path = self.output_dir.join(filename);
        fs::write(&path, &png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        let png_base64 = STANDARD.encode(&png);

        info!("saved {} byte chart to {}", png.len(), path.display());

        Ok(RenderedChart { path, png_base64 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ChartData, Dataset};

    fn make_spec(chart_type: ChartType) -> ChartSpec {
        ChartSpec {
            chart_type,
            title: "Render Test".to_string(),
            figsize: Some((4.0, 2.0)),
            data: ChartData {
                labels: vec!["a".to_string(), "b".to_string()],
                datasets: vec![Dataset::from_values("one", &[1.0, 2.0])],
            },
            ..ChartSpec::default()
        }
    }

    #[test]
    fn test_render_writes_png_and_matching_base64() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path()).unwrap();
        let table = ResultSet::new(vec!["x".to_string()], vec![]);

        let rendered = renderer.render(&make_spec(ChartType::Bar), &table).unwrap();

        let on_disk = fs::read(&rendered.path).unwrap();
        assert_eq!(&on_disk[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        assert_eq!(STANDARD.decode(&rendered.png_base64).unwrap(), on_disk);
    }

    #[test]
    fn test_artifact_name_carries_type_tag() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path()).unwrap();
        let table = ResultSet::new(vec!["x".to_string()], vec![]);

        let rendered = renderer
            .render(&make_spec(ChartType::StackedBar), &table)
            .unwrap();

        let name = rendered.path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("stacked_bar_"), "got {name}");
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_renderer_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("charts").join("out");
        ChartRenderer::new(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
