use crate::render::palette::{parse_color, series_color};
use crate::spec::{ChartSpec, Dataset};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use tracing::warn;

/// Pixels per figure-size unit.
pub const DPI: f64 = 100.0;

const DEFAULT_FIGSIZE: (f64, f64) = (12.0, 6.0);
const MAX_EDGE_PX: f64 = 10_000.0;

/// Background theme picked from the spec's style hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint {
            Some("dark") | Some("dark_background") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    fn background(self) -> RGBColor {
        match self {
            Theme::Light => WHITE,
            Theme::Dark => BLACK,
        }
    }

    fn foreground(self) -> RGBColor {
        match self {
            Theme::Light => BLACK,
            Theme::Dark => WHITE,
        }
    }
}

/// One drawing surface. The figure owns its RGB pixel buffer; every backend
/// borrow opens and closes inside a single drawing method, so a failing pass
/// still releases the surface.
pub struct Figure {
    buffer: Vec<u8>,
    width: u32,
    height: u32,
    theme: Theme,
    title: String,
    title_family: String,
}

impl Figure {
    pub fn new(spec: &ChartSpec, title_family: &str) -> Self {
        let (w, h) = spec
            .figsize
            .filter(|(w, h)| w.is_finite() && h.is_finite() && *w > 0.0 && *h > 0.0)
            .unwrap_or(DEFAULT_FIGSIZE);
        let width = (w * DPI).round().min(MAX_EDGE_PX).max(1.0) as u32;
        let height = (h * DPI).round().min(MAX_EDGE_PX).max(1.0) as u32;

        Figure {
            buffer: vec![0u8; width as usize * height as usize * 3],
            width,
            height,
            theme: Theme::from_hint(spec.style.as_deref()),
            title: spec.title.clone(),
            title_family: title_family.to_string(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Grouped bars, one group per label, one bar per dataset.
    pub fn draw_bar(&mut self, spec: &ChartSpec) -> Result<()> {
        let labels = spec.data.labels.clone();
        let datasets = &spec.data.datasets;
        let n_categories = labels.len();
        let n_series = datasets.len();

        let (y_min, y_max) = extent(present_values(datasets)).unwrap_or((0.0, 1.0));
        let y_range = padded_range(y_min.min(0.0), y_max.max(0.0));
        let x_range = 0.0..(n_categories.max(1) as f64);

        let theme = self.theme;
        let fg = theme.foreground();
        let title = self.title.clone();
        let family = self.title_family.clone();

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&theme.background())
            .context("Failed to fill background")?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(&title, (family.as_str(), 22).into_font().color(&fg))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        draw_category_mesh(&mut chart, &labels, fg, false)?;

        let bar_width = 0.8 / n_series.max(1) as f64;
        for (series_idx, dataset) in datasets.iter().enumerate() {
            let color = series_color(series_idx);
            let count = dataset.data.len().min(n_categories);
            let bars: Vec<_> = dataset.data[..count]
                .iter()
                .enumerate()
                .filter_map(|(cat_idx, cell)| {
                    cell.map(|value| {
                        let center = bar_center(cat_idx, series_idx, n_series, bar_width);
                        Rectangle::new(
                            [
                                (center - bar_width / 2.0, 0.0),
                                (center + bar_width / 2.0, value),
                            ],
                            color.filled(),
                        )
                    })
                })
                .collect();

            chart
                .draw_series(bars)
                .context("Failed to draw bar series")?
                .label(&dataset.label)
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 4), (x + 8, y + 4)], color.filled())
                });
        }

        draw_legend(&mut chart, fg)?;
        root.present().context("Failed to present drawing")?;

        Ok(())
    }

    /// Polylines with point markers. Null cells split a series into runs,
    /// leaving visible gaps. Consumes the y clamp, trend overlays and
    /// annotations from the options tree.
    pub fn draw_line(&mut self, spec: &ChartSpec) -> Result<()> {
        let labels = spec.data.labels.clone();
        let datasets = &spec.data.datasets;
        let n_categories = labels.len();

        let y_range = match spec.y_bounds() {
            Some((min, max)) => min..max,
            None => {
                let (y_min, y_max) = extent(present_values(datasets)).unwrap_or((0.0, 1.0));
                padded_range(y_min, y_max)
            }
        };
        let x_range = 0.0..(n_categories.max(1) as f64);

        let theme = self.theme;
        let fg = theme.foreground();
        let title = self.title.clone();
        let family = self.title_family.clone();

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&theme.background())
            .context("Failed to fill background")?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(&title, (family.as_str(), 22).into_font().color(&fg))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        draw_category_mesh(&mut chart, &labels, fg, false)?;

        for (series_idx, dataset) in datasets.iter().enumerate() {
            let color = series_color(series_idx);
            let runs = present_runs(&dataset.data, n_categories);

            for run in &runs {
                if run.len() > 1 {
                    chart
                        .draw_series(LineSeries::new(
                            run.iter().copied(),
                            color.stroke_width(2),
                        ))
                        .context("Failed to draw line series")?;
                }
            }

            let markers: Vec<_> = runs
                .iter()
                .flatten()
                .map(|&(x, y)| Circle::new((x, y), 3, color.filled()))
                .collect();
            chart
                .draw_series(markers)
                .context("Failed to draw line markers")?
                .label(&dataset.label)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        draw_trend_lines(&mut chart, spec, n_categories)?;
        draw_annotations(&mut chart, spec, &labels, fg)?;

        draw_legend(&mut chart, fg)?;
        root.present().context("Failed to present drawing")?;

        Ok(())
    }

    /// Pie over the first dataset. Null cells drop with their labels in
    /// lockstep; negative values are absolute-valued.
    pub fn draw_pie(&mut self, spec: &ChartSpec) -> Result<()> {
        let theme = self.theme;
        let fg = theme.foreground();
        let title = self.title.clone();
        let family = self.title_family.clone();

        let (sizes, labels) = match spec.data.datasets.first() {
            Some(dataset) => {
                if dataset.data.iter().flatten().any(|v| *v < 0.0) {
                    warn!("negative values in pie data, using absolute values");
                }
                pie_slices(dataset, &spec.data.labels)
            }
            None => (Vec::new(), Vec::new()),
        };

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&theme.background())
            .context("Failed to fill background")?;
        let root = root
            .titled(&title, (family.as_str(), 22).into_font().color(&fg))
            .context("Failed to draw title")?;

        let dims = root.dim_in_pixel();
        let center = (dims.0 as i32 / 2, dims.1 as i32 / 2);

        if sizes.is_empty() || sizes.iter().sum::<f64>() <= 0.0 {
            let style = ("sans-serif", 24)
                .into_font()
                .color(&fg)
                .pos(Pos::new(HPos::Center, VPos::Center));
            root.draw_text("No data", &style, center)
                .context("Failed to draw placeholder")?;
            root.present().context("Failed to present drawing")?;
            return Ok(());
        }

        let colors: Vec<RGBColor> = (0..sizes.len()).map(series_color).collect();
        let radius = f64::from(dims.0.min(dims.1)) * 0.35;

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(90.0);
        pie.label_style(("sans-serif", 14).into_font().color(&fg));
        pie.percentages(("sans-serif", 12).into_font().color(&theme.background()));
        root.draw(&pie).context("Failed to draw pie")?;

        root.present().context("Failed to present drawing")?;

        Ok(())
    }

    /// Each dataset plotted against its own 0-based index.
    pub fn draw_scatter(&mut self, spec: &ChartSpec) -> Result<()> {
        let labels = spec.data.labels.clone();
        let datasets = &spec.data.datasets;
        let n_slots = datasets
            .iter()
            .map(|d| d.data.len())
            .max()
            .unwrap_or(0)
            .max(labels.len());

        let (y_min, y_max) = extent(present_values(datasets)).unwrap_or((0.0, 1.0));
        let y_range = padded_range(y_min, y_max);
        let x_range = 0.0..(n_slots.max(1) as f64);

        let theme = self.theme;
        let fg = theme.foreground();
        let title = self.title.clone();
        let family = self.title_family.clone();

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&theme.background())
            .context("Failed to fill background")?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(&title, (family.as_str(), 22).into_font().color(&fg))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        draw_category_mesh(&mut chart, &labels, fg, true)?;

        for (series_idx, dataset) in datasets.iter().enumerate() {
            let color = series_color(series_idx).mix(0.7);
            let points: Vec<_> = dataset
                .data
                .iter()
                .enumerate()
                .filter_map(|(idx, cell)| {
                    cell.map(|value| Circle::new((idx as f64 + 0.5, value), 4, color.filled()))
                })
                .collect();

            let legend_color = series_color(series_idx);
            chart
                .draw_series(points)
                .context("Failed to draw scatter series")?
                .label(&dataset.label)
                .legend(move |(x, y)| Circle::new((x + 4, y), 4, legend_color.filled()));
        }

        draw_legend(&mut chart, fg)?;
        root.present().context("Failed to present drawing")?;

        Ok(())
    }

    /// Semi-transparent fill plus outline per dataset, overlaid without any
    /// cumulative offset. Null cells split the fill into runs.
    pub fn draw_area(&mut self, spec: &ChartSpec) -> Result<()> {
        let labels = spec.data.labels.clone();
        let datasets = &spec.data.datasets;
        let n_categories = labels.len();

        let (y_min, y_max) = extent(present_values(datasets)).unwrap_or((0.0, 1.0));
        let y_range = padded_range(y_min.min(0.0), y_max.max(0.0));
        let x_range = 0.0..(n_categories.max(1) as f64);

        let theme = self.theme;
        let fg = theme.foreground();
        let title = self.title.clone();
        let family = self.title_family.clone();

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&theme.background())
            .context("Failed to fill background")?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(&title, (family.as_str(), 22).into_font().color(&fg))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        draw_category_mesh(&mut chart, &labels, fg, false)?;

        for (series_idx, dataset) in datasets.iter().enumerate() {
            let color = series_color(series_idx);
            let runs = present_runs(&dataset.data, n_categories);
            let mut labeled = false;

            for run in &runs {
                chart
                    .draw_series(AreaSeries::new(run.iter().copied(), 0.0, color.mix(0.3)))
                    .context("Failed to draw area series")?;

                let outline = chart
                    .draw_series(LineSeries::new(
                        run.iter().copied(),
                        color.stroke_width(2),
                    ))
                    .context("Failed to draw area outline")?;
                if !labeled {
                    outline.label(&dataset.label).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                    labeled = true;
                }
            }
        }

        draw_legend(&mut chart, fg)?;
        root.present().context("Failed to present drawing")?;

        Ok(())
    }

    /// Ten fixed-width bins over the first dataset; null cells are ignored.
    pub fn draw_histogram(&mut self, spec: &ChartSpec) -> Result<()> {
        let dataset = spec.data.datasets.first();
        let values: Vec<f64> = dataset
            .map(|d| d.data.iter().flatten().copied().collect())
            .unwrap_or_default();
        let bins = histogram_bins(&values, 10);

        let (x_range, y_range) = match (bins.first(), bins.last()) {
            (Some(first), Some(last)) => {
                let max_count = bins.iter().map(|b| b.2).max().unwrap_or(0);
                (
                    padded_range(first.0, last.1),
                    padded_range(0.0, max_count.max(1) as f64),
                )
            }
            _ => (padded_range(0.0, 1.0), padded_range(0.0, 1.0)),
        };

        let theme = self.theme;
        let fg = theme.foreground();
        let title = self.title.clone();
        let family = self.title_family.clone();

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&theme.background())
            .context("Failed to fill background")?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(&title, (family.as_str(), 22).into_font().color(&fg))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .label_style(("sans-serif", 12).into_font().color(&fg))
            .axis_style(fg)
            .bold_line_style(fg.mix(0.2))
            .light_line_style(fg.mix(0.08))
            .draw()
            .context("Failed to draw mesh")?;

        if !bins.is_empty() {
            let color = series_color(0).mix(0.7);
            let label = dataset.map(|d| d.label.clone()).unwrap_or_default();
            let rects: Vec<_> = bins
                .iter()
                .map(|&(left, right, count)| {
                    Rectangle::new([(left, 0.0), (right, count as f64)], color.filled())
                })
                .collect();

            let legend_color = series_color(0);
            chart
                .draw_series(rects)
                .context("Failed to draw histogram bins")?
                .label(label)
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 4), (x + 8, y + 4)], legend_color.filled())
                });
        }

        draw_legend(&mut chart, fg)?;
        root.present().context("Failed to present drawing")?;

        Ok(())
    }

    /// Bars stacked in dataset order. The bottom accumulator starts at zero
    /// on every call; null cells leave it untouched.
    pub fn draw_stacked_bar(&mut self, spec: &ChartSpec) -> Result<()> {
        let labels = spec.data.labels.clone();
        let datasets = &spec.data.datasets;
        let n_categories = labels.len();

        let segments = stacked_segments(datasets, n_categories);
        let (y_min, y_max) = segment_extent(&segments);
        let y_range = padded_range(y_min, y_max.max(1.0));
        let x_range = 0.0..(n_categories.max(1) as f64);

        let theme = self.theme;
        let fg = theme.foreground();
        let title = self.title.clone();
        let family = self.title_family.clone();

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&theme.background())
            .context("Failed to fill background")?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(&title, (family.as_str(), 22).into_font().color(&fg))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .context("Failed to build chart")?;

        draw_category_mesh(&mut chart, &labels, fg, false)?;

        let bar_width = 0.8;
        for (series_idx, (dataset, layer)) in datasets.iter().zip(&segments).enumerate() {
            let color = series_color(series_idx);
            let rects: Vec<_> = layer
                .iter()
                .map(|&(cat_idx, bottom, top)| {
                    let center = cat_idx as f64 + 0.5;
                    Rectangle::new(
                        [
                            (center - bar_width / 2.0, bottom),
                            (center + bar_width / 2.0, top),
                        ],
                        color.filled(),
                    )
                })
                .collect();

            chart
                .draw_series(rects)
                .context("Failed to draw stacked bar series")?
                .label(&dataset.label)
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 4), (x + 8, y + 4)], color.filled())
                });
        }

        draw_legend(&mut chart, fg)?;
        root.present().context("Failed to present drawing")?;

        Ok(())
    }

    /// Encode the finished surface as PNG.
    pub fn into_png(self) -> Result<Vec<u8>> {
        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(
                    &self.buffer,
                    self.width,
                    self.height,
                    image::ColorType::Rgb8,
                )
                .context("Failed to encode PNG")?;
        }

        Ok(png_bytes)
    }
}

type Cartesian<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_category_mesh(
    chart: &mut Cartesian<'_, '_>,
    labels: &[String],
    fg: RGBColor,
    full_grid: bool,
) -> Result<()> {
    let axis_labels = labels.to_vec();
    let formatter = move |x: &f64| {
        let idx = *x as usize;
        axis_labels.get(idx).cloned().unwrap_or_default()
    };

    let mut mesh = chart.configure_mesh();
    if !full_grid {
        mesh.disable_x_mesh();
    }
    mesh.x_labels(labels.len().max(1))
        .x_label_formatter(&formatter)
        .label_style(("sans-serif", 12).into_font().color(&fg))
        .axis_style(fg)
        .bold_line_style(fg.mix(0.2))
        .light_line_style(fg.mix(0.08))
        .draw()
        .context("Failed to draw mesh")?;

    Ok(())
}

fn draw_legend<'a, 'b: 'a>(chart: &mut Cartesian<'a, 'b>, fg: RGBColor) -> Result<()> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(fg.mix(0.5))
        .label_font(("sans-serif", 12).into_font().color(&BLACK))
        .draw()
        .context("Failed to draw legend")?;

    Ok(())
}

/// Trend overlays all share one source: the last dataset's two-point slope
/// between its first and last cells, extended across every category. The
/// fit stays linear no matter what `kind` an entry asks for.
fn draw_trend_lines(
    chart: &mut Cartesian<'_, '_>,
    spec: &ChartSpec,
    n_categories: usize,
) -> Result<()> {
    if spec.options.trend_lines.is_empty() || n_categories < 2 {
        return Ok(());
    }
    let source = match spec.data.datasets.last() {
        Some(dataset) if dataset.data.len() >= 2 => &dataset.data,
        _ => return Ok(()),
    };
    let (first, end) = match (source.first().copied(), source.last().copied()) {
        (Some(Some(first)), Some(Some(end))) => (first, end),
        _ => return Ok(()),
    };

    let slope = (end - first) / (n_categories as f64 - 1.0);
    for trend in &spec.options.trend_lines {
        let color = parse_color(trend.color.as_deref());
        let points: Vec<(f64, f64)> = (0..n_categories)
            .map(|i| (i as f64 + 0.5, first + slope * i as f64))
            .collect();

        chart
            .draw_series(DashedLineSeries::new(points, 5, 3, color.stroke_width(1)))
            .context("Failed to draw trend line")?
            .label(&trend.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    Ok(())
}

/// Annotations anchor to an exact label match and are skipped silently
/// otherwise.
fn draw_annotations(
    chart: &mut Cartesian<'_, '_>,
    spec: &ChartSpec,
    labels: &[String],
    fg: RGBColor,
) -> Result<()> {
    for annotation in &spec.options.annotations {
        let idx = match labels.iter().position(|label| *label == annotation.x) {
            Some(idx) => idx,
            None => continue,
        };
        let style = ("sans-serif", 12)
            .into_font()
            .color(&fg)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart
            .draw_series(std::iter::once(Text::new(
                annotation.content.clone(),
                (idx as f64 + 0.5, annotation.y),
                style,
            )))
            .context("Failed to draw annotation")?;
    }

    Ok(())
}

/// Center of the bar for dataset `series_idx` at category `cat_idx`.
pub(crate) fn bar_center(
    cat_idx: usize,
    series_idx: usize,
    n_series: usize,
    bar_width: f64,
) -> f64 {
    let offset = (series_idx as f64 - n_series as f64 / 2.0 + 0.5) * bar_width;
    cat_idx as f64 + 0.5 + offset
}

/// Consecutive present cells as (x, y) runs; a null cell ends the run.
pub(crate) fn present_runs(data: &[Option<f64>], max_len: usize) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (idx, cell) in data.iter().take(max_len).enumerate() {
        match cell {
            Some(value) => current.push((idx as f64 + 0.5, *value)),
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Slices for the pie pass: null cells drop with their labels in lockstep,
/// negatives are absolute-valued. A value past the end of the label list
/// falls back to its index.
pub(crate) fn pie_slices(dataset: &Dataset, labels: &[String]) -> (Vec<f64>, Vec<String>) {
    let mut sizes = Vec::new();
    let mut kept = Vec::new();
    for (idx, cell) in dataset.data.iter().enumerate() {
        if let Some(value) = cell {
            sizes.push(value.abs());
            kept.push(
                labels
                    .get(idx)
                    .cloned()
                    .unwrap_or_else(|| idx.to_string()),
            );
        }
    }
    (sizes, kept)
}

/// Fixed-count equal-width bins over `values`. The top bin is closed so the
/// maximum lands inside it.
pub(crate) fn histogram_bins(values: &[f64], bin_count: usize) -> Vec<(f64, f64, usize)> {
    if values.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &value in values {
        min = min.min(value);
        max = max.max(value);
    }
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];
    for &value in values {
        let mut idx = ((value - min) / width) as usize;
        if idx >= bin_count {
            idx = bin_count - 1;
        }
        counts[idx] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(idx, &count)| {
            (
                min + idx as f64 * width,
                min + (idx + 1) as f64 * width,
                count,
            )
        })
        .collect()
}

/// Per dataset, the (slot, bottom, top) span of each drawn segment. Null
/// cells leave the accumulator untouched and produce no segment.
pub(crate) fn stacked_segments(
    datasets: &[Dataset],
    n_slots: usize,
) -> Vec<Vec<(usize, f64, f64)>> {
    let mut bottoms = vec![0.0f64; n_slots];
    let mut layers = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let mut segments = Vec::new();
        for (idx, cell) in dataset.data.iter().take(n_slots).enumerate() {
            if let Some(value) = cell {
                let bottom = bottoms[idx];
                let top = bottom + value;
                segments.push((idx, bottom, top));
                bottoms[idx] = top;
            }
        }
        layers.push(segments);
    }
    layers
}

fn segment_extent(layers: &[Vec<(usize, f64, f64)>]) -> (f64, f64) {
    let mut min = 0.0f64;
    let mut max = 0.0f64;
    for layer in layers {
        for &(_, bottom, top) in layer {
            min = min.min(bottom.min(top));
            max = max.max(bottom.max(top));
        }
    }
    (min, max)
}

fn present_values<'a>(datasets: &'a [Dataset]) -> impl Iterator<Item = f64> + 'a {
    datasets
        .iter()
        .flat_map(|dataset| dataset.data.iter().flatten().copied())
}

fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut seen = false;
    for value in values {
        seen = true;
        min = min.min(value);
        max = max.max(value);
    }
    if seen {
        Some((min, max))
    } else {
        None
    }
}

fn padded_range(min: f64, max: f64) -> Range<f64> {
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}
