use super::{ResultReporter, CHART_FILE};
use crate::{
    error::{SimError, SimResult},
    event::LogEntry,
};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// Chart dimensions and labels.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            title: "Served Requests per Timestep".to_string(),
            x_label: "Timestep".to_string(),
            y_label: "Served".to_string(),
        }
    }
}

/// Renders a line chart of served_count against timestep as a PNG.
#[derive(Debug, Clone)]
pub struct ChartReporter {
    dir: PathBuf,
    config: ChartConfig,
}

impl ChartReporter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_config(dir, ChartConfig::default())
    }

    pub fn with_config(dir: impl AsRef<Path>, config: ChartConfig) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), config }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CHART_FILE)
    }
}

impl ResultReporter for ChartReporter {
    fn name(&self) -> &'static str { "chart" }

    fn report(&self, log: &[LogEntry]) -> SimResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        draw_served_chart(log, &self.path(), &self.config)
    }
}

fn draw_served_chart(log: &[LogEntry], path: &Path, config: &ChartConfig) -> SimResult<()> {
    let (first, last) = match (log.first(), log.last()) {
        (Some(f), Some(l)) => (f.timestep, l.timestep),
        _ => return Err(SimError::Chart("no log entries to plot".to_string())),
    };
    let max_served = log.iter().map(|e| e.served_count).max().unwrap_or(0);

    // plotters needs non-empty ranges.
    let x_range = first..last.max(first + 1);
    let y_range = 0..(max_served + max_served / 10).max(1);

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| SimError::Chart(format!("Failed to fill background: {e}")))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, ("sans-serif", 30).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| SimError::Chart(format!("Failed to build chart: {e}")))?;

    chart
        .configure_mesh()
        .x_desc(&config.x_label)
        .y_desc(&config.y_label)
        .draw()
        .map_err(|e| SimError::Chart(format!("Failed to configure mesh: {e}")))?;

    chart
        .draw_series(LineSeries::new(
            log.iter().map(|e| (e.timestep, e.served_count)),
            BLUE.stroke_width(2),
        ))
        .map_err(|e| SimError::Chart(format!("Failed to draw line series: {e}")))?
        .label("Served")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| SimError::Chart(format!("Failed to draw legend: {e}")))?;

    root.present()
        .map_err(|e| SimError::Chart(format!("Failed to save chart: {e}")))?;
    Ok(())
}
