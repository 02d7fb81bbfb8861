//! Terminal implementations of the rendering collaborators.
//!
//! The dashboard core only talks to trait seams; here they print. The
//! street layer renders as a per-risk-level summary rather than one
//! line per segment, since city-wide sets run to thousands of features.

use console::style;
use shade_map_classify::{RiskLevel, risk_level};
use shade_map_dashboard::filter::FilteredLayer;
use shade_map_dashboard::render::{ChartSink, RenderSurface};
use shade_map_metrics::SegmentMetrics;
use shade_map_spatial::Bounds;

/// Render surface that prints layer summaries and viewport changes.
#[derive(Default)]
pub struct TerminalSurface {
    /// Segment count of the last rendered layer.
    pub last_layer_size: usize,
}

impl RenderSurface for TerminalSurface {
    fn replace_street_layer(&mut self, layer: &FilteredLayer) {
        self.last_layer_size = layer.segments.len();

        let mut counts = [0_usize; 4];
        for segment in &layer.segments {
            let idx = match risk_level(&segment.attributes) {
                RiskLevel::High => 0,
                RiskLevel::Medium => 1,
                RiskLevel::Low => 2,
                RiskLevel::NoData => 3,
            };
            counts[idx] += 1;
        }

        println!(
            "{} {} segments ({:?} scale)",
            style("Street layer:").bold(),
            layer.segments.len(),
            layer.scale
        );
        println!(
            "  {} high risk, {} medium, {} low, {} without data",
            style(counts[0]).red(),
            style(counts[1]).yellow(),
            style(counts[2]).green(),
            style(counts[3]).dim()
        );
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        let (lng, lat) = bounds.center();
        println!(
            "Viewport: [{:.4}, {:.4}] .. [{:.4}, {:.4}] (center {lng:.4}, {lat:.4})",
            bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
        );
    }

    fn fit_point(&mut self, lng: f64, lat: f64) {
        println!("Viewport centered on ({lng:.4}, {lat:.4})");
    }

    fn set_neighborhood_highlight(&mut self, code: Option<&str>) {
        match code {
            Some(code) => println!("Highlighted neighborhood {code}"),
            None => println!("Neighborhood highlight cleared"),
        }
    }

    fn set_cluster_overlay(&mut self, clusters: Option<&geojson::FeatureCollection>) {
        match clusters {
            Some(fc) => println!("Cluster overlay shown ({} polygons)", fc.features.len()),
            None => println!("Cluster overlay hidden"),
        }
    }

    fn notify(&mut self, message: &str) {
        println!("{} {message}", style("Notice:").yellow().bold());
    }
}

/// Chart sink that prints the detail panel as text.
#[derive(Default)]
pub struct TerminalCharts;

impl ChartSink for TerminalCharts {
    fn draw(&mut self, metrics: &SegmentMetrics) {
        println!();
        println!("{}", style(&metrics.name).bold().underlined());
        match metrics.final_score {
            Some(score) => println!("  Risk: {} ({score:.2})", metrics.risk),
            None => println!("  Risk: {}", metrics.risk),
        }
        println!("  Flow: {}", metrics.flow);
        println!("  Shade: {}", metrics.shade);

        println!("  Age distribution:");
        for band in &metrics.age_bands {
            println!("    {}", band.display());
        }

        match &metrics.origin {
            Some(shares) => {
                println!("  Origin neighborhoods:");
                for share in shares {
                    println!("    {}", share.display());
                }
            }
            None => println!("  Origin neighborhoods: no data"),
        }

        match metrics.gauge {
            Some(gauge) => println!(
                "  Comfort index: {:.2} (band {}/5, pointer at {:.0}%)",
                gauge.value,
                gauge.band_index() + 1,
                gauge.pointer_fraction() * 100.0
            ),
            None => println!("  Comfort index: no data"),
        }

        println!("  Sun exposure (09:00-20:00):");
        let bars: String = metrics
            .sun_exposure
            .iter()
            .map(|bar| spark_char(bar.value))
            .collect();
        println!("    {bars}");
    }
}

/// Maps an exposure fraction to a spark-line glyph.
fn spark_char(value: f64) -> char {
    const GLYPHS: [char; 8] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '█'];
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let idx = ((value.clamp(0.0, 1.0) * 7.0).round()) as usize;
    GLYPHS[idx.min(7)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spark_chars_span_the_range() {
        assert_eq!(spark_char(0.0), ' ');
        assert_eq!(spark_char(1.0), '█');
        assert_eq!(spark_char(2.0), '█');
        assert_eq!(spark_char(-1.0), ' ');
    }
}
