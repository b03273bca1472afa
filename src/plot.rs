//!
//! SVG scatter and histogram rendering for the report figures
//!
use crate::hist::Hist;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 480.0;
const PAD: f64 = 56.0;
const N_TICKS: usize = 5;
const GROUP_COLORS: [&str; 2] = ["#1f77b4", "#d62728"];
const BAR_COLOR: &str = "#1f77b4";
const FONT: &str = "font-family=\"monospace\" font-size=\"12\"";

/// distinct marker shapes available; shape indices wrap around
pub const N_SHAPES: usize = 4;

///
/// one dot of the PCA scatter
///
#[derive(Clone, Debug)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// module type (0 or 1), picks the color
    pub group: usize,
    /// marker shape (per path when the path count is small, else 0)
    pub shape: usize,
    pub name: String,
}

struct Generator {
    buffer: String,
}

impl Generator {
    fn new() -> Self {
        Generator {
            buffer: String::with_capacity(10_000),
        }
    }
    fn start_svg(&mut self) {
        self.buffer.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">\n",
            WIDTH, HEIGHT
        ));
        self.buffer.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
            WIDTH, HEIGHT
        ));
    }
    fn end_svg(&mut self) {
        self.buffer.push_str("</svg>\n");
    }
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.buffer.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"black\"/>\n",
            x1, y1, x2, y2
        ));
    }
    /// circle, square, triangle or diamond marker centered at (x, y)
    fn marker(&mut self, x: f64, y: f64, shape: usize, color: &str, title: &str) {
        let style = format!("fill=\"{}\" fill-opacity=\"0.7\"", color);
        let (open, close) = match shape % N_SHAPES {
            1 => (
                format!(
                    "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"8\" height=\"8\" {}>",
                    x - 4.0,
                    y - 4.0,
                    style
                ),
                "</rect>",
            ),
            2 => (
                format!(
                    "<polygon points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" {}>",
                    x,
                    y - 5.0,
                    x - 4.5,
                    y + 4.0,
                    x + 4.5,
                    y + 4.0,
                    style
                ),
                "</polygon>",
            ),
            3 => (
                format!(
                    "<polygon points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" {}>",
                    x,
                    y - 5.0,
                    x + 5.0,
                    y,
                    x,
                    y + 5.0,
                    x - 5.0,
                    y,
                    style
                ),
                "</polygon>",
            ),
            _ => (
                format!("<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" {}>", x, y, style),
                "</circle>",
            ),
        };
        self.buffer
            .push_str(&format!("{}<title>{}</title>{}\n", open, title, close));
    }
    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) {
        self.buffer.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>\n",
            x, y, w, h, color
        ));
    }
    fn text(&mut self, x: f64, y: f64, anchor: &str, s: &str) {
        self.buffer.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"{}\" {}>{}</text>\n",
            x, y, anchor, FONT, s
        ));
    }
}

/// data range padded so a degenerate axis still has extent
fn axis_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min > max {
        return (-1.0, 1.0);
    }
    if min == max {
        return (min - 1.0, max + 1.0);
    }
    let margin = (max - min) * 0.05;
    (min - margin, max + margin)
}

///
/// Scatter plot of PC scores, colored by module type.
///
pub fn scatter_svg(points: &[ScatterPoint], x_label: &str, y_label: &str) -> String {
    let (x_min, x_max) = axis_range(points.iter().map(|p| p.x));
    let (y_min, y_max) = axis_range(points.iter().map(|p| p.y));
    let to_x = |v: f64| PAD + (v - x_min) / (x_max - x_min) * (WIDTH - 2.0 * PAD);
    let to_y = |v: f64| HEIGHT - PAD - (v - y_min) / (y_max - y_min) * (HEIGHT - 2.0 * PAD);

    let mut g = Generator::new();
    g.start_svg();
    // axes
    g.line(PAD, HEIGHT - PAD, WIDTH - PAD, HEIGHT - PAD);
    g.line(PAD, PAD, PAD, HEIGHT - PAD);
    for i in 0..=N_TICKS {
        let f = i as f64 / N_TICKS as f64;
        let xv = x_min + f * (x_max - x_min);
        let yv = y_min + f * (y_max - y_min);
        g.line(to_x(xv), HEIGHT - PAD, to_x(xv), HEIGHT - PAD + 4.0);
        g.text(to_x(xv), HEIGHT - PAD + 16.0, "middle", &format!("{:.2}", xv));
        g.line(PAD - 4.0, to_y(yv), PAD, to_y(yv));
        g.text(PAD - 6.0, to_y(yv) + 4.0, "end", &format!("{:.2}", yv));
    }
    g.text(WIDTH / 2.0, HEIGHT - 12.0, "middle", x_label);
    g.text(12.0, HEIGHT / 2.0, "middle", y_label);
    // points
    for p in points {
        let color = GROUP_COLORS[p.group.min(1)];
        g.marker(to_x(p.x), to_y(p.y), p.shape, color, &p.name);
    }
    // legend
    for (i, color) in GROUP_COLORS.iter().enumerate() {
        let y = PAD + 16.0 * i as f64;
        g.rect(WIDTH - PAD - 70.0, y - 9.0, 10.0, 10.0, color);
        g.text(WIDTH - PAD - 56.0, y, "start", &format!("type {}", i + 1));
    }
    g.end_svg();
    g.buffer
}

///
/// Bar chart of a histogram, one bar per counted value.
///
pub fn hist_svg(hist: &Hist, x_label: &str) -> String {
    let bars = hist.bars();
    let max_count = bars.iter().map(|&(_, c)| c).max().unwrap_or(0).max(1);
    let slot = (WIDTH - 2.0 * PAD) / bars.len().max(1) as f64;

    let mut g = Generator::new();
    g.start_svg();
    g.line(PAD, HEIGHT - PAD, WIDTH - PAD, HEIGHT - PAD);
    g.line(PAD, PAD, PAD, HEIGHT - PAD);
    for (i, (value, count)) in bars.iter().enumerate() {
        let h = *count as f64 / max_count as f64 * (HEIGHT - 2.0 * PAD);
        let x = PAD + i as f64 * slot;
        g.rect(x + slot * 0.1, HEIGHT - PAD - h, slot * 0.8, h, BAR_COLOR);
        g.text(x + slot / 2.0, HEIGHT - PAD + 16.0, "middle", &value.to_string());
        g.text(x + slot / 2.0, HEIGHT - PAD - h - 4.0, "middle", &count.to_string());
    }
    g.text(WIDTH / 2.0, HEIGHT - 12.0, "middle", x_label);
    g.end_svg();
    g.buffer
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_well_formed() {
        let points = vec![
            ScatterPoint {
                x: 1.0,
                y: 2.0,
                group: 0,
                shape: 0,
                name: "a-1".to_string(),
            },
            ScatterPoint {
                x: -1.0,
                y: 0.5,
                group: 1,
                shape: 0,
                name: "b-1".to_string(),
            },
        ];
        let svg = scatter_svg(&points, "PC1", "PC2");
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("PC1"));
        assert!(svg.contains(GROUP_COLORS[0]));
        assert!(svg.contains(GROUP_COLORS[1]));
        assert!(svg.contains("<title>a-1</title>"));
    }

    #[test]
    fn scatter_marker_shapes_vary() {
        let points: Vec<ScatterPoint> = (0..N_SHAPES)
            .map(|i| ScatterPoint {
                x: i as f64,
                y: 0.0,
                group: 0,
                shape: i,
                name: format!("p{}", i),
            })
            .collect();
        let svg = scatter_svg(&points, "PC1", "PC2");
        assert_eq!(svg.matches("<circle").count(), 1);
        assert_eq!(svg.matches("<polygon").count(), 2);
        // square marker plus the background and the two legend swatches
        assert_eq!(svg.matches("<rect").count(), 4);
        // shape indices wrap
        assert_eq!(svg.matches("<title>").count(), N_SHAPES);
    }

    #[test]
    fn scatter_empty_points() {
        let svg = scatter_svg(&[], "PC1", "PC2");
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<circle").count(), 0);
    }

    #[test]
    fn hist_bars() {
        let h = Hist::from(&[1, 2, 2, 3, 3, 3]);
        let svg = hist_svg(&h, "modules per haplotype");
        assert!(svg.starts_with("<svg"));
        // one bar per distinct value, plus the background rect
        assert_eq!(svg.matches("<rect").count(), 4);
        assert!(svg.contains("modules per haplotype"));
    }
}
