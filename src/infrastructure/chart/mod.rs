pub mod artifact;
pub mod fonts;
pub mod renderer;

pub use artifact::ChartFile;
pub use fonts::install_chart_font;
pub use renderer::{ChartPalette, ChartSettings, PlottersChartRenderer};
