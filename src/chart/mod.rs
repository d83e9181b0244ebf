pub mod renderer;
pub mod snapshot;
pub mod throttle;

pub use renderer::{DrawOp, build_draw_list, build_snapshot};
pub use snapshot::{ChartSnapshot, ChartConfig, LineStyle, SeriesSnapshot};
pub use throttle::RedrawGate;
