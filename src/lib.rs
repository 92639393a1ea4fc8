// Library exports for chartsmith

pub mod extract;
pub mod fonts;
pub mod render;
pub mod repair;
pub mod sanitize;
pub mod spec;
pub mod table;

pub use fonts::{FontResolver, SystemFonts};
pub use render::{ChartRenderer, RenderedChart};
pub use repair::{summarize, validate_and_repair};
pub use sanitize::{Statement, StatementSanitizer};
pub use spec::{ChartSpec, ChartType};
pub use table::ResultSet;
