pub mod connector;
pub mod hit;
pub mod paint;

pub use connector::{connector, visible_edges};
pub use hit::{NodeMetrics, hit_test};
pub use paint::{PaintContext, Theme, draw_order, paint_map};

// Re-export so downstream crates can build frames without naming vello/kurbo.
pub use kurbo::Affine;
pub use vello::Scene;
