pub mod aggregate;
pub mod kind;
pub mod quantiles;
pub mod threshold;

pub use aggregate::calculate_quantiles;
pub use kind::{EntityKind, MetricKind};
pub use quantiles::LatencyQuantiles;
pub use threshold::check_thresholds;
