pub mod dimension_cache;
pub mod extract;
pub mod planner;
pub mod resolve;
pub mod running_instances;

pub use dimension_cache::*;
pub use extract::*;
pub use planner::*;
pub use resolve::*;
pub use running_instances::*;
