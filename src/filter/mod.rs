pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod plan;
pub mod error;

pub use types::*;
pub use error::FilterError;
pub use filter::{Filter, RawParams};
pub use filter_order::FilterOrder;
pub use filter_where::FilterWhere;
pub use plan::{QueryPlan, Stage};
