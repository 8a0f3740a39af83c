pub mod auth;
pub mod pipeline;
pub mod response;
pub mod validate;

pub use pipeline::{pipeline_middleware, PipelineState, RequestContext, RequestPipeline, RouteName};
pub use response::{ApiResponse, ApiResult, Rendered};
