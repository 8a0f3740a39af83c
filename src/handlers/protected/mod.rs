// handlers/protected/mod.rs - tenant routes (tenant user API key required)
//
// Every handler here runs behind the request pipeline and receives the
// resolved RequestContext as an extension.

pub mod availability;   // GET /api/v1/group_availability, /api/v1/service_flavor_availability
pub mod metric_result;  // GET /api/v2/metric_result/:endpoint/:metric
pub mod profiles;       // /api/v1/AP[/:id]
pub mod recomputations; // /api/v2/recomputations
pub mod reports;        // /api/v2/reports[/:id]
pub mod status;         // GET /api/v1/status/sites/timeline/:group
