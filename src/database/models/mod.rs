pub mod availability;
pub mod profile;
pub mod recomputation;
pub mod report;
pub mod status;
pub mod tenant;
