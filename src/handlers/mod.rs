// handlers/mod.rs - handlers by access tier
//
// Public (no pipeline) → Protected (tenant key) → Elevated (admin key)

pub mod elevated;
pub mod protected;
pub mod public;
pub mod utils;
