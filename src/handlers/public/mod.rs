// handlers/public/mod.rs - routes served without the request pipeline

pub mod health;  // GET /health
pub mod options; // OPTIONS on collection routes

pub use health::health;
pub use options::options;
