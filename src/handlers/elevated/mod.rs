// handlers/elevated/mod.rs - administrative routes (admin API key required)

pub mod tenants; // /api/v2/admin/tenants[/:id]
