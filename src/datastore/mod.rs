pub mod store;
pub mod store_mem;
pub mod store_pgsql;
