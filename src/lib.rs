pub mod api;
pub mod config;
pub mod datastore;
pub mod keys;
pub mod server;
pub mod voucher;
