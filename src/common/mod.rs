pub mod error;
pub mod sku;
