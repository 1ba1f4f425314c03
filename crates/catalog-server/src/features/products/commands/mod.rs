//! Product commands (write operations)

pub mod create;
pub mod delete;
pub mod delete_all;
pub mod update;

pub use create::{CreateProductCommand, CreateProductError};
pub use delete::{DeleteProductCommand, DeleteProductError, DeleteProductResponse};
pub use delete_all::{DeleteAllProductsCommand, DeleteAllProductsError, DeleteAllProductsResponse};
pub use update::{UpdateProductCommand, UpdateProductError};
