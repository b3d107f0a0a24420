//! Gateway services: path resolution, the store seam and its S3 client,
//! listing aggregation and presentation.

pub mod listing_service;
#[cfg(test)]
pub mod memory_store;
pub mod path_resolver;
pub mod presenter;
pub mod s3_store;
pub mod store;
