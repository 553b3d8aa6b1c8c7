//! gcsb-gcs: Google Cloud Storage adapter for gcsb
//!
//! This crate provides the implementation of the ObjectStore trait
//! on top of OpenDAL's GCS service. It is the only crate that talks
//! to the storage backend directly.

pub mod client;

pub use client::{GcsClient, GcsConfig};
