#![doc = "storage-backup-core: backup and restore pipelines for object-storage buckets."]

//! This crate contains the data model, the [`contract::StorageClient`] seam and the
//! backup/restore pipelines. It holds no transport code; the CLI crate supplies the
//! HTTP client.
//!
//! # Usage
//! Build a [`config::StorageConfig`], pick a `StorageClient` implementation and call
//! [`backup::backup_storage`] or [`restore::restore_storage`].

pub mod backup;
pub mod config;
pub mod content_type;
pub mod contract;
pub mod enumerate;
pub mod error;
pub mod local_tree;
pub mod restore;
pub mod sidecar;
pub mod transfer;
