//! Core type definitions used across the Quill workspace.

pub mod id;

pub use id::UserId;
