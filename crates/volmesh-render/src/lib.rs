//! Rendering backend for volmesh.
//!
//! This crate provides the wgpu-based rendering engine, including:
//! - Surface, depth buffer and pipeline management
//! - Mesh upload with storage-buffer vertex pulling
//! - A turntable camera

// Documentation lints - the engine propagates wgpu errors without per-call docs
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// wgpu descriptors are built field-by-field with defaults
#![allow(clippy::default_trait_access)]

pub mod camera;
pub mod engine;
pub mod error;
pub mod mesh_render;

pub use camera::Camera;
pub use engine::RenderEngine;
pub use error::{RenderError, RenderResult};
pub use mesh_render::{CameraUniforms, MeshRenderData, MeshUniforms};
