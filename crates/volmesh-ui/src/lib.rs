//! UI layer for volmesh using egui.

pub mod integration;
pub mod panels;

pub use integration::EguiIntegration;
pub use panels::{build_threshold_panel, MeshStats, PanelResponse, ThresholdPanel};
