//! UI panel builders.

use std::ops::RangeInclusive;

use egui::{CollapsingHeader, Context, SidePanel, Slider, Ui};
use volmesh_core::{IsosurfaceSession, ScalarField, TriangleMesh};

/// Size of the displayed mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeshStats {
    pub vertices: usize,
    pub triangles: usize,
    /// Total triangle area in physical units.
    pub surface_area: f32,
}

impl MeshStats {
    #[must_use]
    pub fn of(mesh: &TriangleMesh) -> Self {
        Self {
            vertices: mesh.num_vertices(),
            triangles: mesh.num_triangles(),
            surface_area: mesh.surface_area(),
        }
    }
}

/// State shown by the threshold panel.
#[derive(Debug, Clone)]
pub struct ThresholdPanel {
    /// Slider value; follows the session's isovalue.
    pub isovalue: f32,
    /// Slider range.
    pub range: RangeInclusive<f32>,
    /// Counts for the current mesh.
    pub stats: MeshStats,
    /// Threshold the binarizer used, shown read-only.
    pub threshold_used: f32,
    /// Viewport background color.
    pub background_color: [f32; 3],
}

impl ThresholdPanel {
    /// Creates panel state mirroring `session`.
    #[must_use]
    pub fn new<F: ScalarField>(session: &IsosurfaceSession<F>, threshold_used: f32) -> Self {
        Self {
            isovalue: session.isovalue(),
            range: session.range(),
            stats: MeshStats::of(session.mesh()),
            threshold_used,
            background_color: [0.1, 0.2, 0.3],
        }
    }

    /// Pulls the isovalue and counts back from `session` after it changed.
    pub fn sync<F: ScalarField>(&mut self, session: &IsosurfaceSession<F>) {
        self.isovalue = session.isovalue();
        self.stats = MeshStats::of(session.mesh());
    }
}

/// What the user asked for during one frame of the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanelResponse {
    /// New isovalue when the slider moved.
    pub isovalue: Option<f32>,
    /// Whether "Reset View" was clicked.
    pub reset_view: bool,
}

/// Builds the left "Threshold" panel.
pub fn build_threshold_panel(ctx: &Context, panel: &mut ThresholdPanel) -> PanelResponse {
    let mut response = PanelResponse::default();

    SidePanel::left("volmesh_threshold_panel")
        .default_width(305.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("Threshold");
            ui.separator();

            if build_isovalue_slider(ui, panel) {
                response.isovalue = Some(panel.isovalue);
            }

            ui.separator();
            build_mesh_section(ui, panel);
            response.reset_view = build_view_section(ui, &mut panel.background_color);
        });

    response
}

/// Returns true if the slider changed.
fn build_isovalue_slider(ui: &mut Ui, panel: &mut ThresholdPanel) -> bool {
    ui.add(
        Slider::new(&mut panel.isovalue, panel.range.clone())
            .text("Isovalue")
            .fixed_decimals(2),
    )
    .changed()
}

fn build_mesh_section(ui: &mut Ui, panel: &ThresholdPanel) {
    ui.horizontal(|ui| {
        ui.label("Vertices:");
        ui.label(panel.stats.vertices.to_string());
    });
    ui.horizontal(|ui| {
        ui.label("Triangles:");
        ui.label(panel.stats.triangles.to_string());
    });
    ui.horizontal(|ui| {
        ui.label("Surface area:");
        ui.label(format!("{:.2}", panel.stats.surface_area));
    });
    ui.horizontal(|ui| {
        ui.label("Binarization threshold:");
        ui.label(format!("{:.3}", panel.threshold_used));
    });
    if panel.stats.triangles == 0 {
        ui.colored_label(egui::Color32::YELLOW, "No surface at this isovalue");
    }
}

/// Returns true if "Reset View" was clicked.
fn build_view_section(ui: &mut Ui, background_color: &mut [f32; 3]) -> bool {
    let mut reset = false;
    CollapsingHeader::new("View")
        .default_open(false)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label("Background:");
                ui.color_edit_button_rgb(background_color);
            });

            if ui.button("Reset View").clicked() {
                reset = true;
            }
        });
    reset
}

#[cfg(test)]
mod tests {
    use super::*;
    use volmesh_core::{BinaryGrid, Dims, ScalarGrid};

    fn cube_session() -> IsosurfaceSession {
        let inner = |i: usize| (1..3).contains(&i);
        let grid = ScalarGrid::from_fn(Dims::new(4, 4, 4), |x, y, z| {
            if inner(x) && inner(y) && inner(z) {
                1.0
            } else {
                0.0
            }
        });
        let mask = BinaryGrid::from_predicate(&grid, |v| v > 0.5);
        IsosurfaceSession::new(mask, 0.5, 0.0..=2.0)
    }

    #[test]
    fn test_mesh_stats() {
        assert_eq!(MeshStats::of(&TriangleMesh::default()), MeshStats::default());
        let session = cube_session();
        let stats = MeshStats::of(session.mesh());
        assert_eq!(stats.vertices, session.mesh().num_vertices());
        assert!(stats.triangles > 0);
        assert!((stats.surface_area - session.mesh().surface_area()).abs() < 1e-6);
        assert!(stats.surface_area > 0.0);
    }

    #[test]
    fn test_panel_mirrors_session() {
        let mut session = cube_session();
        let mut panel = ThresholdPanel::new(&session, 0.42);
        assert!((panel.isovalue - 0.5).abs() < f32::EPSILON);
        assert_eq!(panel.range, 0.0..=2.0);
        assert!((panel.threshold_used - 0.42).abs() < f32::EPSILON);

        // Every sample lies below 1.5, so nothing crosses
        session.on_isovalue_changed(1.5);
        panel.sync(&session);
        assert!((panel.isovalue - 1.5).abs() < f32::EPSILON);
        assert_eq!(panel.stats.triangles, 0);
    }

    #[test]
    fn test_panel_builds_headless() {
        let ctx = Context::default();
        let mut panel = ThresholdPanel::new(&cube_session(), 0.5);
        let mut response = PanelResponse::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            response = build_threshold_panel(ctx, &mut panel);
        });
        assert_eq!(response, PanelResponse::default());
    }
}
