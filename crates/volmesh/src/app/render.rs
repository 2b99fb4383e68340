use volmesh_core::ScalarField;
use volmesh_render::RenderError;
use volmesh_ui::{build_threshold_panel, EguiIntegration};

use super::{fit_camera, App};
use crate::Vec3;

impl<F: ScalarField> App<F> {
    /// Renders a single frame.
    pub(super) fn render(&mut self) {
        let (Some(engine), Some(egui), Some(window)) =
            (&mut self.engine, &mut self.egui, &self.window)
        else {
            return;
        };

        // UI first, so a slider change shows up in this very frame
        egui.begin_frame(window);
        let response = build_threshold_panel(&egui.context, &mut self.panel);
        let egui_output = egui.end_frame(window);

        if let Some(isovalue) = response.isovalue {
            self.session.on_isovalue_changed(isovalue);
            self.panel.sync(&self.session);
            log::debug!(
                "isovalue {:.2}: {} triangles",
                self.session.isovalue(),
                self.session.mesh().num_triangles()
            );
        }

        // Re-upload only when the session has a newer mesh
        let generation = self.session.generation();
        if self.uploaded_generation != Some(generation) {
            self.mesh_data = engine.upload_mesh(self.session.mesh());
            self.uploaded_generation = Some(generation);
        }

        if !self.camera_fitted || response.reset_view {
            fit_camera(&mut engine.camera, &self.session);
            self.camera_fitted = true;
        }

        let repaint = EguiIntegration::wants_immediate_repaint(&egui_output);
        let screen_descriptor: egui_wgpu::ScreenDescriptor =
            EguiIntegration::screen_descriptor(window, [engine.width, engine.height]);
        let background = Vec3::from(self.panel.background_color);

        let result = engine.render_frame(
            self.mesh_data.as_ref(),
            background,
            |device, queue, encoder, view| {
                egui.render(device, queue, encoder, view, &screen_descriptor, egui_output);
            },
        );

        match result {
            Ok(()) => {}
            Err(RenderError::SurfaceLost | RenderError::SurfaceOutdated) => {
                let (width, height) = (engine.width, engine.height);
                engine.resize(width, height);
                window.request_redraw();
                return;
            }
            Err(RenderError::OutOfMemory) => {
                log::error!("out of GPU memory, closing viewer");
                self.error = Some(RenderError::OutOfMemory.into());
                self.close_requested = true;
                return;
            }
            Err(err) => {
                log::warn!("dropped frame: {err}");
            }
        }

        if repaint {
            window.request_redraw();
        }
    }
}
