//! Application window and event loop management.

mod input;
mod render;

use std::sync::Arc;

use pollster::FutureExt;
use winit::{
    dpi::LogicalSize,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::Window,
};

use volmesh_core::{IsosurfaceSession, ScalarField};
use volmesh_render::{Camera, MeshRenderData, RenderEngine};
use volmesh_ui::{EguiIntegration, ThresholdPanel};

use crate::{Vec3, ViewerError};

/// The viewer application state.
pub(super) struct App<F: ScalarField> {
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    egui: Option<EguiIntegration>,
    session: IsosurfaceSession<F>,
    panel: ThresholdPanel,
    // GPU copy of the session mesh and the generation it was built from
    mesh_data: Option<MeshRenderData>,
    uploaded_generation: Option<u64>,
    camera_fitted: bool,
    close_requested: bool,
    error: Option<ViewerError>,
    // Mouse state for camera control
    mouse_pos: (f64, f64),
    left_mouse_down: bool,
    right_mouse_down: bool,
    // Set when a drag began over the panel; such drags never move the camera
    drag_started_in_ui: bool,
    shift_down: bool,
}

impl<F: ScalarField> App<F> {
    fn new(session: IsosurfaceSession<F>, threshold_used: f32) -> Self {
        let panel = ThresholdPanel::new(&session, threshold_used);
        Self {
            window: None,
            engine: None,
            egui: None,
            session,
            panel,
            mesh_data: None,
            uploaded_generation: None,
            camera_fitted: false,
            close_requested: false,
            error: None,
            mouse_pos: (0.0, 0.0),
            left_mouse_down: false,
            right_mouse_down: false,
            drag_started_in_ui: false,
            shift_down: false,
        }
    }

    /// Creates the window, render engine and egui state.
    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attributes = Window::default_attributes()
            .with_title("volmesh")
            .with_inner_size(LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let engine = RenderEngine::new_windowed(window.clone()).block_on()?;
        let egui = EguiIntegration::new(&engine.device, engine.surface_config.format, &window);

        // Each re-extraction schedules a frame
        let redraw_window = Arc::clone(&window);
        self.session
            .set_redraw_hook(move |_| redraw_window.request_redraw());

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
        self.egui = Some(egui);
        Ok(())
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Runs the viewer until its window closes.
pub(super) fn run_app<F: ScalarField>(
    session: IsosurfaceSession<F>,
    threshold_used: f32,
) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(session, threshold_used);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Points `camera` at the current mesh, or at the whole volume when the mesh
/// is empty.
fn fit_camera<F: ScalarField>(camera: &mut Camera, session: &IsosurfaceSession<F>) {
    let (min, max) = session
        .mesh()
        .bounding_box()
        .unwrap_or_else(|| volume_bounds(session.field()));
    camera.look_at_box(min, max);
}

/// Physical extent of the sample lattice.
#[allow(clippy::cast_precision_loss)]
fn volume_bounds<F: ScalarField>(field: &F) -> (Vec3, Vec3) {
    let dims = field.dims();
    let cells = Vec3::new(
        dims.nx.saturating_sub(1) as f32,
        dims.ny.saturating_sub(1) as f32,
        dims.nz.saturating_sub(1) as f32,
    );
    (Vec3::ZERO, cells * field.spacing())
}
