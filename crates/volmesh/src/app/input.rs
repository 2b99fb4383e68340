use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowId,
};

use volmesh_core::ScalarField;

use super::{fit_camera, App};

impl<F: ScalarField> ApplicationHandler for App<F> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_window(event_loop) {
            log::error!("failed to start viewer: {err}");
            self.error = Some(err);
            event_loop.exit();
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let pointer_over_ui = self
            .egui
            .as_ref()
            .is_some_and(|e| e.context.is_pointer_over_area() || e.context.is_using_pointer());

        // Track physical button state even when egui consumes the event
        match &event {
            WindowEvent::MouseInput { state, button, .. } => match (button, state) {
                (MouseButton::Left, ElementState::Pressed) => {
                    self.left_mouse_down = true;
                    self.drag_started_in_ui = pointer_over_ui;
                }
                (MouseButton::Left, ElementState::Released) => {
                    self.left_mouse_down = false;
                }
                (MouseButton::Right, ElementState::Pressed) => {
                    self.right_mouse_down = true;
                    self.drag_started_in_ui = pointer_over_ui;
                }
                (MouseButton::Right, ElementState::Released) => {
                    self.right_mouse_down = false;
                }
                _ => {}
            },
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_down = modifiers.state().shift_key();
            }
            _ => {}
        }

        let (egui_consumed, egui_repaint) =
            if let (Some(egui), Some(window)) = (&mut self.egui, &self.window) {
                egui.handle_event(window, &event)
            } else {
                (false, false)
            };
        if egui_repaint {
            self.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
                self.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let delta_x = (position.x - self.mouse_pos.0) as f32;
                let delta_y = (position.y - self.mouse_pos.1) as f32;
                self.mouse_pos = (position.x, position.y);

                if self.drag_started_in_ui {
                    return;
                }
                let Some(engine) = &mut self.engine else {
                    return;
                };

                let is_rotate = self.left_mouse_down && !self.shift_down;
                let is_pan = (self.left_mouse_down && self.shift_down) || self.right_mouse_down;

                if is_rotate {
                    engine.camera.orbit(delta_x * 0.01, delta_y * 0.01);
                } else if is_pan {
                    let scale = engine.camera.distance() * 0.002;
                    engine.camera.pan(-delta_x * scale, delta_y * scale);
                } else {
                    return;
                }
                self.request_redraw();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if egui_consumed || pointer_over_ui {
                    return;
                }
                if let Some(engine) = &mut self.engine {
                    let scroll = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                    };
                    let scale = engine.camera.distance() * 0.1;
                    engine.camera.zoom(scroll * scale);
                }
                self.request_redraw();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if egui_consumed || event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => {
                        self.close_requested = true;
                    }
                    PhysicalKey::Code(KeyCode::KeyR) => {
                        if let Some(engine) = &mut self.engine {
                            fit_camera(&mut engine.camera, &self.session);
                        }
                        self.request_redraw();
                    }
                    _ => {}
                }
            }
            _ => {}
        }

        if self.close_requested {
            event_loop.exit();
        }
    }
}
