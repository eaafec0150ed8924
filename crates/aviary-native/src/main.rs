use std::collections::HashSet;
use std::time::Instant;

use anyhow::Context;
use aviary_core::input::{
    pick_nearest, ray_horizontal_plane, screen_to_world_ray, DragState, MouseState,
};
use aviary_core::{
    default_birds, DirAssetSource, EntityId, GainRange, Gesture, ObjectId, SceneConfig,
    SceneController, UiSignal, Viewer, ViewerInput, PICK_SPHERE_RADIUS,
};
use glam::{Vec2, Vec3};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

mod audio;
mod constants;
mod mixer;
mod placard;
mod render;

use audio::NativeAudio;
use constants::*;
use placard::PlacardTints;
use render::GpuState;

const WINDOW_TITLE: &str = "Aviary";

struct App {
    scene: SceneController,
    assets: DirAssetSource,
    audio: NativeAudio,
    tints: PlacardTints,
    viewer: Viewer,
    keys: HashSet<KeyCode>,
    mouse: MouseState,
    drag: DragState,
    selected: Option<ObjectId>,
    last_frame: Instant,
    title: String,
}

impl App {
    fn new(assets: DirAssetSource) -> Self {
        let config = SceneConfig {
            gain_clamp: Some(GainRange::new(GAIN_FLOOR_DB, GAIN_CEIL_DB)),
            trace_gains: log::log_enabled!(log::Level::Trace),
        };
        let mut scene = SceneController::new(default_birds(), config);
        let mut audio = NativeAudio::start();
        let report = scene.load(&assets, &mut audio);
        if !report.is_clean() {
            log::warn!("[scene] {} assets failed to load", report.failures.len());
        }
        let mut tints = PlacardTints::default();
        tints.rebuild(scene.graph(), &assets);
        Self {
            scene,
            assets,
            audio,
            tints,
            viewer: Viewer::default(),
            keys: HashSet::new(),
            mouse: MouseState::default(),
            drag: DragState::default(),
            selected: None,
            last_frame: Instant::now(),
            title: String::new(),
        }
    }

    fn reset(&mut self) {
        let report = self
            .scene
            .process_signal(UiSignal::Reset, &self.assets, &mut self.audio);
        if !report.is_clean() {
            log::warn!("[scene] {} assets failed to reload", report.failures.len());
        }
        self.tints.rebuild(self.scene.graph(), &self.assets);
        self.drag = DragState::default();
        self.selected = None;
    }

    fn on_key(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        match event.state {
            ElementState::Pressed => {
                let fresh = self.keys.insert(code);
                if !fresh {
                    return;
                }
                match code {
                    KeyCode::KeyR => self.reset(),
                    KeyCode::KeyQ => self.gesture_selected(Gesture::Rotate(ROTATE_STEP)),
                    KeyCode::KeyE => self.gesture_selected(Gesture::Rotate(-ROTATE_STEP)),
                    _ => {}
                }
            }
            ElementState::Released => {
                self.keys.remove(&code);
            }
        }
    }

    fn gesture_selected(&mut self, gesture: Gesture) {
        if let Some(id) = self.selected {
            self.scene.apply_gesture(id, gesture);
        }
    }

    fn viewer_input(&self) -> ViewerInput {
        let axis = |pos: &[KeyCode], neg: &[KeyCode]| {
            let p = pos.iter().any(|k| self.keys.contains(k)) as i32 as f32;
            let n = neg.iter().any(|k| self.keys.contains(k)) as i32 as f32;
            p - n
        };
        ViewerInput {
            forward: axis(&[KeyCode::KeyW, KeyCode::ArrowUp], &[KeyCode::KeyS, KeyCode::ArrowDown]),
            strafe: axis(&[KeyCode::KeyD], &[KeyCode::KeyA]),
            turn: axis(&[KeyCode::ArrowLeft], &[KeyCode::ArrowRight]),
        }
    }

    fn pointer_ray(&self, gpu: &GpuState) -> (Vec3, Vec3) {
        screen_to_world_ray(
            gpu.view_proj(&self.viewer),
            gpu.viewport(),
            Vec2::new(self.mouse.x, self.mouse.y),
        )
    }

    fn on_mouse_button(&mut self, gpu: &GpuState, pressed: bool) {
        if !pressed {
            self.drag.active = false;
            return;
        }
        let (ro, rd) = self.pointer_ray(gpu);
        // Hit-test the anchors under the scene origin, then map the hit entity
        // back to its tracked object.
        let graph = self.scene.graph();
        let anchors: Vec<EntityId> = graph.children(self.scene.origin()).to_vec();
        let centers: Vec<Vec3> = anchors.iter().map(|e| graph.world_position(*e)).collect();
        let hit = pick_nearest(ro, rd, &centers, PICK_SPHERE_RADIUS)
            .and_then(|i| self.scene.registry().find_by_entity(anchors[i]))
            .map(|o| (o.id, graph.world_position(o.entity)));
        let Some((id, center)) = hit else {
            self.selected = None;
            return;
        };
        self.selected = Some(id);
        if let Some(hit) = ray_horizontal_plane(ro, rd, center.y) {
            self.drag = DragState {
                active: true,
                object: id.0,
                plane_y_world: center.y,
                last_hit: hit,
            };
        }
    }

    fn on_cursor(&mut self, gpu: &GpuState, x: f32, y: f32) {
        self.mouse.x = x;
        self.mouse.y = y;
        if !self.drag.active {
            return;
        }
        let (ro, rd) = self.pointer_ray(gpu);
        if let Some(hit) = ray_horizontal_plane(ro, rd, self.drag.plane_y_world) {
            let delta = hit - self.drag.last_hit;
            self.drag.last_hit = hit;
            self.scene
                .apply_gesture(ObjectId(self.drag.object), Gesture::Translate(delta));
        }
    }

    fn on_scroll(&mut self, lines: f32) {
        if lines != 0.0 {
            self.gesture_selected(Gesture::Scale(SCROLL_SCALE_STEP.powf(lines)));
        }
    }

    /// Per-frame work: move the viewer, push gains, then draw.
    fn frame(&mut self, gpu: &mut GpuState) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        let input = self.viewer_input();
        self.viewer.step(input, dt, WALK_SPEED, TURN_RATE);
        self.scene.set_viewer_pose(self.viewer.pose());
        self.scene.on_frame(&mut self.audio);

        self.update_title(gpu);
        let instances =
            render::collect_instances(&self.scene, &self.audio, &self.tints, &self.viewer);
        gpu.render(&self.viewer, &instances)
    }

    fn update_title(&mut self, gpu: &GpuState) {
        let graph = self.scene.graph();
        let nearest = self
            .scene
            .registry()
            .iter()
            .map(|o| (o, graph.world_position(o.entity).distance(self.viewer.position)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let title = match nearest {
            Some((o, d)) => format!("{WINDOW_TITLE} | {} ({d:.2} m)", o.label),
            None => WINDOW_TITLE.to_string(),
        };
        if title != self.title {
            gpu.window.set_title(&title);
            self.title = title;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let assets_dir =
        std::env::var(ASSETS_ENV).unwrap_or_else(|_| DEFAULT_ASSETS_DIR.to_string());
    log::info!("[assets] loading from {assets_dir}");
    let mut app = App::new(DirAssetSource::new(assets_dir));

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .build(&event_loop)
        .context("failed to create window")?;

    let mut gpu = pollster::block_on(GpuState::new(&window))?;

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(size) => gpu.resize(size),
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::KeyboardInput { event, .. } => app.on_key(&event),
                WindowEvent::CursorMoved { position, .. } => {
                    app.on_cursor(&gpu, position.x as f32, position.y as f32)
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => app.on_mouse_button(&gpu, state == ElementState::Pressed),
                WindowEvent::MouseWheel { delta, .. } => {
                    let lines = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(p) => (p.y / 40.0) as f32,
                    };
                    app.on_scroll(lines);
                }
                _ => {}
            },
            Event::AboutToWait => match app.frame(&mut gpu) {
                Ok(_) => gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(e) => log::debug!("surface error: {e:?}"),
            },
            _ => {}
        })
        .context("event loop terminated with an error")?;
    Ok(())
}
