use anyhow::Context;
use aviary_core::{EntityKind, SceneController, Viewer};
use glam::{Mat4, Vec3};

use crate::audio::NativeAudio;
use crate::constants::{CLEAR_COLOR, MARKER_SIZE, MAX_INSTANCES};
use crate::placard::PlacardTints;

static BILLBOARD_WGSL: &str = include_str!("../shaders/scene.wgsl");

/// Camera data for the billboard shader. Billboards stay upright, so only the
/// camera's right vector is needed; up is always world +Y.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    right: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    pub pos: [f32; 3],
    pub scale: f32,
    pub color: [f32; 4],
    pub glow: f32, // marker gain (0..1); negative marks a placard
}

impl InstanceData {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x4, 3 => Float32];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub struct GpuState<'w> {
    pub window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    instances: wgpu::Buffer,
}

impl<'w> GpuState<'w> {
    pub async fn new(window: &'w winit::window::Window) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .context("failed to create surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .context("failed to open GPU device")?;

        let size = window.inner_size();
        let config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .context("surface is not supported by the adapter")?;
        surface.configure(&device, &config);
        log::info!(
            "[render] {} ({:?}), surface {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            config.format
        );

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("aviary.camera"),
            size: std::mem::size_of::<CameraUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("aviary.camera.layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("aviary.camera"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });
        let instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("aviary.billboards"),
            size: (std::mem::size_of::<InstanceData>() * MAX_INSTANCES) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let pipeline = billboard_pipeline(&device, &camera_layout, config.format);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            camera_buffer,
            camera_bind_group,
            instances,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn viewport(&self) -> glam::Vec2 {
        glam::Vec2::new(self.config.width as f32, self.config.height as f32)
    }

    pub fn view_proj(&self, viewer: &Viewer) -> Mat4 {
        let aspect = self.config.width as f32 / self.config.height.max(1) as f32;
        viewer.projection_matrix(aspect) * viewer.view_matrix()
    }

    pub fn render(
        &mut self,
        viewer: &Viewer,
        billboards: &[InstanceData],
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let camera = CameraUniform {
            view_proj: self.view_proj(viewer).to_cols_array_2d(),
            right: viewer.right().extend(0.0).to_array(),
        };
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera));

        let count = billboards.len().min(MAX_INSTANCES);
        if count > 0 {
            let bytes = bytemuck::cast_slice(&billboards[..count]);
            self.queue.write_buffer(&self.instances, 0, bytes);
        }

        let [r, g, b] = CLEAR_COLOR;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("aviary.frame"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("aviary.billboards"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_vertex_buffer(0, self.instances.slice(..));
            // Four strip vertices per billboard, corners come from the vertex index.
            pass.draw(0..4, 0..count as u32);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn billboard_pipeline(
    device: &wgpu::Device,
    camera_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("aviary.billboard.wgsl"),
        source: wgpu::ShaderSource::Wgsl(BILLBOARD_WGSL.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("aviary.billboard.layout"),
        bind_group_layouts: &[camera_layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("aviary.billboard"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[InstanceData::layout()],
            compilation_options: Default::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        cache: None,
        multiview: None,
    })
}

/// Billboards for every bird marker and placard, sorted back to front.
pub fn collect_instances(
    scene: &SceneController,
    audio: &NativeAudio,
    tints: &PlacardTints,
    viewer: &Viewer,
) -> Vec<InstanceData> {
    let graph = scene.graph();
    let mut instances = Vec::with_capacity(scene.registry().len() * 2);
    for object in scene.registry().iter() {
        let anchor_scale = graph
            .transform(object.entity)
            .map(|t| t.scale.x)
            .unwrap_or(1.0);
        let mut marker_pos = graph.world_position(object.entity);
        for child in graph.children(object.entity) {
            match graph.kind(*child) {
                Some(EntityKind::Model { .. }) => marker_pos = graph.world_position(*child),
                Some(EntityKind::Placard { texture, width, .. }) => instances.push(InstanceData {
                    pos: graph.world_position(*child).to_array(),
                    scale: width * anchor_scale,
                    color: tints.get(texture),
                    glow: -1.0,
                }),
                _ => {}
            }
        }
        let glow = object
            .channel
            .and_then(|c| audio.linear_gain(c))
            .unwrap_or(0.0);
        let [r, g, b] = scene
            .catalog()
            .iter()
            .find(|b| b.label == object.label)
            .map(|b| b.color_rgb)
            .unwrap_or([1.0, 1.0, 1.0]);
        instances.push(InstanceData {
            pos: marker_pos.to_array(),
            scale: MARKER_SIZE * anchor_scale,
            color: [r, g, b, 1.0],
            glow,
        });
    }
    let eye = viewer.position;
    instances.sort_by(|a, b| {
        let da = Vec3::from(a.pos).distance_squared(eye);
        let db = Vec3::from(b.pos).distance_squared(eye);
        db.total_cmp(&da)
    });
    instances
}
