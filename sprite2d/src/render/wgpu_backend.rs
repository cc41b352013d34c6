use std::collections::HashMap;

use anyhow::{anyhow, Result};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use image::RgbaImage;
use wgpu::util::DeviceExt;
use wgpu::{
    vertex_attr_array, AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry,
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource,
    BindingType, Buffer, BufferBindingType, BufferUsages, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, CompositeAlphaMode, DeviceDescriptor, Extent3d, FilterMode,
    FragmentState, Instance, LoadOp, MultisampleState, Operations, Origin3d,
    PipelineLayoutDescriptor, PresentMode, PrimitiveState, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, RequestAdapterOptions,
    Sampler, SamplerBindingType, SamplerDescriptor, ShaderModuleDescriptor, ShaderSource,
    SurfaceConfiguration, TexelCopyBufferLayout, TexelCopyTextureInfo, TextureAspect,
    TextureDescriptor, TextureDimension, TextureFormat, TextureSampleType, TextureUsages,
    TextureView, TextureViewDescriptor, TextureViewDimension, VertexState,
};
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    assets::TextureSink,
    render::frame::{Frame, Quad},
    render::text::TextSystem,
    texture::{Texture, TextureHandle},
};

// Quads per frame; each one takes one aligned slot in the uniform buffer.
const MAX_QUADS_PER_FRAME: u64 = 4096;

/// Renderer for the window surface: textures, quads and text.
pub struct Renderer<'window> {
    backend: WgpuBackend<'window>,
}

impl<'window> Renderer<'window> {
    pub fn new(window: &'window Window, vsync: bool) -> Result<Self> {
        let backend = WgpuBackend::new(window, vsync)?;
        Ok(Self { backend })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.backend.resize(new_size);
    }

    /// Start collecting draw calls for a new frame.
    pub fn begin_frame(&mut self) -> Frame {
        Frame::new()
    }

    /// Render and present everything collected in `frame`.
    pub fn end_frame(&mut self, frame: Frame) -> Result<()> {
        self.backend.end_frame(frame)
    }

    /// Upload RGBA8 pixels as a new texture.
    pub fn load_texture_from_rgba(&mut self, image: &RgbaImage) -> Result<Texture> {
        self.backend.load_texture_from_rgba(image)
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (
            self.backend.surface_config.width,
            self.backend.surface_config.height,
        )
    }
}

impl TextureSink for Renderer<'_> {
    fn upload_rgba(&mut self, image: &RgbaImage) -> Result<Texture> {
        self.load_texture_from_rgba(image)
    }
}

struct TextureEntry {
    /// Kept alive for the view/sampler.
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: TextureView,
    sampler: Sampler,
}

struct QuadPipeline {
    pipeline: RenderPipeline,
    vertex_buffer: Buffer,
    uniform_buffer: Buffer,
    bind_group_layout: BindGroupLayout,
    uniform_alignment: u64,
}

struct WgpuBackend<'window> {
    window: &'window Window,
    surface: wgpu::Surface<'window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: SurfaceConfiguration,
    present_mode: PresentMode,
    quad_pipeline: QuadPipeline,
    textures: HashMap<TextureHandle, TextureEntry>,
    bind_groups: HashMap<TextureHandle, BindGroup>,
    white: TextureHandle,
    next_texture_id: u32,
    text: TextSystem,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct QuadVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct QuadUniforms {
    mvp: [[f32; 4]; 4],
    color: [f32; 4],
}

// Unit quad centered on the origin, uv (0, 0) at the top-left.
const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex {
        position: [-0.5, -0.5],
        uv: [0.0, 0.0],
    },
    QuadVertex {
        position: [0.5, -0.5],
        uv: [1.0, 0.0],
    },
    QuadVertex {
        position: [0.5, 0.5],
        uv: [1.0, 1.0],
    },
    QuadVertex {
        position: [-0.5, -0.5],
        uv: [0.0, 0.0],
    },
    QuadVertex {
        position: [0.5, 0.5],
        uv: [1.0, 1.0],
    },
    QuadVertex {
        position: [-0.5, 0.5],
        uv: [0.0, 1.0],
    },
];

impl<'window> WgpuBackend<'window> {
    fn new(window: &'window Window, vsync: bool) -> Result<Self> {
        let instance = Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&DeviceDescriptor {
            label: Some("sprite2d-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        }))?;

        let size = window.inner_size();
        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no texture formats"))?;

        let present_mode = choose_present_mode(&capabilities.present_modes, vsync);
        let alpha_mode = choose_alpha_mode(&capabilities.alpha_modes);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!(
            "surface configured: {}x{} {:?} {:?}",
            surface_config.width,
            surface_config.height,
            format,
            present_mode
        );

        let quad_pipeline = create_quad_pipeline(&device, format);
        let text = TextSystem::new(&device, &queue, format);

        let mut backend = Self {
            window,
            surface,
            device,
            queue,
            surface_config,
            present_mode,
            quad_pipeline,
            textures: HashMap::new(),
            bind_groups: HashMap::new(),
            white: TextureHandle(0),
            next_texture_id: 1,
            text,
        };

        // 1x1 white texture, tinted to draw solid rectangles
        let white = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        backend.white = backend.load_texture_from_rgba(&white)?.handle;
        Ok(backend)
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface_config.present_mode = self.present_mode;
        self.surface.configure(&self.device, &self.surface_config);
    }

    fn acquire(&mut self) -> Result<wgpu::SurfaceTexture> {
        loop {
            match self.surface.get_current_texture() {
                Ok(surface_texture) => return Ok(surface_texture),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::warn!("surface lost, reconfiguring");
                    self.surface.configure(&self.device, &self.surface_config);
                }
                Err(wgpu::SurfaceError::Timeout) => continue,
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    return Err(anyhow!("Surface ran out of memory"));
                }
                Err(wgpu::SurfaceError::Other) => {
                    return Err(anyhow!("Surface error: Other"));
                }
            }
        }
    }

    /// Size of the canvas coordinate space (logical window pixels) and the
    /// factor from canvas to surface pixels.
    fn canvas_space(&self) -> ((f32, f32), f32) {
        let scale = self.window.scale_factor() as f32;
        let width = self.surface_config.width as f32 / scale;
        let height = self.surface_config.height as f32 / scale;
        ((width, height), scale)
    }

    fn write_quads(&mut self, quads: &[Quad]) -> Result<Vec<(TextureHandle, u32)>> {
        if quads.len() as u64 > MAX_QUADS_PER_FRAME {
            return Err(anyhow!(
                "Too many quads drawn in one frame (max: {MAX_QUADS_PER_FRAME})"
            ));
        }

        let ((width, height), _) = self.canvas_space();
        let projection = Mat4::orthographic_rh_gl(0.0, width, height, 0.0, -1.0, 1.0);
        let alignment = self.quad_pipeline.uniform_alignment;

        let mut draws = Vec::with_capacity(quads.len());
        for (slot, quad) in quads.iter().enumerate() {
            let texture = quad.texture.unwrap_or(self.white);
            if !self.textures.contains_key(&texture) {
                return Err(anyhow!("Unknown texture handle {}", texture.id()));
            }

            let model = Mat4::from_translation(Vec3::new(
                quad.x + quad.width / 2.0,
                quad.y + quad.height / 2.0,
                0.0,
            )) * Mat4::from_scale(Vec3::new(quad.width, quad.height, 1.0));
            let uniforms = QuadUniforms {
                mvp: (projection * model).to_cols_array_2d(),
                color: quad.color,
            };

            let offset = slot as u64 * alignment;
            self.queue.write_buffer(
                &self.quad_pipeline.uniform_buffer,
                offset,
                bytemuck::bytes_of(&uniforms),
            );
            self.ensure_bind_group(texture)?;
            draws.push((texture, offset as u32));
        }
        Ok(draws)
    }

    fn ensure_bind_group(&mut self, handle: TextureHandle) -> Result<()> {
        if self.bind_groups.contains_key(&handle) {
            return Ok(());
        }
        let texture = self
            .textures
            .get(&handle)
            .ok_or_else(|| anyhow!("Unknown texture handle {}", handle.id()))?;
        let uniform_size = std::mem::size_of::<QuadUniforms>() as u64;
        let bind_group = self.device.create_bind_group(&BindGroupDescriptor {
            label: Some("quad-bind-group"),
            layout: &self.quad_pipeline.bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &self.quad_pipeline.uniform_buffer,
                        offset: 0,
                        size: std::num::NonZeroU64::new(uniform_size),
                    }),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::TextureView(&texture.view),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: BindingResource::Sampler(&texture.sampler),
                },
            ],
        });
        self.bind_groups.insert(handle, bind_group);
        Ok(())
    }

    fn end_frame(&mut self, frame: Frame) -> Result<()> {
        let draws = self.write_quads(&frame.quads)?;
        let (_, scale) = self.canvas_space();
        let surface_size = (self.surface_config.width, self.surface_config.height);
        self.text
            .prepare(&self.device, &self.queue, surface_size, scale, &frame.texts)?;

        let surface_texture = self.acquire()?;
        let view = surface_texture
            .texture
            .create_view(&TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        {
            let color = frame.clear_color;
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("frame-pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color {
                            r: color[0] as f64,
                            g: color[1] as f64,
                            b: color[2] as f64,
                            a: color[3] as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                multiview_mask: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_pipeline(&self.quad_pipeline.pipeline);
            pass.set_vertex_buffer(0, self.quad_pipeline.vertex_buffer.slice(..));
            for (texture, offset) in &draws {
                let bind_group = self
                    .bind_groups
                    .get(texture)
                    .ok_or_else(|| anyhow!("Bind group not found for texture handle"))?;
                pass.set_bind_group(0, bind_group, &[*offset]);
                pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
            }

            self.text.render(&mut pass)?;
        }

        self.queue.submit(Some(encoder.finish()));
        surface_texture.present();
        self.text.trim();
        Ok(())
    }

    fn load_texture_from_rgba(&mut self, image: &RgbaImage) -> Result<Texture> {
        let (width, height) = image.dimensions();
        let size = Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&TextureDescriptor {
            label: Some("texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            image.as_raw(),
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&TextureViewDescriptor::default());

        // Sprites are drawn at native size, so nearest keeps pixel art crisp
        let sampler = self.device.create_sampler(&SamplerDescriptor {
            label: Some("sprite-sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let handle = TextureHandle(self.next_texture_id);
        self.next_texture_id += 1;
        self.textures.insert(
            handle,
            TextureEntry {
                texture,
                view,
                sampler,
            },
        );
        log::debug!("uploaded texture {} ({width}x{height})", handle.id());

        Ok(Texture::new(handle, width, height))
    }
}

fn create_quad_pipeline(device: &wgpu::Device, surface_format: TextureFormat) -> QuadPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("sprite-shader"),
        source: ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("quad-bind-group-layout"),
        entries: &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<QuadUniforms>() as u64,
                    ),
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("quad-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("quad-vertices"),
        contents: bytemuck::cast_slice(&QUAD_VERTICES),
        usage: BufferUsages::VERTEX,
    });

    let uniform_alignment = (device.limits().min_uniform_buffer_offset_alignment as u64)
        .max(std::mem::size_of::<QuadUniforms>() as u64);

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("quad-uniform-buffer"),
        size: MAX_QUADS_PER_FRAME * uniform_alignment,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("quad-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &vertex_attr_array![0 => Float32x2, 1 => Float32x2],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: PrimitiveState::default(),
        depth_stencil: None,
        multisample: MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    QuadPipeline {
        pipeline,
        vertex_buffer,
        uniform_buffer,
        bind_group_layout,
        uniform_alignment,
    }
}

fn choose_present_mode(modes: &[PresentMode], vsync: bool) -> PresentMode {
    if vsync {
        modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, PresentMode::Fifo | PresentMode::FifoRelaxed))
            .unwrap_or(PresentMode::Fifo)
    } else {
        modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, PresentMode::Immediate | PresentMode::Mailbox))
            .unwrap_or(PresentMode::Fifo)
    }
}

fn choose_alpha_mode(modes: &[CompositeAlphaMode]) -> CompositeAlphaMode {
    modes
        .iter()
        .copied()
        .find(|mode| matches!(mode, CompositeAlphaMode::Auto))
        .unwrap_or_else(|| modes.first().copied().unwrap_or(CompositeAlphaMode::Opaque))
}
