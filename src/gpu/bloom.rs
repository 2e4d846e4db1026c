//! Glow post-process.
//!
//! The rain is drawn into an HDR offscreen target. From there:
//!
//! 1. **extract**: pixels above the luminance threshold go to half-res `a`
//! 2. **blur**: horizontal `a -> b`, then vertical `b -> a`
//! 3. **composite**: `scene + a * strength` onto the surface
//!
//! Every pass is a fullscreen triangle over `bloom.wgsl`. Textures and the
//! bind groups that reference them are rebuilt on resize.

use wgpu::util::DeviceExt;

use super::camera::Viewport;
use crate::config::BloomSettings;
use crate::shader::{BloomParams, BLOOM_SHADER};

/// Format of the scene and bloom targets.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Offscreen target plus its view.
struct Target {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Target {
    fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: HDR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Size-dependent resources.
struct Targets {
    scene: Target,
    bloom_a: Target,
    bloom_b: Target,
    extract_bind_group: wgpu::BindGroup,
    blur_h_bind_group: wgpu::BindGroup,
    blur_v_bind_group: wgpu::BindGroup,
    composite_bind_group: wgpu::BindGroup,
}

/// GPU resources for the bloom chain.
pub struct BloomState {
    settings: BloomSettings,
    sampler: wgpu::Sampler,
    single_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    extract_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    /// Params for the half-res passes; direction is horizontal.
    horizontal_params: wgpu::Buffer,
    vertical_params: wgpu::Buffer,
    /// Params for extract and composite, which sample full-res textures.
    full_params: wgpu::Buffer,
    targets: Targets,
}

impl BloomState {
    /// Create the bloom chain for a viewport and output format.
    pub fn new(
        device: &wgpu::Device,
        settings: BloomSettings,
        viewport: Viewport,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Shader"),
            source: wgpu::ShaderSource::Wgsl(BLOOM_SHADER.into()),
        });

        let single_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Bind Group Layout"),
            entries: &[texture_entry(0), sampler_entry(1), params_entry(2)],
        });

        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Composite Bind Group Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                params_entry(2),
                texture_entry(3),
            ],
        });

        let extract_pipeline =
            fullscreen_pipeline(device, &shader, &single_layout, "fs_extract", HDR_FORMAT, "Bloom Extract");
        let blur_pipeline =
            fullscreen_pipeline(device, &shader, &single_layout, "fs_blur", HDR_FORMAT, "Bloom Blur");
        let composite_pipeline = fullscreen_pipeline(
            device,
            &shader,
            &composite_layout,
            "fs_composite",
            surface_format,
            "Bloom Composite",
        );

        let (full, half) = extents(viewport);
        let full_params = params_buffer(device, "Bloom Full Params", params(&settings, full, [0.0, 0.0]));
        let horizontal_params =
            params_buffer(device, "Bloom Horizontal Params", params(&settings, half, [1.0, 0.0]));
        let vertical_params =
            params_buffer(device, "Bloom Vertical Params", params(&settings, half, [0.0, 1.0]));

        let targets = create_targets(
            device,
            &sampler,
            &single_layout,
            &composite_layout,
            &full_params,
            &horizontal_params,
            &vertical_params,
            viewport,
        );

        Self {
            settings,
            sampler,
            single_layout,
            composite_layout,
            extract_pipeline,
            blur_pipeline,
            composite_pipeline,
            horizontal_params,
            vertical_params,
            full_params,
            targets,
        }
    }

    /// View the scene pass should render into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene.view
    }

    /// Recreate textures, params and bind groups after a resize.
    pub fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, viewport: Viewport) {
        self.destroy_targets();

        let (full, half) = extents(viewport);
        queue.write_buffer(
            &self.full_params,
            0,
            bytemuck::bytes_of(&params(&self.settings, full, [0.0, 0.0])),
        );
        queue.write_buffer(
            &self.horizontal_params,
            0,
            bytemuck::bytes_of(&params(&self.settings, half, [1.0, 0.0])),
        );
        queue.write_buffer(
            &self.vertical_params,
            0,
            bytemuck::bytes_of(&params(&self.settings, half, [0.0, 1.0])),
        );

        self.targets = create_targets(
            device,
            &self.sampler,
            &self.single_layout,
            &self.composite_layout,
            &self.full_params,
            &self.horizontal_params,
            &self.vertical_params,
            viewport,
        );
    }

    /// Record extract, blur and composite passes, writing to `output`.
    pub fn execute(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let t = &self.targets;
        fullscreen_pass(encoder, "Bloom Extract Pass", &t.bloom_a.view, &self.extract_pipeline, &t.extract_bind_group);
        fullscreen_pass(encoder, "Bloom Blur H Pass", &t.bloom_b.view, &self.blur_pipeline, &t.blur_h_bind_group);
        fullscreen_pass(encoder, "Bloom Blur V Pass", &t.bloom_a.view, &self.blur_pipeline, &t.blur_v_bind_group);
        fullscreen_pass(encoder, "Bloom Composite Pass", output, &self.composite_pipeline, &t.composite_bind_group);
    }

    /// Release all GPU memory held by the chain.
    pub fn destroy(self) {
        self.destroy_targets();
        self.full_params.destroy();
        self.horizontal_params.destroy();
        self.vertical_params.destroy();
    }

    fn destroy_targets(&self) {
        self.targets.scene.texture.destroy();
        self.targets.bloom_a.texture.destroy();
        self.targets.bloom_b.texture.destroy();
    }
}

/// Full and half-resolution extents, each at least 1x1.
fn extents(viewport: Viewport) -> (Viewport, Viewport) {
    let half = Viewport::new(viewport.width / 2, viewport.height / 2);
    (viewport, half)
}

fn params(settings: &BloomSettings, sampled: Viewport, direction: [f32; 2]) -> BloomParams {
    BloomParams {
        texel_size: [1.0 / sampled.width as f32, 1.0 / sampled.height as f32],
        direction,
        threshold: settings.threshold,
        strength: settings.strength,
        spread: settings.spread(),
        _pad: 0.0,
    }
}

fn params_buffer(device: &wgpu::Device, label: &str, params: BloomParams) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(&params),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

#[allow(clippy::too_many_arguments)]
fn create_targets(
    device: &wgpu::Device,
    sampler: &wgpu::Sampler,
    single_layout: &wgpu::BindGroupLayout,
    composite_layout: &wgpu::BindGroupLayout,
    full_params: &wgpu::Buffer,
    horizontal_params: &wgpu::Buffer,
    vertical_params: &wgpu::Buffer,
    viewport: Viewport,
) -> Targets {
    let (full, half) = extents(viewport);
    let scene = Target::new(device, "Scene Texture", full.width, full.height);
    let bloom_a = Target::new(device, "Bloom Texture A", half.width, half.height);
    let bloom_b = Target::new(device, "Bloom Texture B", half.width, half.height);

    let single = |label: &str, view: &wgpu::TextureView, params: &wgpu::Buffer| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: single_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        })
    };

    let extract_bind_group = single("Bloom Extract Bind Group", &scene.view, full_params);
    let blur_h_bind_group = single("Bloom Blur H Bind Group", &bloom_a.view, horizontal_params);
    let blur_v_bind_group = single("Bloom Blur V Bind Group", &bloom_b.view, vertical_params);

    let composite_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Bloom Composite Bind Group"),
        layout: composite_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&scene.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: full_params.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&bloom_a.view),
            },
        ],
    });

    Targets {
        scene,
        bloom_a,
        bloom_b,
        extract_bind_group,
        blur_h_bind_group,
        blur_v_bind_group,
        composite_bind_group,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn params_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::BindGroupLayout,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            depth_slice: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
