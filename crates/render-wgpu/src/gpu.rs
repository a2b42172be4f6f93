use crate::meshes::{MeshData, PartRanges, Vertex};
use crate::shaders;
use crate::textures::decode_rgba;
use crate::uniforms::{OBJECT_STRIDE, ObjectUniforms, UniformStaging};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use stilllife_render::{
    MeshKind, MeshLibrary, MeshParts, ShaderProgram, TextureBackend, TextureError, TextureHandle,
    UniformValue,
};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const INITIAL_OBJECT_CAPACITY: u64 = 64;

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    parts: PartRanges,
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Unit binding: which texture sits on a unit, and its bind group.
struct BoundUnit {
    handle: TextureHandle,
    bind_group: wgpu::BindGroup,
}

/// A draw captured by `draw_mesh`, replayed in `end_frame`.
struct PendingDraw {
    kind: MeshKind,
    parts: MeshParts,
    object: ObjectUniforms,
}

/// wgpu implementation of the shader, mesh and texture services.
///
/// Uniform writes land in CPU-side blocks. Each `draw_mesh` snapshots the
/// object block; `end_frame` uploads every snapshot and records the pass.
pub struct WgpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_capacity: u64,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback_bind_group: wgpu::BindGroup,
    meshes: BTreeMap<MeshKind, GpuMesh>,
    textures: HashMap<TextureHandle, GpuTexture>,
    units: BTreeMap<u32, BoundUnit>,
    next_texture: u32,
    staging: UniformStaging,
    pending: Vec<PendingDraw>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let staging = UniformStaging::default();

        // Frame block
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniforms"),
            contents: bytemuck::bytes_of(&staging.frame),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_layout"),
            entries: &[uniform_entry(false)],
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        // Object blocks, one per draw at a dynamic offset
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_layout"),
            entries: &[uniform_entry(true)],
        });
        let (object_buffer, object_bind_group) =
            create_object_buffer(&device, &object_layout, INITIAL_OBJECT_CAPACITY);

        // Textures
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("repeat_linear"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let white = upload_rgba(&device, &queue, "fallback_white", 1, 1, &[255; 4]);
        let fallback_bind_group = texture_bind_group(&device, &texture_layout, &white.view, &sampler);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &object_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Open vessels show their inner walls.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let depth_texture = Self::create_depth_texture(&device, width, height);

        Self {
            device,
            queue,
            pipeline,
            frame_buffer,
            frame_bind_group,
            object_layout,
            object_buffer,
            object_bind_group,
            object_capacity: INITIAL_OBJECT_CAPACITY,
            texture_layout,
            sampler,
            fallback_bind_group,
            meshes: BTreeMap::new(),
            textures: HashMap::new(),
            units: BTreeMap::new(),
            next_texture: 1,
            staging,
            pending: Vec::new(),
            depth_texture,
            surface_format,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(&self.device, width, height);
    }

    /// Forget draws captured since the last `end_frame`.
    pub fn begin_frame(&mut self) {
        self.pending.clear();
    }

    /// Upload uniforms and draw everything captured this frame into `target`.
    /// Returns the number of draws submitted.
    pub fn end_frame(&mut self, target: &wgpu::TextureView) -> usize {
        let draws = std::mem::take(&mut self.pending);
        self.ensure_object_capacity(draws.len() as u64);

        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&self.staging.frame));
        if !draws.is_empty() {
            let mut blocks = vec![0u8; draws.len() * OBJECT_STRIDE as usize];
            for (chunk, draw) in blocks.chunks_exact_mut(OBJECT_STRIDE as usize).zip(&draws) {
                let bytes = bytemuck::bytes_of(&draw.object);
                chunk[..bytes.len()].copy_from_slice(bytes);
            }
            self.queue.write_buffer(&self.object_buffer, 0, &blocks);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for (i, draw) in draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(&draw.kind) else {
                    continue;
                };
                let offset = (i as u64 * OBJECT_STRIDE) as u32;
                pass.set_bind_group(1, &self.object_bind_group, &[offset]);

                let texture = draw
                    .object
                    .uses_texture()
                    .then(|| self.units.get(&draw.object.texture_unit()))
                    .flatten()
                    .map_or(&self.fallback_bind_group, |unit| &unit.bind_group);
                pass.set_bind_group(2, texture, &[]);

                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                for range in mesh.parts.select(draw.parts) {
                    pass.draw_indexed(range, 0, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        draws.len()
    }

    fn ensure_object_capacity(&mut self, needed: u64) {
        if needed <= self.object_capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        tracing::debug!(from = self.object_capacity, to = capacity, "growing object uniform buffer");
        let (buffer, bind_group) = create_object_buffer(&self.device, &self.object_layout, capacity);
        self.object_buffer = buffer;
        self.object_bind_group = bind_group;
        self.object_capacity = capacity;
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

impl ShaderProgram for WgpuRenderer {
    fn use_program(&mut self) {
        // A single pipeline is always current.
        tracing::trace!("scene program in use");
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.staging.apply(name, value);
    }
}

impl MeshLibrary for WgpuRenderer {
    fn load_mesh(&mut self, kind: MeshKind) {
        if self.meshes.contains_key(&kind) {
            return;
        }
        let data = MeshData::build(kind);
        let label = kind.to_string();
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label.as_str()),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label.as_str()),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        tracing::debug!(
            mesh = %kind,
            vertices = data.vertices.len(),
            indices = data.indices.len(),
            "mesh loaded"
        );
        self.meshes.insert(
            kind,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                parts: data.parts,
            },
        );
    }

    fn draw_mesh(&mut self, kind: MeshKind, parts: MeshParts) {
        if !self.meshes.contains_key(&kind) {
            tracing::warn!(mesh = %kind, "draw of a mesh that was never loaded");
            return;
        }
        self.pending.push(PendingDraw {
            kind,
            parts,
            object: self.staging.object,
        });
    }
}

impl TextureBackend for WgpuRenderer {
    fn create_texture(&mut self, path: &Path) -> Result<TextureHandle, TextureError> {
        let image = decode_rgba(path)?;
        image.ensure_fits(path, self.device.limits().max_texture_dimension_2d)?;
        let label = path.display().to_string();
        let texture = upload_rgba(
            &self.device,
            &self.queue,
            &label,
            image.width,
            image.height,
            &image.rgba,
        );
        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(handle, texture);
        Ok(handle)
    }

    fn bind_texture(&mut self, handle: TextureHandle, unit: u32) {
        let Some(texture) = self.textures.get(&handle) else {
            tracing::warn!(?handle, unit, "bind of unknown texture");
            return;
        };
        let bind_group =
            texture_bind_group(&self.device, &self.texture_layout, &texture.view, &self.sampler);
        self.units.insert(unit, BoundUnit { handle, bind_group });
        tracing::debug!(?handle, unit, "texture bound");
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        let Some(texture) = self.textures.remove(&handle) else {
            tracing::warn!(?handle, "destroy of unknown texture");
            return;
        };
        self.units.retain(|_, unit| unit.handle != handle);
        texture.texture.destroy();
    }
}

fn uniform_entry(dynamic: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_object_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("object_uniforms"),
        size: capacity * OBJECT_STRIDE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("object_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    let view = texture.create_view(&Default::default());
    GpuTexture { texture, view }
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("texture_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
