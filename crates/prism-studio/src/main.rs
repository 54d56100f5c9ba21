use anyhow::{Context, Result, ensure};
use prism_engine::PipelineConfig;
use prism_engine::color::LinearRgba;
use prism_engine::layout::{
    ColoredUnlitTexturedVertex, ColoredUnlitTexturedVertexV1, ColoredVertex, ColoredVertexRecord,
    FormatRevision, GpuRecord, InstanceBatch, PerInstanceUniforms, PrimitiveInstance, RecordBuffer,
    SceneBlock, SceneUniforms, TexturedVertex, Uniforms, check_revision, validate_layout,
};
use prism_engine::logging::{LoggingConfig, init_logging};
use prism_engine::math::{Mat4, Quat, Transform, Vec2, Vec3};
use prism_engine::render::gbuffer::{Discriminator, DiscriminatorStrategy, is_object_edge};
use prism_engine::render::oit::{self, OitFragment};
use prism_engine::render::{GBufferLayout, GBufferSample, GBufferTexel, SamplerPolicy};
use prism_engine::scene::{Instance, Material, NearTransparency, SceneState};
use prism_engine::time::FrameClock;

const GRID: u16 = 4;
const FRAMES: u64 = 5;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let revision = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<FormatRevision>()
            .with_context(|| format!("invalid format revision argument {arg:?}"))?,
        None => FormatRevision::LATEST,
    };
    let config = PipelineConfig::for_revision(revision);
    log::info!("prism studio: format revision {revision}, {:?}", config.discriminator);

    check_layouts(revision)?;
    run_frames(&config)?;
    pack_instances(&config)?;
    pack_vertices(revision)?;
    shade_gbuffer(&config)?;
    resolve_transparency(&config)?;

    log::info!("prism studio: all checks passed");
    Ok(())
}

fn check_layouts(revision: FormatRevision) -> Result<()> {
    validate_layout::<TexturedVertex>()?;
    validate_layout::<ColoredUnlitTexturedVertexV1>()?;
    validate_layout::<ColoredUnlitTexturedVertex>()?;
    validate_layout::<PerInstanceUniforms>()?;
    validate_layout::<PrimitiveInstance>()?;
    validate_layout::<Uniforms>()?;
    validate_layout::<SceneUniforms>()?;

    match revision {
        FormatRevision::V1 => {
            check_revision::<PerInstanceUniforms>(revision)?;
            check_revision::<Uniforms>(revision)?;
            describe::<PerInstanceUniforms>();
            describe::<Uniforms>();
        }
        FormatRevision::V2 => {
            check_revision::<PrimitiveInstance>(revision)?;
            check_revision::<SceneUniforms>(revision)?;
            describe::<PrimitiveInstance>();
            describe::<SceneUniforms>();
        }
    }
    describe::<TexturedVertex>();
    Ok(())
}

fn describe<R: GpuRecord>() {
    log::info!("{} ({} bytes, align {})", R::NAME, R::stride(), R::ALIGN);
    for field in R::FIELDS {
        log::debug!("  {:>3} {:<20} {:>3} bytes", field.offset, field.name, field.size);
    }
}

// ── scene ─────────────────────────────────────────────────────────────────

fn run_frames(config: &PipelineConfig) -> Result<()> {
    let mut state = SceneState::new(config.ring(), Default::default());
    let mut clock = FrameClock::new();

    for _ in 0..FRAMES {
        let time = clock.tick();
        state.begin_frame(time);

        let scene = state.scene_mut();
        let eye = Vec3::new(6.0 * time.elapsed.cos(), 3.0, 6.0 * time.elapsed.sin());
        scene.view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        scene.projection = Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        scene.wind_direction = (time.elapsed * 0.5).sin();
        scene.near_transparency = NearTransparency::new(0.5, 1.5);

        let published = state.publish();
        let block = SceneBlock::encode(config.revision, published.scene());
        log::debug!(
            "frame {} → slot {} ({} bytes)",
            published.frame_index(),
            published.slot(),
            block.as_bytes().len()
        );
        ensure!(block.decode().view == published.scene().view, "scene block lost the view matrix");
    }
    Ok(())
}

// ── instances ─────────────────────────────────────────────────────────────

fn grid_instances() -> impl Iterator<Item = Instance> {
    (0..GRID * GRID).map(|i| {
        let (x, z) = ((i % GRID) as f32, (i / GRID) as f32);
        let transform = Transform {
            position: Vec3::new(x * 2.0 - 3.0, 0.0, z * 2.0 - 3.0),
            scale: Vec3::splat(0.8),
            rotation: Quat::from_axis_angle(Vec3::Y, i as f32 * 0.3),
        };
        let alpha = if i % 3 == 0 { 0.5 } else { 1.0 };
        let mut material = Material::new(LinearRgba::new(x / 3.0, 0.5, z / 3.0, alpha))
            .with_uv(Vec2::new(2.0, 2.0), Vec2::ZERO);
        // Checkerboard tiles keep hard texel edges.
        if (i % GRID + i / GRID) % 2 == 0 {
            material = material.with_sampler(SamplerPolicy::POINT_CLAMP);
        }
        Instance::new(transform, material).with_object_id(i + 1)
    })
}

fn pack_instances(config: &PipelineConfig) -> Result<()> {
    let mut batch = InstanceBatch::new(config.revision);
    batch.extend(grid_instances());

    ensure!(
        batch.as_bytes().len() == batch.len() * batch.stride(),
        "instance buffer is not a whole number of records"
    );
    let layout = batch.layout();
    log::info!(
        "instances: {} × {} bytes, {} attributes per instance",
        batch.len(),
        layout.array_stride,
        layout.attributes.len()
    );

    let transparent = (0..batch.len())
        .filter_map(|i| batch.get(i))
        .filter(|inst| inst.material.is_transparent())
        .count();
    log::info!("instances: {transparent} go through the OIT pass");

    for instance in grid_instances().take(2) {
        let sampler = config.material_sampler(&instance.material);
        log::debug!("instance {:?}: {}", instance.object_id, sampler.label());
    }
    Ok(())
}

fn pack_vertices(revision: FormatRevision) -> Result<()> {
    let quad = [
        ColoredVertex::new(Vec3::new(-1.0, -1.0, 0.0), Vec2::new(0.0, 1.0), LinearRgba::WHITE),
        ColoredVertex::new(Vec3::new(1.0, -1.0, 0.0), Vec2::new(1.0, 1.0), LinearRgba::WHITE),
        ColoredVertex::new(Vec3::new(1.0, 1.0, 0.0), Vec2::new(1.0, 0.0), LinearRgba::BLACK),
        ColoredVertex::new(Vec3::new(-1.0, 1.0, 0.0), Vec2::new(0.0, 0.0), LinearRgba::BLACK),
    ];

    let bytes = match revision {
        FormatRevision::V1 => encode_quad::<ColoredUnlitTexturedVertexV1>(&quad),
        FormatRevision::V2 => encode_quad::<ColoredUnlitTexturedVertex>(&quad),
    };
    log::info!("colored quad: {bytes} bytes of vertex data");
    Ok(())
}

fn encode_quad<V: ColoredVertexRecord>(quad: &[ColoredVertex]) -> usize {
    let buffer: RecordBuffer<V> = quad.iter().map(V::encode).collect();
    let layout: wgpu::VertexBufferLayout<'static> = V::layout();
    log::debug!("{}: stride {}, {:?}", V::NAME, layout.array_stride, layout.step_mode);
    buffer.byte_len()
}

// ── deferred ──────────────────────────────────────────────────────────────

fn shade_gbuffer(config: &PipelineConfig) -> Result<()> {
    let layout = GBufferLayout::for_strategy(config.discriminator);
    log::info!("gbuffer: {:?}", layout.formats());

    let discriminator = match config.discriminator {
        DiscriminatorStrategy::ObjectId => Discriminator::ObjectId(Some(7)),
        DiscriminatorStrategy::LinearDepth => Discriminator::LinearDepth(6.5),
    };
    let texel = GBufferTexel::encode(&GBufferSample {
        albedo: LinearRgba::new(0.8, 0.3, 0.1, 1.0),
        normal: Vec3::new(0.0, 1.0, 1.0).normalize(),
        discriminator,
    });
    let sample = texel.decode();
    ensure!((sample.normal.length() - 1.0).abs() < 1e-5, "decoded normal is not unit length");
    ensure!(
        sample.discriminator.strategy() == config.discriminator,
        "discriminator does not match the gbuffer layout"
    );

    let edge = is_object_edge(7, &[7, 7, 8, 7]);
    log::debug!("gbuffer: texel {texel:?}, edge {edge}");
    Ok(())
}

fn resolve_transparency(config: &PipelineConfig) -> Result<()> {
    let fragments = [
        OitFragment::new(LinearRgba::new(1.0, 0.2, 0.2, 0.6), 3.0),
        OitFragment::new(LinearRgba::new(0.2, 1.0, 0.2, 0.3), 8.0),
        OitFragment::new(LinearRgba::new(0.2, 0.2, 1.0, 0.8), 20.0),
    ];
    let opaque = LinearRgba::new(0.1, 0.1, 0.1, 1.0);
    let near = NearTransparency::default();
    let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

    let resolved: Vec<LinearRgba> = orders
        .iter()
        .map(|order| {
            let fragments = order.iter().map(|&i| &fragments[i]);
            let pixel = oit::accumulate(fragments, &config.oit.weight, &near);
            pixel.resolve(opaque, config.oit.epsilon)
        })
        .collect();

    let reference = resolved[0].to_array();
    let spread = resolved
        .iter()
        .flat_map(|c| c.to_array().into_iter().zip(reference).map(|(a, b)| (a - b).abs()))
        .fold(0.0f32, f32::max);

    log::info!("oit: resolved {:?}, max spread across draw orders {spread:e}", resolved[0]);
    ensure!(spread < 1e-4, "OIT result depends on draw order (spread {spread})");
    Ok(())
}
