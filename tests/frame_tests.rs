//! Integration tests for drawing, pipeline caching, presentation and the
//! scene renderer.
//!
//! Run with: cargo test --test frame_tests

mod common;

use std::sync::Arc;

use common::{checkerboard, test_window, TestContext, RGBA8};
use glam::{Mat4, Vec3, Vec4};
use graphics_rhi::backend::GpuCommand;
use graphics_rhi::scene::GlobalShaderParam;
use graphics_rhi::{
    DepthStencil, DeviceConfig, FrameStats, PipelineStateCache, PixelFormat, RenderItem,
    RenderScene, RenderState, RenderTarget, ResourceState, RhiError, SceneRenderer,
    ShaderDescriptor, ShaderInstance, ShaderStage, TextureDescriptor, UniformLayout,
};
use rstest::rstest;

fn create_outputs(
    ctx: &mut TestContext,
    depth_format: PixelFormat,
) -> (Arc<RenderTarget>, Arc<DepthStencil>) {
    let target = ctx
        .device
        .create_render_target(&TextureDescriptor::new_2d(64, 64, RGBA8).with_label("color"))
        .unwrap();
    let depth = ctx
        .device
        .create_depth_stencil(&TextureDescriptor::new_2d(64, 64, depth_format).with_label("depth"))
        .unwrap();
    (target, depth)
}

fn count_commands(ctx: &TestContext, predicate: impl Fn(&GpuCommand) -> bool) -> usize {
    ctx.dummy
        .recorded_commands()
        .iter()
        .filter(|command| predicate(command))
        .count()
}

fn is_set_pipeline(command: &GpuCommand) -> bool {
    matches!(command, GpuCommand::SetPipelineState(_))
}

// ============================================================================
// Pipeline cache
// ============================================================================

/// Identical keys return the same pipeline; clearing forces a rebuild.
#[test]
fn test_pipeline_cache_identity() {
    let mut ctx = TestContext::new();
    let shader = ctx.create_test_shader("cache");
    let (vertices, _) = ctx.create_quad();
    let (target, depth) = create_outputs(&mut ctx, PixelFormat::D24UnormS8Uint);
    let targets = [target];

    let mut cache = PipelineStateCache::new(ctx.device.backend());
    let first = cache
        .get(&shader, vertices.layout(), &targets, Some(&depth), RenderState::default())
        .unwrap();
    let second = cache
        .get(&shader, vertices.layout(), &targets, Some(&depth), RenderState::default())
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(cache.stats().misses, 1);

    cache.clear();
    assert!(cache.is_empty());
    let rebuilt = cache
        .get(&shader, vertices.layout(), &targets, Some(&depth), RenderState::default())
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &rebuilt));
    assert_eq!(ctx.dummy.pipelines_created(), 2);
}

/// Each differing key component produces its own pipeline.
#[rstest]
#[case::render_state(RenderState::default(), RenderState::ALPHA_BLEND | RenderState::CULL_NONE)]
#[case::no_depth_write(RenderState::default(), RenderState::DEPTH_TEST)]
fn test_pipeline_cache_distinguishes_render_state(
    #[case] first: RenderState,
    #[case] second: RenderState,
) {
    let mut ctx = TestContext::new();
    let shader = ctx.create_test_shader("states");
    let (vertices, _) = ctx.create_quad();
    let mut cache = PipelineStateCache::new(ctx.device.backend());

    let a = cache.get(&shader, vertices.layout(), &[], None, first).unwrap();
    let b = cache.get(&shader, vertices.layout(), &[], None, second).unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 2);
}

/// A failed compile leaves the cache untouched and can be retried.
#[test]
fn test_pipeline_compile_failure() {
    let mut ctx = TestContext::new();
    let shader = ctx.create_test_shader("broken");
    let instance = ShaderInstance::new(shader);
    let (vertices, indices) = ctx.create_quad();

    ctx.dummy.set_fail_pipeline_creation(true);
    let result = ctx.device.draw_indexed(
        &instance,
        &vertices,
        &indices,
        RenderState::default(),
        6,
        0,
        0,
    );
    assert!(matches!(result, Err(RhiError::Backend(_))));
    assert!(ctx.device.pipeline_cache().is_empty());
    assert_eq!(ctx.dummy.draw_count(), 0);

    ctx.dummy.set_fail_pipeline_creation(false);
    ctx.device
        .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
        .unwrap();
    assert_eq!(ctx.device.pipeline_cache().len(), 1);
    assert_eq!(ctx.dummy.draw_count(), 1);
}

// ============================================================================
// Drawing
// ============================================================================

/// Two draws with the same material and outputs share one pipeline. A new
/// depth format needs a second one.
#[test]
fn test_draws_reuse_pipeline() {
    let mut ctx = TestContext::new();
    let shader = ctx.create_test_shader("reuse");
    let instance = ctx.device.create_shader_instance(&shader);
    let (vertices, indices) = ctx.create_quad();
    let (target, depth) = create_outputs(&mut ctx, PixelFormat::D24UnormS8Uint);

    ctx.device.set_outputs(&[Arc::clone(&target)], Some(&depth));
    for _ in 0..2 {
        ctx.device
            .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
            .unwrap();
    }
    assert_eq!(ctx.dummy.pipelines_created(), 1);
    assert_eq!(count_commands(&ctx, is_set_pipeline), 1);
    assert_eq!(ctx.dummy.draw_count(), 2);

    let depth32 = ctx
        .device
        .create_depth_stencil(&TextureDescriptor::new_2d(64, 64, PixelFormat::D32Float))
        .unwrap();
    ctx.device.set_outputs(&[target], Some(&depth32));
    ctx.device
        .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
        .unwrap();

    assert_eq!(ctx.dummy.pipelines_created(), 2);
    assert_eq!(ctx.device.pipeline_cache().len(), 2);
    assert_eq!(ctx.device.pipeline_cache().stats().hits, 1);
}

/// Reloading shaders evicts every pipeline; the next draw compiles again.
#[test]
fn test_reload_shaders() {
    let mut ctx = TestContext::new();
    let shader = ctx.create_test_shader("reload");
    let instance = ctx.device.create_shader_instance(&shader);
    let (vertices, indices) = ctx.create_quad();

    ctx.device
        .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
        .unwrap();
    let before = Arc::clone(ctx.device.executor().current_pipeline().unwrap());
    ctx.device
        .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
        .unwrap();
    assert!(Arc::ptr_eq(
        &before,
        ctx.device.executor().current_pipeline().unwrap()
    ));

    ctx.device.reload_shaders();
    assert!(ctx.device.pipeline_cache().is_empty());

    ctx.device
        .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
        .unwrap();
    let after = ctx.device.executor().current_pipeline().unwrap();
    assert!(!Arc::ptr_eq(&before, after));
    assert_ne!(before.native(), after.native());
    assert_eq!(before.key(), after.key());
    assert_eq!(ctx.dummy.pipelines_created(), 2);
    assert_eq!(count_commands(&ctx, is_set_pipeline), 2);
}

/// Shaders built from the same compiled stages but declaring different
/// uniform layouts get their own pipelines and root layouts.
#[test]
fn test_shared_stages_keep_their_own_binding_layout() {
    let mut ctx = TestContext::new();
    let vs = ctx.device.create_shader_stage("shared", ShaderStage::Vertex).unwrap();
    let ps = ctx.device.create_shader_stage("shared", ShaderStage::Pixel).unwrap();
    let narrow = ctx
        .device
        .create_shader(
            ShaderDescriptor::new(Arc::clone(&vs), Arc::clone(&ps))
                .with_uniform_layout(UniformLayout::new().with_constant_buffer("PerObject", 0)),
        )
        .unwrap();
    let wide = ctx
        .device
        .create_shader(
            ShaderDescriptor::new(vs, ps).with_uniform_layout(
                UniformLayout::new()
                    .with_constant_buffer("PerObject", 0)
                    .with_constant_buffer("PerFrame", 1)
                    .with_texture("Albedo", 0),
            ),
        )
        .unwrap();
    let (vertices, indices) = ctx.create_quad();

    for shader in [&narrow, &wide] {
        let instance = ctx.device.create_shader_instance(shader);
        ctx.device
            .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
            .unwrap();
    }

    assert_eq!(ctx.dummy.pipelines_created(), 2);
    assert_eq!(ctx.dummy.binding_layouts_created(), 2);
    let commands = ctx.dummy.recorded_commands();
    let layouts: Vec<_> = commands
        .iter()
        .filter_map(|command| match command {
            GpuCommand::SetBindingLayout(layout) => Some(*layout),
            _ => None,
        })
        .collect();
    assert_eq!(layouts.len(), 2);
    assert_ne!(layouts[0], layouts[1]);

    // the wide draw binds root index 1 only after switching to its layout
    let switch = commands
        .iter()
        .rposition(|command| matches!(command, GpuCommand::SetBindingLayout(_)))
        .unwrap();
    let first_wide_bind = commands
        .iter()
        .position(|command| matches!(command, GpuCommand::SetConstantBuffer { root_index: 1, .. }))
        .unwrap();
    assert!(first_wide_bind > switch);
}

/// Shaders whose uniform layouts have the same shape share one native
/// binding layout.
#[test]
fn test_equal_layouts_share_binding_layout() {
    let mut ctx = TestContext::new();
    let first = ctx.create_test_shader("first");
    let second = ctx.create_test_shader("second");
    let (vertices, indices) = ctx.create_quad();

    for shader in [&first, &second] {
        let instance = ctx.device.create_shader_instance(shader);
        ctx.device
            .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
            .unwrap();
    }

    assert_eq!(ctx.dummy.pipelines_created(), 2);
    assert_eq!(ctx.dummy.binding_layouts_created(), 1);
    assert_eq!(ctx.device.pipeline_cache().binding_layout_count(), 1);
    assert_eq!(
        count_commands(&ctx, |c| matches!(c, GpuCommand::SetBindingLayout(_))),
        1
    );
}

/// Constants land in the ring and are bound by offset; textures are bound
/// after the constant buffer slots.
#[test]
fn test_draw_binds_constants_and_textures() {
    let mut ctx = TestContext::new();
    let shader = ctx.create_test_shader("bindings");
    let texture = ctx
        .device
        .create_texture(&TextureDescriptor::new_2d(4, 4, RGBA8), &checkerboard(4))
        .unwrap();
    let mut instance = ctx.device.create_shader_instance(&shader);
    let tint = [0.25f32, 0.5, 0.75, 1.0];
    assert!(instance.set_parameter("Tint", &tint));
    assert!(instance.set_texture("Albedo", Arc::clone(&texture)));
    let (vertices, indices) = ctx.create_quad();

    ctx.dummy.clear_recorded();
    ctx.device
        .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
        .unwrap();

    let ring = ctx.device.executor().constant_ring().handle();
    let commands = ctx.dummy.recorded_commands();
    assert!(commands.iter().any(|command| matches!(
        command,
        GpuCommand::SetConstantBuffer { root_index: 0, resource, offset: 0 } if *resource == ring
    )));
    let srv = texture.shader_resource_view().unwrap().handle();
    assert!(commands.iter().any(|command| matches!(
        command,
        GpuCommand::SetShaderResource { root_index: 1, view } if *view == srv
    )));
    assert!(matches!(
        commands.last(),
        Some(GpuCommand::DrawIndexed { index_count: 6, start_index: 0, base_vertex: 0 })
    ));

    let data = ctx.dummy.resource_data(ring).unwrap();
    let expected: &[u8] = bytemuck::cast_slice(&tint);
    assert_eq!(&data[64..80], expected);
    // already shader readable after upload
    assert!(ctx.dummy.barriers_for(texture.resource().handle()).is_empty());
}

/// A render target sampled by a draw is transitioned to a shader-readable
/// state first.
#[test]
fn test_render_target_sampled_after_rendering() {
    let mut ctx = TestContext::new();
    let shader = ctx.create_test_shader("post");
    let (offscreen, _) = create_outputs(&mut ctx, PixelFormat::D24UnormS8Uint);
    let mut instance = ctx.device.create_shader_instance(&shader);
    assert!(instance.set_texture("Albedo", Arc::clone(&offscreen)));
    let (vertices, indices) = ctx.create_quad();

    ctx.device
        .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
        .unwrap();

    assert_eq!(
        ctx.dummy.barriers_for(offscreen.resource().handle()),
        vec![(ResourceState::RENDER_TARGET, ResourceState::PIXEL_SHADER_RESOURCE)]
    );
}

/// Bindings lost on submit are recorded again by the next draw.
#[test]
fn test_bindings_restored_after_submit() {
    let mut ctx = TestContext::new();
    let shader = ctx.create_test_shader("rebind");
    let instance = ctx.device.create_shader_instance(&shader);
    let (vertices, indices) = ctx.create_quad();

    ctx.device
        .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
        .unwrap();
    ctx.device.executor_mut().submit().unwrap();
    ctx.dummy.clear_recorded();

    ctx.device
        .executor_mut()
        .draw_shader_instance(&instance, 6, 0, 0)
        .unwrap();
    assert_eq!(count_commands(&ctx, is_set_pipeline), 1);
    assert_eq!(
        count_commands(&ctx, |c| matches!(c, GpuCommand::SetVertexBuffer { .. })),
        1
    );
    assert_eq!(
        count_commands(&ctx, |c| matches!(c, GpuCommand::SetIndexBuffer { .. })),
        1
    );
}

#[test]
fn test_draw_without_pipeline() {
    let mut ctx = TestContext::new();
    let shader = ctx.create_test_shader("nopipe");
    let instance = ctx.device.create_shader_instance(&shader);
    let result = ctx
        .device
        .executor_mut()
        .draw_shader_instance(&instance, 3, 0, 0);
    assert!(matches!(result, Err(RhiError::InvalidParameter(_))));
}

/// Running out of constant ring space mid-frame flushes and rewinds.
#[test]
fn test_constant_ring_overflow() {
    let mut ctx = TestContext::with_config(DeviceConfig::default().with_constant_ring_size(512));
    let shader = ctx.create_test_shader("overflow");
    let instance = ctx.device.create_shader_instance(&shader);
    let (vertices, indices) = ctx.create_quad();

    for _ in 0..3 {
        ctx.device
            .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
            .unwrap();
    }

    assert_eq!(ctx.dummy.submission_count(), 1);
    assert_eq!(ctx.device.executor().constant_ring().reset_count(), 1);
    assert_eq!(ctx.device.executor().constant_ring().write_offset(), 80);
    assert_eq!(ctx.dummy.draw_count(), 3);
    assert_eq!(count_commands(&ctx, is_set_pipeline), 2);
}

#[test]
fn test_constants_larger_than_ring() {
    let mut ctx = TestContext::with_config(DeviceConfig::default().with_constant_ring_size(256));
    let vs = ctx.device.create_shader_stage("big", ShaderStage::Vertex).unwrap();
    let ps = ctx.device.create_shader_stage("big", ShaderStage::Pixel).unwrap();
    let shader = ctx
        .device
        .create_shader(
            ShaderDescriptor::new(vs, ps)
                .with_uniform_layout(UniformLayout::new().with_constant_buffer("Bones", 0))
                .with_parameter("Bones", 0, 0, 128),
        )
        .unwrap();
    let instance = ctx.device.create_shader_instance(&shader);
    let (vertices, indices) = ctx.create_quad();

    let result =
        ctx.device
            .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0);
    assert!(matches!(result, Err(RhiError::InvalidParameter(_))));
    assert_eq!(ctx.dummy.draw_count(), 0);
}

/// Statistics accumulate per draw and reset when read.
#[test]
fn test_stats_reset() {
    let mut ctx = TestContext::new();
    let shader = ctx.create_test_shader("stats");
    let instance = ctx.device.create_shader_instance(&shader);
    let (vertices, indices) = ctx.create_quad();

    ctx.device
        .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
        .unwrap();
    ctx.device
        .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 3, 3, 0)
        .unwrap();

    assert_eq!(
        ctx.device.get_and_clear_stats(),
        FrameStats {
            draw_calls: 2,
            faces: 3
        }
    );
    assert_eq!(ctx.device.get_and_clear_stats(), FrameStats::default());
}

#[test]
fn test_end_frame_rewinds_constants() {
    let mut ctx = TestContext::new();
    let shader = ctx.create_test_shader("frame");
    let instance = ctx.device.create_shader_instance(&shader);
    let (vertices, indices) = ctx.create_quad();

    ctx.device
        .draw_indexed(&instance, &vertices, &indices, RenderState::default(), 6, 0, 0)
        .unwrap();
    assert!(ctx.device.executor().constant_ring().write_offset() > 0);

    ctx.device.end_frame().unwrap();
    assert_eq!(ctx.device.executor().constant_ring().write_offset(), 0);
    assert_eq!(ctx.dummy.submission_count(), 1);
}

// ============================================================================
// Viewport
// ============================================================================

/// A frame moves the back buffer from present to render target and back.
#[test]
fn test_viewport_frame() {
    let mut ctx = TestContext::new();
    let mut viewport = ctx
        .device
        .create_viewport(64, 48, RGBA8, test_window())
        .unwrap();
    assert_eq!(viewport.back_buffers().len(), 2);
    let first = viewport.back_buffers()[0].resource().handle();
    let first_rtv = viewport.back_buffers()[0].render_target_view().handle();

    viewport
        .begin_draw(&mut ctx.device, [0.0, 0.0, 0.0, 1.0])
        .unwrap();
    assert!(viewport.begin_draw(&mut ctx.device, [0.0; 4]).is_err());
    viewport.end_draw(&mut ctx.device).unwrap();

    assert_eq!(
        ctx.dummy.barriers_for(first),
        vec![
            (ResourceState::PRESENT, ResourceState::RENDER_TARGET),
            (ResourceState::RENDER_TARGET, ResourceState::PRESENT),
        ]
    );
    assert!(ctx.dummy.recorded_commands().iter().any(|command| matches!(
        command,
        GpuCommand::ClearRenderTarget { view, color } if *view == first_rtv && *color == [0.0, 0.0, 0.0, 1.0]
    )));
    assert_eq!(ctx.dummy.present_count(), 1);
    assert_eq!(
        viewport.current_back_buffer().resource().handle(),
        viewport.back_buffers()[1].resource().handle()
    );
    assert!(viewport.end_draw(&mut ctx.device).is_err());
}

#[test]
fn test_viewport_resize() {
    let mut ctx = TestContext::new();
    let mut viewport = ctx
        .device
        .create_viewport(64, 48, RGBA8, test_window())
        .unwrap();
    viewport.begin_draw(&mut ctx.device, [0.0; 4]).unwrap();
    viewport.end_draw(&mut ctx.device).unwrap();
    let old = viewport.back_buffers()[0].resource().handle();

    viewport.resize(&mut ctx.device, 128, 32).unwrap();

    assert_eq!((viewport.width(), viewport.height()), (128, 32));
    assert_eq!(
        ctx.dummy.swapchain_size(viewport.swapchain()),
        Some((128, 32))
    );
    assert!(!ctx.dummy.is_resource_alive(old));
    let desc = ctx
        .dummy
        .resource_desc(viewport.back_buffers()[0].resource().handle())
        .unwrap();
    assert_eq!((desc.width, desc.height), (128, 32));
    assert!(viewport.resize(&mut ctx.device, 0, 32).is_err());
}

#[rstest]
#[case::zero_size(0, 48, RGBA8)]
#[case::depth_format(64, 48, PixelFormat::D32Float)]
fn test_invalid_viewport(#[case] width: u32, #[case] height: u32, #[case] format: PixelFormat) {
    let mut ctx = TestContext::new();
    let result = ctx.device.create_viewport(width, height, format, test_window());
    assert!(matches!(result, Err(RhiError::InvalidParameter(_))));
}

// ============================================================================
// Scene renderer
// ============================================================================

fn create_scene_shader(ctx: &TestContext) -> Arc<graphics_rhi::Shader> {
    let vs = ctx.device.create_shader_stage("scene", ShaderStage::Vertex).unwrap();
    let ps = ctx.device.create_shader_stage("scene", ShaderStage::Pixel).unwrap();
    ctx.device
        .create_shader(
            ShaderDescriptor::new(vs, ps)
                .with_label("scene")
                .with_uniform_layout(
                    UniformLayout::new()
                        .with_constant_buffer("PerFrame", 0)
                        .with_constant_buffer("PerObject", 1),
                )
                .with_parameter("ViewProj", 0, 0, 16)
                .with_parameter("CameraPos", 0, 16, 4)
                .with_parameter("SunColor", 0, 20, 4)
                .with_parameter("SunDirection", 0, 24, 4)
                .with_parameter("AmbientColor", 0, 28, 4)
                .with_parameter("World", 1, 0, 16),
        )
        .unwrap()
}

/// One frame of the renderer: clear, draw every item, present.
#[test]
fn test_scene_renderer_frame() {
    let mut ctx = TestContext::new();
    let shader = create_scene_shader(&ctx);
    let (vertices, indices) = ctx.create_quad();
    let mut renderer = SceneRenderer::new(test_window());
    let mut scene = RenderScene::new();

    // nothing to draw into yet
    assert_eq!(
        renderer.render(&mut ctx.device, &mut scene).unwrap(),
        FrameStats::default()
    );
    assert_eq!(ctx.dummy.present_count(), 0);

    renderer.resize(&mut ctx.device, 64, 64).unwrap();
    renderer
        .params_mut()
        .set(GlobalShaderParam::SunColor, Vec4::new(1.0, 0.9, 0.8, 1.0));
    scene.camera_pos = Vec3::new(1.0, 2.0, 3.0);
    scene.items.push(
        RenderItem::new(ctx.device.create_shader_instance(&shader), vertices, indices)
            .with_world(Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0))),
    );

    let stats = renderer.render(&mut ctx.device, &mut scene).unwrap();

    assert_eq!(
        stats,
        FrameStats {
            draw_calls: 1,
            faces: 2
        }
    );
    assert_eq!(ctx.dummy.present_count(), 1);
    let material = &scene.items[0].material;
    assert_eq!(material.parameter("CameraPos"), Some(&[1.0, 2.0, 3.0, 0.0][..]));
    assert_eq!(material.parameter("SunColor"), Some(&[1.0, 0.9, 0.8, 1.0][..]));
    assert_eq!(
        material.parameter("World"),
        Some(&Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)).to_cols_array()[..])
    );

    let commands = ctx.dummy.recorded_commands();
    assert!(commands.iter().any(|command| matches!(
        command,
        GpuCommand::ClearRenderTarget { color, .. } if *color == [1.0; 4]
    )));
    assert!(commands.iter().any(|command| matches!(
        command,
        GpuCommand::ClearDepthStencil { depth, stencil: 0, .. } if *depth == 1.0
    )));
}

#[test]
fn test_scene_renderer_resize() {
    let mut ctx = TestContext::new();
    let shader = create_scene_shader(&ctx);
    let (vertices, indices) = ctx.create_quad();
    let mut renderer = SceneRenderer::new(test_window()).with_clear_color([0.0, 0.0, 0.0, 1.0]);
    let mut scene = RenderScene::new();
    scene.items.push(RenderItem::new(
        ctx.device.create_shader_instance(&shader),
        vertices,
        indices,
    ));

    renderer.resize(&mut ctx.device, 64, 64).unwrap();
    renderer.render(&mut ctx.device, &mut scene).unwrap();
    renderer.resize(&mut ctx.device, 32, 16).unwrap();
    let stats = renderer.render(&mut ctx.device, &mut scene).unwrap();

    assert_eq!(stats.draw_calls, 1);
    assert_eq!(ctx.dummy.present_count(), 2);
    let viewport = renderer.viewport().unwrap();
    assert_eq!((viewport.width(), viewport.height()), (32, 16));
    let depth = renderer.depth_stencil().unwrap();
    assert_eq!((depth.width(), depth.height()), (32, 16));
    // same output formats after the resize
    assert_eq!(ctx.dummy.pipelines_created(), 1);
}
