//! Frame rendering.
//!
//! Scene nodes describe themselves as a list of [`Instanced`] draws; [`render`]
//! turns that list into one render pass over the surface texture, resolving the
//! multisampled target when antialiasing is on.

use std::iter;

use crate::{
    context::Context,
    data_structures::{
        material::{Side, TextureSet},
        model::{DrawModel, Mesh},
        scene_graph::SceneNode,
    },
};

/// Everything needed to draw one mesh node: its instance buffer, geometry and material.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub meshes: &'a [Mesh],
    pub material: &'a wgpu::BindGroup,
    pub textures: TextureSet,
    pub side: Side,
}

/// Draws `model` (if any) over the clear colour and presents the frame.
pub fn render(ctx: &Context, model: Option<&dyn SceneNode>) -> Result<(), wgpu::SurfaceError> {
    let output = ctx.surface.get_current_texture()?;
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

    let draws = model.map(|model| model.get_render()).unwrap_or_default();

    {
        let (target, resolve_target) = match &ctx.msaa_texture {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.clear_colour),
                    // The multisampled target is only needed until it is resolved
                    store: if resolve_target.is_some() {
                        wgpu::StoreOp::Discard
                    } else {
                        wgpu::StoreOp::Store
                    },
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(1, &ctx.camera.bind_group, &[]);
        render_pass.set_bind_group(2, &ctx.light.bind_group, &[]);

        for draw in draws.iter() {
            render_pass.set_pipeline(ctx.pipelines.for_side(draw.side));
            render_pass.set_bind_group(0, &ctx.textures.get(draw.textures).bind_group, &[]);
            render_pass.set_bind_group(3, draw.material, &[]);
            render_pass.set_vertex_buffer(1, draw.instance.slice(..));
            for mesh in draw.meshes.iter().filter_map(Mesh::gpu) {
                render_pass.draw_mesh(mesh);
            }
        }
    }

    ctx.queue.submit(iter::once(encoder.finish()));
    output.present();
    Ok(())
}
