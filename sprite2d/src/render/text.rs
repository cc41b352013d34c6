use anyhow::Result;
use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, SwashCache,
    TextArea, TextAtlas, TextBounds, TextRenderer, Viewport,
};
use wgpu::{Device, MultisampleState, Queue, RenderPass, TextureFormat};

use crate::{canvas::Anchor, render::frame::TextCommand};

/// Glyphon state for drawing the text of a frame on top of its quads.
pub(crate) struct TextSystem {
    font_system: FontSystem,
    swash_cache: SwashCache,
    atlas: TextAtlas,
    renderer: TextRenderer,
    viewport: Viewport,
}

impl TextSystem {
    pub fn new(device: &Device, queue: &Queue, format: TextureFormat) -> Self {
        let cache = Cache::new(device);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        let renderer = TextRenderer::new(&mut atlas, device, MultisampleState::default(), None);
        let viewport = Viewport::new(device, &cache);
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            atlas,
            renderer,
            viewport,
        }
    }

    /// Shape and upload `texts`.
    ///
    /// Positions are canvas pixels; `scale` converts them to surface pixels.
    pub fn prepare(
        &mut self,
        device: &Device,
        queue: &Queue,
        surface_size: (u32, u32),
        scale: f32,
        texts: &[TextCommand],
    ) -> Result<()> {
        self.viewport.update(
            queue,
            Resolution {
                width: surface_size.0,
                height: surface_size.1,
            },
        );

        let mut shaped = Vec::with_capacity(texts.len());
        for command in texts {
            let mut buffer = Buffer::new(
                &mut self.font_system,
                Metrics::new(command.size, command.size * 1.2),
            );
            let attrs = Attrs::new().family(Family::SansSerif);
            buffer.set_text(&mut self.font_system, &command.text, &attrs, Shaping::Advanced, None);
            buffer.shape_until_scroll(&mut self.font_system, false);

            let (width, height) = measure(&buffer);
            let (left, top) = match command.anchor {
                Anchor::TopLeft => (command.x, command.y),
                Anchor::TopRight => (command.x - width, command.y),
                Anchor::Center => (command.x - width / 2.0, command.y - height / 2.0),
            };
            shaped.push((buffer, left * scale, top * scale, command.color));
        }

        let bounds = TextBounds {
            left: 0,
            top: 0,
            right: surface_size.0 as i32,
            bottom: surface_size.1 as i32,
        };
        let areas = shaped.iter().map(|(buffer, left, top, color)| TextArea {
            buffer,
            left: *left,
            top: *top,
            scale,
            bounds,
            default_color: to_glyphon_color(*color),
            custom_glyphs: &[],
        });

        self.renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.atlas,
            &self.viewport,
            areas,
            &mut self.swash_cache,
        )?;
        Ok(())
    }

    pub fn render(&self, pass: &mut RenderPass<'_>) -> Result<()> {
        self.renderer.render(&self.atlas, &self.viewport, pass)?;
        Ok(())
    }

    /// Drop glyphs not used by the last frame.
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}

/// Unscaled (width, height) of a shaped buffer.
fn measure(buffer: &Buffer) -> (f32, f32) {
    buffer
        .layout_runs()
        .fold((0.0_f32, 0.0_f32), |(width, height), run| {
            (width.max(run.line_w), height + run.line_height)
        })
}

fn to_glyphon_color(color: [f32; 4]) -> Color {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::rgba(
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        channel(color[3]),
    )
}
