//! Layer textures fed from CPU framebuffers.

use crate::raster::Framebuffer;

/// Texture format of every layer. Framebuffer bytes are already in display
/// space, so no sRGB conversion happens on sampling.
pub const LAYER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// One sampled layer texture plus its view.
pub struct LayerTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl LayerTexture {
    pub fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
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
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Copy a framebuffer into the texture.
    ///
    /// Returns `false` without uploading when the sizes differ, which happens
    /// for one frame between a window resize and the layer resize.
    pub fn upload(&self, queue: &wgpu::Queue, framebuffer: &Framebuffer, staging: &mut Vec<u8>) -> bool {
        if framebuffer.width() != self.width || framebuffer.height() != self.height {
            return false;
        }
        framebuffer.premultiplied_rgba8(staging);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            staging,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        true
    }

    /// Upload fully transparent pixels.
    pub fn clear(&self, queue: &wgpu::Queue) {
        let blank = Framebuffer::new(self.width, self.height);
        let mut staging = Vec::new();
        self.upload(queue, &blank, &mut staging);
    }
}
