use std::path::Path;

use anyhow::{Context, Result};

/// Color used when a texture cannot be loaded.
const FALLBACK_RGBA: [u8; 4] = [128, 128, 128, 255];

/// Decodes an image file to RGBA8.
pub fn load_rgba(path: &Path) -> Result<image::RgbaImage> {
    let img = image::open(path).with_context(|| format!("failed to load texture {}", path.display()))?;
    Ok(img.to_rgba8())
}

/// Like [`load_rgba`], but a missing or unreadable file yields a 1x1 solid
/// image and a warning.
pub fn load_rgba_or_fallback(path: &Path) -> image::RgbaImage {
    match load_rgba(path) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("{e:#}; using a 1x1 fallback");
            image::RgbaImage::from_pixel(1, 1, image::Rgba(FALLBACK_RGBA))
        }
    }
}

/// Sampled sRGB texture with a repeating sampler.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::RgbaImage,
        label: &str,
    ) -> Self {
        let (width, height) = img.dimensions();
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
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
            img.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Loads `path`, falling back to a 1x1 solid texture.
    pub fn from_path(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path, label: &str) -> Self {
        let img = load_rgba_or_fallback(path);
        log::debug!("texture {label}: {}x{} from {}", img.width(), img.height(), path.display());
        Self::from_image(device, queue, &img, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_one_pixel() {
        let img = load_rgba_or_fallback(Path::new("does/not/exist.png"));
        assert_eq!(img.dimensions(), (1, 1));
        assert_eq!(img.get_pixel(0, 0).0, FALLBACK_RGBA);
    }

    #[test]
    fn load_error_names_the_path() {
        let err = load_rgba(Path::new("nowhere/sky.png")).unwrap_err();
        assert!(format!("{err:#}").contains("nowhere/sky.png"));
    }
}
