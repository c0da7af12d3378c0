//! Sampled textures with generated mip chains.
//!
//! [`Texture`] uploads RGBA8 pixel data through a staging buffer, blits the
//! full mip chain on the graphics queue and pairs the image with a
//! [`Sampler`] covering every level.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::buffer::{Buffer, BufferUsage};
use crate::command::CommandPool;
use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::image::{Image, transition_image_layout};
use crate::sampler::Sampler;

/// Sampled 2D texture with a full mip chain.
pub struct Texture {
    image: Image,
    sampler: Sampler,
}

impl Texture {
    /// Uploads tightly packed RGBA8 pixels and generates mips.
    ///
    /// `instance` is needed to verify the format supports linear blits
    /// before mip generation.
    ///
    /// # Errors
    ///
    /// Returns an error if `pixels` does not match `width * height * 4`,
    /// if the format cannot be blitted, or if any Vulkan operation fails.
    pub fn from_rgba8(
        device: Arc<Device>,
        pool: &CommandPool,
        instance: &ash::Instance,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> RhiResult<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RhiError::InvalidHandle(format!(
                "texture data is {} bytes, expected {expected} for {width}x{height} RGBA8",
                pixels.len()
            )));
        }

        let mip_levels = mip_level_count(width, height);
        let format = vk::Format::R8G8B8A8_UNORM;

        let staging = Buffer::new_with_data(device.clone(), BufferUsage::Staging, pixels)?;

        let image = Image::new(
            device.clone(),
            width,
            height,
            mip_levels,
            vk::SampleCountFlags::TYPE_1,
            format,
            vk::ImageUsageFlags::TRANSFER_SRC
                | vk::ImageUsageFlags::TRANSFER_DST
                | vk::ImageUsageFlags::SAMPLED,
            vk::ImageAspectFlags::COLOR,
        )?;

        transition_image_layout(
            pool,
            image.handle(),
            format,
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            mip_levels,
        )?;

        pool.submit_one_time(|cb| {
            let region = vk::BufferImageCopy::default()
                .buffer_offset(0)
                .buffer_row_length(0)
                .buffer_image_height(0)
                .image_subresource(vk::ImageSubresourceLayers {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    mip_level: 0,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
                .image_extent(vk::Extent3D {
                    width,
                    height,
                    depth: 1,
                });

            cb.copy_buffer_to_image(
                staging.handle(),
                image.handle(),
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );
        })?;

        generate_mipmaps(pool, instance, &image, format, width, height, mip_levels)?;

        let sampler = Sampler::new(device, mip_levels)?;

        debug!(width, height, mip_levels, "Texture uploaded");

        Ok(Self { image, sampler })
    }

    /// Returns the shader-visible image view.
    #[inline]
    pub fn view(&self) -> vk::ImageView {
        self.image.view()
    }

    /// Returns the sampler.
    #[inline]
    pub fn sampler(&self) -> vk::Sampler {
        self.sampler.handle()
    }

    /// Returns the number of mip levels.
    #[inline]
    pub fn mip_levels(&self) -> u32 {
        self.image.mip_levels()
    }

    /// Returns the texture extent.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.image.extent()
    }
}

/// Number of mip levels for a `width x height` base image.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Fills mip levels 1.. by repeatedly blitting the previous level at half
/// size, leaving every level in `SHADER_READ_ONLY_OPTIMAL`.
///
/// Requires all levels to already be in `TRANSFER_DST_OPTIMAL`.
fn generate_mipmaps(
    pool: &CommandPool,
    instance: &ash::Instance,
    image: &Image,
    format: vk::Format,
    width: u32,
    height: u32,
    mip_levels: u32,
) -> RhiResult<()> {
    let props = unsafe {
        instance.get_physical_device_format_properties(pool.device().physical_device(), format)
    };
    if !props
        .optimal_tiling_features
        .contains(vk::FormatFeatureFlags::SAMPLED_IMAGE_FILTER_LINEAR)
    {
        return Err(RhiError::NoSupportedFormat(format!(
            "{format:?} does not support linear blitting"
        )));
    }

    pool.submit_one_time(|cb| {
        let subresource = |mip_level: u32| vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: mip_level,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        };

        let mut mip_width = width as i32;
        let mut mip_height = height as i32;

        for level in 1..mip_levels {
            // Previous level becomes the blit source.
            let to_src = vk::ImageMemoryBarrier::default()
                .image(image.handle())
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .subresource_range(subresource(level - 1))
                .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                .new_layout(vk::ImageLayout::TRANSFER_SRC_OPTIMAL)
                .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                .dst_access_mask(vk::AccessFlags::TRANSFER_READ);

            cb.pipeline_barrier(
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::TRANSFER,
                &[to_src],
            );

            let next_width = if mip_width > 1 { mip_width / 2 } else { 1 };
            let next_height = if mip_height > 1 { mip_height / 2 } else { 1 };

            let blit = vk::ImageBlit::default()
                .src_offsets([
                    vk::Offset3D { x: 0, y: 0, z: 0 },
                    vk::Offset3D {
                        x: mip_width,
                        y: mip_height,
                        z: 1,
                    },
                ])
                .src_subresource(vk::ImageSubresourceLayers {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    mip_level: level - 1,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .dst_offsets([
                    vk::Offset3D { x: 0, y: 0, z: 0 },
                    vk::Offset3D {
                        x: next_width,
                        y: next_height,
                        z: 1,
                    },
                ])
                .dst_subresource(vk::ImageSubresourceLayers {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    mip_level: level,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            cb.blit_image(
                image.handle(),
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                image.handle(),
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[blit],
                vk::Filter::LINEAR,
            );

            let to_read = vk::ImageMemoryBarrier::default()
                .image(image.handle())
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .subresource_range(subresource(level - 1))
                .old_layout(vk::ImageLayout::TRANSFER_SRC_OPTIMAL)
                .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                .src_access_mask(vk::AccessFlags::TRANSFER_READ)
                .dst_access_mask(vk::AccessFlags::SHADER_READ);

            cb.pipeline_barrier(
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
                &[to_read],
            );

            mip_width = next_width;
            mip_height = next_height;
        }

        // The last level was only ever a blit destination.
        let last_to_read = vk::ImageMemoryBarrier::default()
            .image(image.handle())
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .subresource_range(subresource(mip_levels - 1))
            .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
            .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
            .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
            .dst_access_mask(vk::AccessFlags::SHADER_READ);

        cb.pipeline_barrier(
            vk::PipelineStageFlags::TRANSFER,
            vk::PipelineStageFlags::FRAGMENT_SHADER,
            &[last_to_read],
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(4, 4), 3);
        assert_eq!(mip_level_count(512, 512), 10);
        assert_eq!(mip_level_count(1024, 512), 11);
        // Non-power-of-two rounds down, plus the base level.
        assert_eq!(mip_level_count(1000, 600), 10);
    }

    #[test]
    fn test_mip_level_count_degenerate() {
        assert_eq!(mip_level_count(0, 0), 1);
    }
}
