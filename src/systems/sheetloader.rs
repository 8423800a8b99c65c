//! Host-side sprite-sheet loading.
//!
//! Drains [`SheetStore`] load requests, reads each image with raylib, uploads
//! it as a texture and reports residency (with the sheet's alpha mask) back to
//! the store. Failures are reported with [`SheetStore::mark_failed`] so the
//! registry can drop the companion.

use std::path::Path;

use bevy_ecs::prelude::*;
use log::{error, info};
use raylib::prelude::*;

use crate::resources::sheetstore::{AlphaMask, SheetInfo, SheetStore};
use crate::resources::texturestore::TextureStore;

/// Alpha mask of a sheet from its row-major pixels.
pub fn alpha_mask_from_colors(width: u32, height: u32, colors: &[Color]) -> AlphaMask {
    AlphaMask::from_alpha(width, height, colors.iter().map(|c| c.a))
}

fn load_sheet(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    path: &Path,
) -> Result<(Texture2D, SheetInfo), String> {
    let path_str = path
        .to_str()
        .ok_or_else(|| format!("Non UTF-8 sheet path {}", path.display()))?;
    let image = Image::load_image(path_str)
        .map_err(|e| format!("Failed to load image {}: {}", path.display(), e))?;
    let (width, height) = (image.width().max(0) as u32, image.height().max(0) as u32);
    let colors = image.get_image_data();
    let alpha = alpha_mask_from_colors(width, height, &colors);
    let texture = rl
        .load_texture_from_image(thread, &image)
        .map_err(|e| format!("Failed to upload texture {}: {}", path.display(), e))?;
    Ok((texture, SheetInfo::new(width, height, alpha)))
}

/// Load every requested sheet. `base_dir` resolves relative image paths.
pub fn load_requested_sheets(
    world: &mut World,
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    base_dir: &Path,
) {
    let requests = world.resource_mut::<SheetStore>().drain_requests();
    for request in requests {
        let path = base_dir.join(&request.image_src);
        match load_sheet(rl, thread, &path) {
            Ok((texture, info)) => {
                info!(
                    "Loaded sprite sheet '{}' ({}x{}) from {}",
                    request.name,
                    info.width,
                    info.height,
                    path.display()
                );
                world.resource_mut::<TextureStore>().insert(request.name.clone(), texture);
                world.resource_mut::<SheetStore>().insert(request.name, info);
            }
            Err(e) => {
                error!("Sprite sheet '{}': {}", request.name, e);
                world.resource_mut::<SheetStore>().mark_failed(request.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_pixels_are_masked() {
        let colors = [Color::new(0, 0, 0, 0), Color::WHITE, Color::new(10, 10, 10, 1), Color::BLANK];
        let mask = alpha_mask_from_colors(2, 2, &colors);
        assert!(!mask.is_opaque(0, 0));
        assert!(mask.is_opaque(1, 0));
        assert!(mask.is_opaque(0, 1));
        assert!(!mask.is_opaque(1, 1));
    }
}
