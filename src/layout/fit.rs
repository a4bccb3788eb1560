//! Scaling asset content into an element box.

use crate::dom::Fit;
use crate::geometry::{Align, Region, Size};

/// Where an asset is drawn inside its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentBox {
    /// The scaled asset, centered on the element box. With [`Fit::Cover`]
    /// it may extend past the box.
    pub image: Region,
    /// The part of the element box the asset covers.
    pub visible: Region,
}

/// Scale an asset of `intrinsic` size into `area`.
///
/// Assets without a positive intrinsic size are stretched.
pub fn fit_content(area: Region, intrinsic: Size, fit: Fit) -> ContentBox {
    if !intrinsic.is_positive() || fit == Fit::Stretch {
        return ContentBox {
            image: area,
            visible: area,
        };
    }

    let sx = area.width as f64 / intrinsic.width as f64;
    let sy = area.height as f64 / intrinsic.height as f64;
    let scale = match fit {
        Fit::Contain => sx.min(sy),
        Fit::Cover | Fit::Stretch => sx.max(sy),
    };
    let mut scaled = Size::new(
        (intrinsic.width as f64 * scale).round() as i32,
        (intrinsic.height as f64 * scale).round() as i32,
    );
    if fit == Fit::Contain {
        scaled.width = scaled.width.min(area.width);
        scaled.height = scaled.height.min(area.height);
    }

    let image = area.place(scaled, Align::Center, Align::Center);
    let visible = if fit == Fit::Contain { image } else { area };
    ContentBox { image, visible }
}
