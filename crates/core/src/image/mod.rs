//! Image-service URLs for backend file ids.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content::DEFAULT_BASE_URL;
use crate::host::Host;

/// Output format requested from the image service.
pub const OUTPUT_FORMAT: &str = "webp";

/// Below this viewport width the slider is laid out for phones.
pub const SLIDER_BREAKPOINT: f64 = 1200.0;

/// Slider cards are 13rem wide and 17rem tall.
const SLIDER_ASPECT: f64 = 272.0 / 208.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    Contain,
    #[default]
    Cover,
    Crop,
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fit::Contain => "contain",
            Fit::Cover => "cover",
            Fit::Crop => "crop",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceResolution {
    pub width: u32,
    pub height: u32,
    pub ratio: f64,
}

/// Resolution used when no element size is requested. Server and client
/// render the same value so hydrated markup matches.
pub fn device_resolution() -> DeviceResolution {
    DeviceResolution {
        width: 1920,
        height: 1080,
        ratio: 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageOptions {
    /// 0..=100, clamped.
    pub quality: u8,
    pub fit: Fit,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            quality: 80,
            fit: Fit::Cover,
            width: None,
            height: None,
        }
    }
}

impl ImageOptions {
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn fit(mut self, fit: Fit) -> Self {
        self.fit = fit;
        self
    }

    pub fn size(mut self, dimensions: Dimensions) -> Self {
        self.width = Some(dimensions.width);
        self.height = Some(dimensions.height);
        self
    }
}

/// Builds asset URLs against one backend origin.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base_url: String,
}

impl Default for ImageUrls {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ImageUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// URL of `file_id` rendered with `options`; empty when there is no id.
    pub fn url(&self, file_id: &str, options: &ImageOptions) -> String {
        if file_id.is_empty() {
            return String::new();
        }
        let fallback = device_resolution();
        let width = options.width.filter(|w| *w > 0).unwrap_or(fallback.width);
        let height = options.height.filter(|h| *h > 0).unwrap_or(fallback.height);
        format!(
            "{}/assets/{}?width={}&height={}&quality={}&fit={}&format={}",
            self.base_url,
            file_id,
            width,
            height,
            options.quality.min(100),
            options.fit,
            OUTPUT_FORMAT
        )
    }
}

/// [`ImageUrls::url`] against the default backend.
pub fn image_url(file_id: &str, options: &ImageOptions) -> String {
    ImageUrls::default().url(file_id, options)
}

/// Pixel size for slider images at the current viewport width. `None`
/// (no window, server render) yields the desktop size for a 1920px screen.
pub fn slider_image_dimensions(viewport_width: Option<f64>) -> Dimensions {
    let Some(screen) = viewport_width else {
        return Dimensions {
            width: 480,
            height: 627,
        };
    };
    let width = if screen < SLIDER_BREAKPOINT {
        (screen * 0.95).round()
    } else {
        (screen / 4.0).round()
    };
    Dimensions {
        width: width as u32,
        height: (width * SLIDER_ASPECT).round() as u32,
    }
}

/// [`slider_image_dimensions`] at the host's current viewport width.
pub fn slider_image_dimensions_for(host: &dyn Host) -> Dimensions {
    slider_image_dimensions(Some(host.viewport_width()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::HeadlessPage;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_id_has_no_url() {
        assert_eq!(image_url("", &ImageOptions::default()), "");
    }

    #[test]
    fn defaults_use_reference_resolution() {
        let url = image_url("abc", &ImageOptions::default());
        assert_eq!(
            url,
            "https://admin.showsystem.productions/assets/abc?width=1920&height=1080&quality=80&fit=cover&format=webp"
        );
    }

    #[test]
    fn explicit_options_are_embedded() {
        let urls = ImageUrls::new("http://localhost:8055/");
        let url = urls.url(
            "f1",
            &ImageOptions::default()
                .quality(60)
                .fit(Fit::Contain)
                .size(Dimensions {
                    width: 300,
                    height: 392,
                }),
        );
        assert_eq!(
            url,
            "http://localhost:8055/assets/f1?width=300&height=392&quality=60&fit=contain&format=webp"
        );
    }

    #[test]
    fn zero_sizes_fall_back() {
        let opts = ImageOptions {
            width: Some(0),
            ..Default::default()
        };
        assert!(image_url("x", &opts).contains("width=1920&height=1080"));
    }

    #[test]
    fn slider_sizes_follow_breakpoint() {
        assert_eq!(
            slider_image_dimensions(Some(400.0)),
            Dimensions {
                width: 380,
                height: 497
            }
        );
        assert_eq!(
            slider_image_dimensions(Some(1920.0)),
            Dimensions {
                width: 480,
                height: 628
            }
        );
        assert_eq!(
            slider_image_dimensions(None),
            Dimensions {
                width: 480,
                height: 627
            }
        );
    }

    #[test]
    fn slider_sizes_read_the_host_viewport() {
        let mut page = HeadlessPage::parse("<html><body></body></html>", 1000.0, 800.0).unwrap();
        assert_eq!(
            slider_image_dimensions_for(&page),
            Dimensions {
                width: 950,
                height: 1242
            }
        );

        page.resize(1600.0, 900.0).unwrap();
        assert_eq!(slider_image_dimensions_for(&page).width, 400);
    }
}
