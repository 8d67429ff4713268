//! Presentation logic of the showreel portfolio site.
//!
//! The browser is reached only through the [`host::Host`] trait, so the
//! scroll engine and navigator run against [`page::HeadlessPage`] (an HTML
//! document laid out without a browser) as well as against a real DOM
//! binding. Content comes from the Directus-style backend through
//! [`content::ContentClient`].

pub mod card;
pub mod content;
pub mod css;
pub mod dom;
pub mod host;
pub mod image;
pub mod layout;
pub mod navigate;
pub mod page;
pub mod scroll;

pub use card::{CardCopy, CardCopyData};
pub use content::{ClientConfig, ContentClient, ContentError};
pub use host::{Environment, Host};
pub use image::{image_url, slider_image_dimensions, slider_image_dimensions_for, ImageOptions};
pub use navigate::{parse_offset, scroll_to_section, ScrollToOptions};
pub use page::HeadlessPage;
pub use scroll::{AnimationDescriptor, EngineConfig, ScrollAnimations};
