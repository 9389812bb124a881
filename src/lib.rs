pub mod config;
pub mod locales;
pub mod pipeline;
pub mod render;
pub mod rewrite;

pub use config::Config;
pub use locales::{LocaleEntry, LocaleTable};
pub use pipeline::{GeneratedDocument, RenderOptions, generate};
