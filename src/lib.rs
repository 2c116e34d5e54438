//! Hoesgen renders batch product images with dimension labels.
//!
//! Given one product photo, a title, and a multi-line list of dimension
//! triples (`width x depth x height`, optionally `/ front-height`), it
//! composites a fixed 500x500 frame per parsed line — contain-scaled photo,
//! auto-fit title banner, draggable label pills — and exports one lossy
//! artifact per record with a deterministic file name.
//!
//! The pipeline is explicitly staged:
//!
//! 1. [`parse_dimensions`] turns raw text into ordered [`DimensionRecord`]s
//! 2. [`Renderer::render`] composites the active record over the shared
//!    [`ProjectState`] into a premultiplied [`Frame`]
//! 3. [`export_all`] walks all records strictly in input order, encoding and
//!    emitting one artifact each into an [`ArtifactSink`]
//!
//! Rendering is deterministic: identical inputs produce byte-identical
//! frames, and the title fit computation shares its text-measurement
//! primitive ([`TextMeasure`]) with the glyph draw path.
#![forbid(unsafe_code)]

pub mod assets;
pub mod encode;
pub mod error;
pub mod export;
pub mod layout;
pub mod model;
pub mod parse;
pub mod render;
pub mod text;

pub use assets::{decode_image, load_image};
pub use encode::{EXPORT_QUALITY, artifact_file_name, encode_jpeg};
pub use error::{HoesgenError, HoesgenResult};
pub use export::{ArtifactSink, DirectorySink, ExportStats, MemorySink, export_all};
pub use layout::{CANVAS_SIZE, PillGeometry, TitleFit, fit_title, label_pill};
pub use model::{
    AnchorPosition, AnchorPositions, DimensionRecord, LabelKind, ProjectState, Rgba8, SourceImage,
};
pub use parse::parse_dimensions;
pub use render::{Frame, Renderer};
pub use text::{TextBrushRgba8, TextEngine, TextMeasure};
