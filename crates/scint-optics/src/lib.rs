#![deny(missing_docs)]
#![doc = "Lens prescription parsing and derived optical geometry for the scintillator simulation pipeline."]

mod model;
mod parse;
mod surface;

pub use model::LensModel;
pub use parse::{
    load_lens_models, parse_prescription, parse_prescription_file, resolve_prescription_path,
};
pub use surface::LensSurface;
