#![deny(missing_docs)]
#![doc = "Bidirectional translation between validated configurations and engine macro command sequences."]

/// Macro decoding back into configurations.
pub mod decode;
/// Deterministic macro command emission.
pub mod encode;
/// In-place geometry patching of existing macro files.
pub mod patch;
/// Stage-directory resolution collaborator.
pub mod stage;

pub use decode::{decode_macro, read_macro};
pub use encode::{
    geometry_commands_for, macro_commands, macro_commands_with_lens, output_commands, write_macro,
    DEFAULT_OUTPUT_FILENAME,
};
pub use patch::apply_geometry;
pub use stage::{
    default_macro_path, ensure_stage_directories, write_macro_to_stage, DirectoryResolver,
    StageLayout, DEFAULT_GENERATED_MACRO_FILENAME, MACROS_STAGE_DIR,
    SIMULATED_PHOTONS_STAGE_DIR, TRANSPORT_PHOTONS_STAGE_DIR,
};
