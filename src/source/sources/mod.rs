/// Delimited-file source.
pub mod csv;
/// Directory-merging delimited source.
pub mod dir;
/// Deterministic synthetic record generator.
pub mod synthetic;
