#![forbid(unsafe_code)]

/// `embed_migrations!` is a procedural macro and cannot track the files it
/// reads, so editing a migration alone would not trigger a rebuild.
///
/// Emitting `rerun-if-changed` for the migration directory makes cargo
/// rebuild the crate (and re-embed the migrations) whenever that
/// directory changes.
fn main() {
    println!("cargo:rerun-if-changed=./src/migrations");
}
