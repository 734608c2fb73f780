//! Generates the namespace-URI keyed shadow schema into `$OUT_DIR/shadow.rs`.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;

#[allow(dead_code)]
#[path = "src/schema/mod.rs"]
mod schema;

fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-changed=src/schema");

    let source = schema::generate(schema::descriptors::FEED_SCHEMA, schema::namespaces::NAMESPACES)
        .context("failed to generate the shadow schema")?;

    let out_dir = PathBuf::from(env::var("OUT_DIR").context("OUT_DIR is not set")?);
    let path = out_dir.join("shadow.rs");
    fs::write(&path, source).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}
