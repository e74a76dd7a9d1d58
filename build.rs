use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

// Files the default configuration asks for at startup.
const REQUIRED_ASSETS: [&str; 5] = [
    "no map.glb",
    "diffuse-1.jpg",
    "normal-1.jpg",
    "diffuse-2.jpg",
    "normal-2.jpg",
];

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets/*");
    println!("cargo:rerun-if-changed=index.html");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");
    for name in REQUIRED_ASSETS {
        if !assets_src.join(name).exists() {
            println!("cargo:warning=assets/{name} is missing, the viewer will fail to start");
        }
    }

    // Stage the host page next to the assets so OUT_DIR can be served as is.
    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    let mut paths_to_copy = Vec::new();
    if assets_src.exists() {
        paths_to_copy.push(assets_src);
    }
    let page = manifest_dir.join("index.html");
    if page.exists() {
        paths_to_copy.push(page);
    }
    if !paths_to_copy.is_empty() {
        copy_items(&paths_to_copy, out_dir, &copy_options)?;
    }

    Ok(())
}
