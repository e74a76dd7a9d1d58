#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    model_viewer::flow::run(model_viewer::ViewerConfig::default())
}

// The web build starts from the library's `#[wasm_bindgen(start)]` function.
#[cfg(target_arch = "wasm32")]
fn main() {}
