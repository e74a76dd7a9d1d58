//! Viewer state: the loaded model, the load status and the UI toggles.
//!
//! Everything here is plain data and runs without a GPU. The event loop feeds
//! it [`LoadEvent`]s and [`Command`]s, and it reports back through a [`Hud`].

use cgmath::{Array, Vector3};
use instant::Instant;

use crate::{
    config::{MaterialParams, ModelTransform, ViewerConfig},
    data_structures::{
        instance::Instance,
        material::{Material, TextureSet},
        scene_graph::{SceneNode, apply_where, count_meshes},
    },
    hud::{Hud, LOADING_COMPLETE, LOADING_FAILED, PanelState, loading_label},
    resources::download::{LoadEvent, LoadStatus, progress_percent},
};

/// A user action from the page's buttons or the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ApplyTextureSet(TextureSet),
    TogglePanel,
}

#[derive(Default)]
pub struct Viewer {
    model: Option<Box<dyn SceneNode>>,
    status: LoadStatus,
    panel: PanelState,
    hide_progress_at: Option<Instant>,
    material: MaterialParams,
    transform: ModelTransform,
    progress_hide_delay: instant::Duration,
}

impl Viewer {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            material: config.material,
            transform: config.model_transform,
            progress_hide_delay: config.progress_hide_delay,
            ..Default::default()
        }
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn model(&self) -> Option<&dyn SceneNode> {
        self.model.as_deref()
    }

    pub fn model_mut(&mut self) -> Option<&mut (dyn SceneNode + 'static)> {
        self.model.as_deref_mut()
    }

    pub fn on_load_event(&mut self, event: LoadEvent, hud: &mut dyn Hud, now: Instant) {
        match event {
            LoadEvent::Progress { loaded, total } => {
                // Without a content length there is nothing sensible to show
                if let Some(percent) = progress_percent(loaded, total) {
                    self.status = LoadStatus::Progress(percent);
                    hud.set_progress(percent, &loading_label(percent));
                }
            }
            LoadEvent::Loaded(model) => self.attach_model(model, hud, now),
            LoadEvent::Failed(e) => {
                log::error!("Error loading model: {e:#}");
                self.status = LoadStatus::Failed(format!("{e:#}"));
                hud.set_status(LOADING_FAILED);
            }
        }
    }

    /// Places `model` in the scene with the primary texture set on every mesh.
    pub fn attach_model(&mut self, mut model: Box<dyn SceneNode>, hud: &mut dyn Hud, now: Instant) {
        let mut root = model.get_local_transform().clone();
        root.position = Vector3::from(self.transform.position);
        root.scale = Vector3::from_value(self.transform.scale);
        model.set_local_transform(root);
        model.update_world_transforms(&Instance::new());

        log::info!(
            "Model {} loaded with {} meshes",
            model.name(),
            count_meshes(model.as_ref())
        );
        self.model = Some(model);
        self.apply_texture_set(TextureSet::Primary);

        self.status = LoadStatus::Loaded;
        hud.set_progress(100, LOADING_COMPLETE);
        self.hide_progress_at = Some(now + self.progress_hide_delay);
    }

    /// Gives every mesh a fresh standard material using `set`.
    ///
    /// Returns the number of meshes changed; without a model this does nothing.
    pub fn apply_texture_set(&mut self, set: TextureSet) -> usize {
        let params = self.material;
        let Some(model) = self.model.as_deref_mut() else {
            log::debug!("No model loaded, ignoring texture set {set:?}");
            return 0;
        };
        let changed = apply_where(
            model,
            |node: &dyn SceneNode| node.is_mesh(),
            |node: &mut dyn SceneNode| node.set_material(Material::standard(&params, set)),
        );
        log::info!("Applied texture set {set:?} to {changed} meshes");
        changed
    }

    pub fn toggle_panel(&mut self, hud: &mut dyn Hud) {
        self.panel.toggle();
        hud.set_panel(&self.panel);
    }

    pub fn execute(&mut self, command: Command, hud: &mut dyn Hud) {
        match command {
            Command::ApplyTextureSet(set) => {
                self.apply_texture_set(set);
            }
            Command::TogglePanel => self.toggle_panel(hud),
        }
    }

    /// Per frame housekeeping: hides the progress bar once its delay ran out.
    pub fn update(&mut self, now: Instant, hud: &mut dyn Hud) {
        if let Some(deadline) = self.hide_progress_at {
            if now >= deadline {
                hud.hide_progress();
                self.hide_progress_at = None;
            }
        }
    }

    pub fn progress_visible(&self) -> bool {
        !matches!(self.status, LoadStatus::Loaded) || self.hide_progress_at.is_some()
    }
}
