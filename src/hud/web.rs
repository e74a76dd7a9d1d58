//! WASM HUD implementation driving the host page's DOM via web-sys.

use anyhow::Context as _;
use wasm_bindgen::{JsCast, prelude::Closure};
use web_sys::{Document, Element, HtmlElement};
use winit::event_loop::EventLoopProxy;

use super::{Hud, PANEL_OPEN_CLASS, PanelState};
use crate::{
    config::DomIds,
    data_structures::material::TextureSet,
    flow::ViewerEvent,
    viewer::Command,
};

/// Web HUD writing into the elements named by [`DomIds`].
pub struct WebHud {
    progress_bar: Option<HtmlElement>,
    progress_text: Option<Element>,
    progress_container: Option<HtmlElement>,
    settings_button: Option<Element>,
    control_panel: Option<Element>,
}

impl WebHud {
    /// Looks up the HUD elements. Missing elements are logged and skipped.
    pub fn new(ids: &DomIds) -> anyhow::Result<Self> {
        let document = document()?;
        Ok(Self {
            progress_bar: html_element(&document, &ids.progress_bar),
            progress_text: element(&document, &ids.progress_text),
            progress_container: html_element(&document, &ids.progress_container),
            settings_button: element(&document, &ids.settings_button),
            control_panel: element(&document, &ids.control_panel),
        })
    }
}

impl Hud for WebHud {
    fn set_progress(&mut self, percent: u32, label: &str) {
        if let Some(bar) = &self.progress_bar {
            if let Err(e) = bar.style().set_property("width", &format!("{percent}%")) {
                log::warn!("Cannot update the progress bar: {e:?}");
            }
        }
        self.set_status(label);
    }

    fn set_status(&mut self, text: &str) {
        if let Some(label) = &self.progress_text {
            label.set_text_content(Some(text));
        }
    }

    fn hide_progress(&mut self) {
        if let Some(container) = &self.progress_container {
            if let Err(e) = container.style().set_property("display", "none") {
                log::warn!("Cannot hide the progress bar: {e:?}");
            }
        }
    }

    fn set_panel(&mut self, panel: &PanelState) {
        if let Some(control_panel) = &self.control_panel {
            if let Err(e) = control_panel
                .class_list()
                .toggle_with_force(PANEL_OPEN_CLASS, panel.is_open())
            {
                log::warn!("Cannot toggle the control panel: {e:?}");
            }
        }
        if let Some(button) = &self.settings_button {
            button.set_inner_html(panel.icon());
        }
    }
}

/// Wires the page's buttons and the window resize event into the event loop.
///
/// The listeners live as long as the page, so their closures are leaked.
pub fn bind_controls(ids: &DomIds, proxy: EventLoopProxy<ViewerEvent>) -> anyhow::Result<()> {
    let window = web_sys::window().context("no window")?;
    let document = document()?;

    let buttons = [
        (&ids.settings_button, Command::TogglePanel),
        (&ids.texture_buttons[0], Command::ApplyTextureSet(TextureSet::Primary)),
        (&ids.texture_buttons[1], Command::ApplyTextureSet(TextureSet::Alternate)),
    ];
    for (id, command) in buttons {
        let Some(button) = element(&document, id) else {
            continue;
        };
        let proxy = proxy.clone();
        listen(&button, "click", move || {
            if proxy.send_event(ViewerEvent::Command(command)).is_err() {
                log::warn!("Event loop closed, dropping {command:?}");
            }
        })?;
    }

    let container_id = ids.container.clone();
    let resize_document = document.clone();
    listen(&window, "resize", move || {
        let Some((width, height)) = container_size(&resize_document, &container_id) else {
            return;
        };
        if proxy
            .send_event(ViewerEvent::Resize { width, height })
            .is_err()
        {
            log::warn!("Event loop closed, dropping resize");
        }
    })?;

    Ok(())
}

/// Layout size of the element with id `container_id` in CSS pixels. The
/// canvas is not scaled by the device pixel ratio, so this is also the output size.
pub fn container_size(document: &Document, container_id: &str) -> Option<(u32, u32)> {
    let container = html_element(document, container_id)?;
    Some((
        container.offset_width().max(0) as u32,
        container.offset_height().max(0) as u32,
    ))
}

pub fn document() -> anyhow::Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .context("no document")
}

fn listen(
    target: &web_sys::EventTarget,
    event: &str,
    mut handler: impl FnMut() + 'static,
) -> anyhow::Result<()> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| handler());
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|e| anyhow::anyhow!("cannot listen for {event}: {e:?}"))?;
    closure.forget();
    Ok(())
}

fn element(document: &Document, id: &str) -> Option<Element> {
    let element = document.get_element_by_id(id);
    if element.is_none() {
        log::warn!("Element #{id} not found");
    }
    element
}

fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
    element(document, id)?.dyn_into::<HtmlElement>().ok()
}
