#![allow(dead_code)]

use ayurbot_chat::interfaces::surface::WidgetSurface;
use ayurbot_chat::panel_fsm::PanelView;
use ayurbot_chat::transcript::Message;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Panel(PanelView),
    Append { class: &'static str, html: String },
    ClearInput,
    Scroll,
}

#[derive(Default)]
pub struct RecordingSurface {
    pub events: Vec<SurfaceEvent>,
}

impl RecordingSurface {
    pub fn appended_html(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Append { html, .. } => Some(html.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn panel_views(&self) -> Vec<PanelView> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Panel(view) => Some(*view),
                _ => None,
            })
            .collect()
    }
}

impl WidgetSurface for RecordingSurface {
    fn apply_panel(&mut self, view: &PanelView) {
        self.events.push(SurfaceEvent::Panel(*view));
    }

    fn append_message(&mut self, message: &Message) {
        self.events.push(SurfaceEvent::Append {
            class: message.css_class(),
            html: message.to_html(),
        });
    }

    fn clear_input(&mut self) {
        self.events.push(SurfaceEvent::ClearInput);
    }

    fn scroll_to_bottom(&mut self) {
        self.events.push(SurfaceEvent::Scroll);
    }
}
