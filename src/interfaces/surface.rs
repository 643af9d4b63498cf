use crate::panel_fsm::PanelView;
use crate::transcript::Message;

/// UI side effects the widget drives. Implementations own the actual widgets.
pub trait WidgetSurface {
    fn apply_panel(&mut self, view: &PanelView);
    fn append_message(&mut self, message: &Message);
    fn clear_input(&mut self);
    fn scroll_to_bottom(&mut self);
}
