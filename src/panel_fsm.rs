use rust_fsm::*;

state_machine! {
    panel_flow(Collapsed)

    Collapsed(HydrateExpanded) => Expanded,
    Collapsed(HydrateMaximized) => ExpandedMaximized,

    Collapsed(ToggleOpen) => Expanded,
    Expanded(ToggleOpen) => Collapsed,
    ExpandedMaximized(ToggleOpen) => Collapsed,

    Expanded(ToggleMaximize) => ExpandedMaximized,
    ExpandedMaximized(ToggleMaximize) => Expanded
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Collapsed,
    Expanded,
    ExpandedMaximized,
}

impl PanelState {
    pub fn is_open(self) -> bool {
        !matches!(self, PanelState::Collapsed)
    }

    pub fn is_maximized(self) -> bool {
        matches!(self, PanelState::ExpandedMaximized)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAction {
    /// Header click: open a collapsed panel, close an open one.
    ToggleOpen,
    ToggleMaximize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderIcon {
    ChevronUp,
    ChevronDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaximizeIcon {
    Expand,
    Compress,
}

/// Display attributes a surface applies for a given panel state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelView {
    pub body_visible: bool,
    pub header_icon: HeaderIcon,
    pub maximize_icon: MaximizeIcon,
    pub maximized: bool,
}

fn hydrate(machine: &mut panel_flow::StateMachine, state: PanelState) -> Result<(), ()> {
    let input = match state {
        PanelState::Collapsed => return Ok(()),
        PanelState::Expanded => panel_flow::Input::HydrateExpanded,
        PanelState::ExpandedMaximized => panel_flow::Input::HydrateMaximized,
    };
    machine.consume(&input).map_err(|_| ())?;
    Ok(())
}

fn expected_next_state(current: PanelState, action: PanelAction) -> Option<PanelState> {
    match (current, action) {
        (PanelState::Collapsed, PanelAction::ToggleOpen) => Some(PanelState::Expanded),
        (PanelState::Expanded, PanelAction::ToggleOpen) => Some(PanelState::Collapsed),
        (PanelState::ExpandedMaximized, PanelAction::ToggleOpen) => Some(PanelState::Collapsed),
        (PanelState::Expanded, PanelAction::ToggleMaximize) => {
            Some(PanelState::ExpandedMaximized)
        }
        (PanelState::ExpandedMaximized, PanelAction::ToggleMaximize) => {
            Some(PanelState::Expanded)
        }
        _ => None,
    }
}

/// Returns the next state, or `None` when `action` is not a transition from `current`.
pub fn transition(current: PanelState, action: PanelAction) -> Option<PanelState> {
    let mut machine = panel_flow::StateMachine::new();
    hydrate(&mut machine, current).ok()?;

    let input = match action {
        PanelAction::ToggleOpen => panel_flow::Input::ToggleOpen,
        PanelAction::ToggleMaximize => panel_flow::Input::ToggleMaximize,
    };

    machine.consume(&input).ok()?;
    expected_next_state(current, action)
}

/// Like [`transition`], but an impossible action leaves the state unchanged.
pub fn apply(current: PanelState, action: PanelAction) -> PanelState {
    transition(current, action).unwrap_or(current)
}

pub fn render(state: PanelState) -> PanelView {
    PanelView {
        body_visible: state.is_open(),
        header_icon: if state.is_open() {
            HeaderIcon::ChevronDown
        } else {
            HeaderIcon::ChevronUp
        },
        maximize_icon: if state.is_maximized() {
            MaximizeIcon::Compress
        } else {
            MaximizeIcon::Expand
        },
        maximized: state.is_maximized(),
    }
}
