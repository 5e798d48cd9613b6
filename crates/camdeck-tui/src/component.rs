//! Component trait — the building block for every screen.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// Every screen implements Component.
///
/// Lifecycle: `init` → (`on_enter` | `handle_key_event` | `update` | `render`)*
///
/// `on_enter` fires every time the screen becomes active — this is where a
/// screen issues its data fetches, mirroring a view's mount.
pub trait Component: Send {
    /// Called once at startup. Receives the action sender for dispatching
    /// actions (including backend requests) to the app loop.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    /// Called when the screen becomes the active one.
    fn on_enter(&mut self) {}

    /// Handle a keyboard event. Return an Action to dispatch, or None.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Whether an open form/modal on this screen should receive every key
    /// before global shortcuts (so typing is never swallowed).
    fn wants_exclusive_input(&self) -> bool {
        false
    }

    /// Process a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Render into the provided frame area.
    fn render(&self, frame: &mut Frame, area: Rect);

    /// Set focus state.
    fn set_focused(&mut self, _focused: bool) {}

    /// Unique identifier for this component (for logging/debugging).
    #[allow(dead_code)]
    fn id(&self) -> &str;
}
