use crate::internal::ui::app::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Which part of the screen currently owns the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyBindingContext {
    Global,
    Page,
    SummaryModal,
    CommentModal,
}

/// Maps key events to actions
#[derive(Debug, Clone, Default)]
pub struct KeyBindingMap {
    bindings: HashMap<KeyBindingContext, HashMap<KeyEvent, Action>>,
}

impl KeyBindingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_binding(&mut self, context: KeyBindingContext, key: KeyEvent, action: Action) {
        self.bindings.entry(context).or_default().insert(key, action);
    }

    /// Get the action for a given key event in a specific context.
    /// Context bindings win over global ones.
    pub fn get_action(&self, key: &KeyEvent, context: KeyBindingContext) -> Option<Action> {
        let key = normalize(key);
        self.bindings
            .get(&context)
            .and_then(|map| map.get(&key))
            .or_else(|| {
                self.bindings
                    .get(&KeyBindingContext::Global)
                    .and_then(|map| map.get(&key))
            })
            .cloned()
    }
}

/// Terminal key events carry kind/state noise; only code and modifiers matter.
/// Shift is dropped for characters since the char itself already encodes it.
fn normalize(key: &KeyEvent) -> KeyEvent {
    let modifiers = match key.code {
        KeyCode::Char(_) => key.modifiers.difference(KeyModifiers::SHIFT),
        _ => key.modifiers,
    };
    KeyEvent::new(key.code, modifiers)
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn default_keybindings() -> KeyBindingMap {
    let mut map = KeyBindingMap::new();

    let ctx = KeyBindingContext::Global;
    map.add_binding(ctx, key('?'), Action::ToggleHelp);
    map.add_binding(
        ctx,
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        Action::Quit,
    );

    let ctx = KeyBindingContext::Page;
    map.add_binding(ctx, key('q'), Action::Quit);
    map.add_binding(ctx, key('j'), Action::NavigateDown);
    map.add_binding(ctx, key('k'), Action::NavigateUp);
    map.add_binding(ctx, key_code(KeyCode::Down), Action::NavigateDown);
    map.add_binding(ctx, key_code(KeyCode::Up), Action::NavigateUp);
    map.add_binding(ctx, key_code(KeyCode::Tab), Action::CycleFocus);
    map.add_binding(ctx, key_code(KeyCode::Enter), Action::Activate);
    map.add_binding(ctx, key('s'), Action::RequestSummary);
    map.add_binding(ctx, key('c'), Action::OpenDiscussion);
    map.add_binding(ctx, key('o'), Action::OpenInBrowser);
    map.add_binding(ctx, key('b'), Action::ToggleSidebar);
    map.add_binding(ctx, key('r'), Action::Reload);

    let ctx = KeyBindingContext::SummaryModal;
    map.add_binding(ctx, key('q'), Action::CloseModal);
    map.add_binding(ctx, key_code(KeyCode::Esc), Action::CloseModal);
    map.add_binding(ctx, key_code(KeyCode::Enter), Action::CloseModal);

    let ctx = KeyBindingContext::CommentModal;
    map.add_binding(ctx, key_code(KeyCode::Esc), Action::CloseModal);
    map.add_binding(ctx, key_code(KeyCode::Enter), Action::SubmitComment);
    map.add_binding(ctx, key_code(KeyCode::Backspace), Action::CommentBackspace);

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_specific_binding() {
        let map = default_keybindings();
        assert!(matches!(
            map.get_action(&key('q'), KeyBindingContext::Page),
            Some(Action::Quit)
        ));
        assert!(matches!(
            map.get_action(&key('q'), KeyBindingContext::SummaryModal),
            Some(Action::CloseModal)
        ));
    }

    #[test]
    fn test_global_fallback() {
        let map = default_keybindings();
        assert!(matches!(
            map.get_action(&key('?'), KeyBindingContext::SummaryModal),
            Some(Action::ToggleHelp)
        ));
    }

    #[test]
    fn test_comment_modal_leaves_letters_unbound() {
        let map = default_keybindings();
        assert!(map.get_action(&key('s'), KeyBindingContext::CommentModal).is_none());
        assert!(matches!(
            map.get_action(&key_code(KeyCode::Enter), KeyBindingContext::CommentModal),
            Some(Action::SubmitComment)
        ));
    }

    #[test]
    fn test_shifted_character_matches() {
        let map = default_keybindings();
        let shifted = KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT);
        assert!(matches!(
            map.get_action(&shifted, KeyBindingContext::Page),
            Some(Action::ToggleHelp)
        ));
    }
}
