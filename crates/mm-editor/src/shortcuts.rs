//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Arrow keys
//! follow the left-to-right tree: ← parent, → first child, ↑/↓ siblings.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Structure ──
    AddChild,
    DeleteSelected,
    EditSelected,
    ToggleCollapse,

    // ── Navigation ──
    SelectParent,
    SelectFirstChild,
    SelectPreviousSibling,
    SelectNextSibling,
    Deselect,

    // ── History ──
    Undo,
    Redo,

    // ── View ──
    ZoomIn,
    ZoomOut,
    CenterView,
    AutoAlign,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::CenterView),
                "l" | "L" => Some(ShortcutAction::AutoAlign),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            "Tab" => Some(ShortcutAction::AddChild),
            "Delete" | "Backspace" => Some(ShortcutAction::DeleteSelected),
            "Enter" | "F2" => Some(ShortcutAction::EditSelected),
            " " => Some(ShortcutAction::ToggleCollapse),
            "ArrowLeft" => Some(ShortcutAction::SelectParent),
            "ArrowRight" => Some(ShortcutAction::SelectFirstChild),
            "ArrowUp" => Some(ShortcutAction::SelectPreviousSibling),
            "ArrowDown" => Some(ShortcutAction::SelectNextSibling),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_structure_keys() {
        assert_eq!(
            ShortcutMap::resolve("Tab", false, false, false, false),
            Some(ShortcutAction::AddChild)
        );
        assert_eq!(
            ShortcutMap::resolve("Delete", false, false, false, false),
            Some(ShortcutAction::DeleteSelected)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::DeleteSelected)
        );
        assert_eq!(
            ShortcutMap::resolve("Enter", false, false, false, false),
            Some(ShortcutAction::EditSelected)
        );
        assert_eq!(
            ShortcutMap::resolve("F2", false, false, false, false),
            Some(ShortcutAction::EditSelected)
        );
    }

    #[test]
    fn resolve_navigation() {
        assert_eq!(
            ShortcutMap::resolve("ArrowLeft", false, false, false, false),
            Some(ShortcutAction::SelectParent)
        );
        assert_eq!(
            ShortcutMap::resolve("ArrowRight", false, false, false, false),
            Some(ShortcutAction::SelectFirstChild)
        );
        assert_eq!(
            ShortcutMap::resolve("ArrowUp", false, false, false, false),
            Some(ShortcutAction::SelectPreviousSibling)
        );
        assert_eq!(
            ShortcutMap::resolve("ArrowDown", false, false, false, false),
            Some(ShortcutAction::SelectNextSibling)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Deselect)
        );
    }

    #[test]
    fn resolve_undo_redo() {
        // Cmd+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", false, false, false, true),
            Some(ShortcutAction::Undo)
        );
        // Ctrl+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", true, false, false, false),
            Some(ShortcutAction::Undo)
        );
        // Cmd+Shift+Z → Redo
        assert_eq!(
            ShortcutMap::resolve("Z", false, true, false, true),
            Some(ShortcutAction::Redo)
        );
        // Cmd+Y → Redo
        assert_eq!(
            ShortcutMap::resolve("y", false, false, false, true),
            Some(ShortcutAction::Redo)
        );
    }

    #[test]
    fn resolve_view() {
        assert_eq!(
            ShortcutMap::resolve("=", false, false, false, true),
            Some(ShortcutAction::ZoomIn)
        );
        assert_eq!(
            ShortcutMap::resolve("-", true, false, false, false),
            Some(ShortcutAction::ZoomOut)
        );
        assert_eq!(
            ShortcutMap::resolve("0", false, false, false, true),
            Some(ShortcutAction::CenterView)
        );
        assert_eq!(
            ShortcutMap::resolve("l", false, false, false, true),
            Some(ShortcutAction::AutoAlign)
        );
    }

    #[test]
    fn unbound_keys() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("Tab", false, true, false, false), None);
        // Plain z must not undo.
        assert_eq!(ShortcutMap::resolve("z", false, false, false, false), None);
    }
}
