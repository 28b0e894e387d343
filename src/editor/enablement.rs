// Command availability - Which menu commands can run right now

use crate::action::ActionManager;
use crate::composition::Composition;
use serde::Serialize;

/// Enabled state of every editor command
///
/// Pulled by the host whenever it refreshes its menus; nothing is pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Availability {
    pub undo: bool,
    pub redo: bool,
    pub cut: bool,
    pub copy: bool,
    pub paste: bool,
    pub select_all: bool,
    pub delete: bool,
    pub group: bool,
    pub ungroup: bool,
    pub change_instrument: bool,
    pub play: bool,
}

impl Availability {
    pub fn compute(composition: &Composition, history: &ActionManager) -> Self {
        let selected = composition.current_selection().len();
        let has_objects = !composition.is_empty();

        Self {
            undo: !history.is_undo_empty(),
            redo: !history.is_redo_empty(),
            cut: selected > 0,
            copy: selected > 0,
            paste: history.has_clipboard_history(),
            select_all: has_objects,
            delete: selected > 0,
            group: selected >= 2,
            ungroup: composition.has_any_gesture_selected(),
            change_instrument: selected > 0,
            play: has_objects,
        }
    }

    /// JSON form for hosts that drive their menus from a script
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Instrument;

    #[test]
    fn test_empty_document() {
        let availability = Availability::compute(&Composition::default(), &ActionManager::new());
        assert_eq!(availability, Availability::default());
    }

    #[test]
    fn test_group_needs_two_objects() {
        let mut composition = Composition::default();
        let a = composition.create_note(0, 60, 100, Instrument::Piano);
        composition.attach(a).unwrap();
        let history = ActionManager::new();

        let availability = Availability::compute(&composition, &history);
        assert!(availability.copy);
        assert!(!availability.group);
        assert!(!availability.ungroup);
        assert!(availability.play);

        let b = composition.create_note(200, 60, 100, Instrument::Piano);
        composition.attach(b).unwrap();
        assert!(Availability::compute(&composition, &history).group);

        composition.group(&[a, b]).unwrap();
        let availability = Availability::compute(&composition, &history);
        assert!(availability.ungroup);
        assert!(!availability.group);
    }

    #[test]
    fn test_json_export() {
        let json = Availability::default().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["paste"], serde_json::Value::Bool(false));
        assert_eq!(value.as_object().unwrap().len(), 11);
    }
}
