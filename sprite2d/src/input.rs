use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Tracks keyboard state across frames.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    /// In press order, so handlers see keys the way they were typed.
    keys_pressed: Vec<KeyCode>,
    keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame pressed/released flags.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Handle a keyboard input event from winit.
    pub fn handle_key(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(keycode) = event.physical_key {
            match event.state {
                ElementState::Pressed => self.press(keycode),
                ElementState::Released => self.release(keycode),
            }
        }
    }

    /// Record a key going down. Auto-repeat while held is not a new press.
    pub fn press(&mut self, key: KeyCode) {
        if !self.keys_down.contains(&key) && !self.keys_pressed.contains(&key) {
            self.keys_pressed.push(key);
        }
        self.keys_down.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
        self.keys_released.insert(key);
    }

    /// Returns true if the key is currently held down.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Logical names of the keys pressed this frame, oldest press first.
    pub fn pressed_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.keys_pressed.iter().filter_map(|key| key_name(*key))
    }

    /// Returns true if a key with this logical name was pressed this frame.
    pub fn is_name_pressed(&self, name: &str) -> bool {
        self.pressed_names().any(|n| n == name)
    }
}

/// Logical name for the keys the games listen to.
pub fn key_name(key: KeyCode) -> Option<&'static str> {
    let name = match key {
        KeyCode::ArrowLeft => "Left",
        KeyCode::ArrowRight => "Right",
        KeyCode::ArrowUp => "Up",
        KeyCode::ArrowDown => "Down",
        KeyCode::KeyP => "p",
        KeyCode::KeyS => "s",
        KeyCode::KeyA => "a",
        KeyCode::KeyY => "y",
        KeyCode::KeyN => "n",
        KeyCode::Digit1 | KeyCode::Numpad1 => "1",
        KeyCode::Digit2 | KeyCode::Numpad2 => "2",
        KeyCode::Digit3 | KeyCode::Numpad3 => "3",
        KeyCode::Enter | KeyCode::NumpadEnter => "Return",
        KeyCode::Space => "space",
        KeyCode::Escape => "Escape",
        _ => return None,
    };
    Some(name)
}

/// A logical input action (e.g. "pause", "jump").
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new(name: impl Into<String>) -> Self {
        ActionId(name.into())
    }
}

/// Binds logical actions to one or more keys.
#[derive(Clone, Debug, Default)]
pub struct InputMap {
    actions: HashMap<ActionId, Vec<KeyCode>>,
}

impl InputMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_key(&mut self, action: ActionId, key: KeyCode) {
        self.actions.entry(action).or_default().push(key);
    }

    /// Builder form of [`InputMap::bind_key`].
    #[must_use]
    pub fn with_binding(mut self, action: &str, keys: &[KeyCode]) -> Self {
        for key in keys {
            self.bind_key(ActionId::new(action), *key);
        }
        self
    }

    pub fn action_down(&self, input: &InputState, action: &ActionId) -> bool {
        self.actions
            .get(action)
            .is_some_and(|keys| keys.iter().any(|k| input.is_key_down(*k)))
    }

    pub fn action_pressed(&self, input: &InputState, action: &ActionId) -> bool {
        self.actions
            .get(action)
            .is_some_and(|keys| keys.iter().any(|k| input.is_key_pressed(*k)))
    }

    /// Every bound action pressed this frame.
    pub fn pressed_actions<'a>(
        &'a self,
        input: &'a InputState,
    ) -> impl Iterator<Item = &'a ActionId> + 'a {
        self.actions
            .iter()
            .filter(|(_, keys)| keys.iter().any(|k| input.is_key_pressed(*k)))
            .map(|(action, _)| action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_is_per_frame() {
        let mut input = InputState::new();
        input.press(KeyCode::ArrowLeft);
        assert!(input.is_key_pressed(KeyCode::ArrowLeft));
        assert!(input.is_name_pressed("Left"));

        input.begin_frame();
        input.press(KeyCode::ArrowLeft);
        assert!(!input.is_key_pressed(KeyCode::ArrowLeft));
        assert!(input.is_key_down(KeyCode::ArrowLeft));

        input.release(KeyCode::ArrowLeft);
        assert!(input.is_key_released(KeyCode::ArrowLeft));
        assert!(!input.is_key_down(KeyCode::ArrowLeft));
    }

    #[test]
    fn test_pressed_names_keep_press_order() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyY);
        input.press(KeyCode::ArrowLeft);
        input.press(KeyCode::KeyP);
        assert_eq!(input.pressed_names().collect::<Vec<_>>(), ["y", "Left", "p"]);

        input.begin_frame();
        input.release(KeyCode::KeyY);
        input.press(KeyCode::ArrowRight);
        input.press(KeyCode::KeyY);
        assert_eq!(input.pressed_names().collect::<Vec<_>>(), ["Right", "y"]);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(KeyCode::KeyP), Some("p"));
        assert_eq!(key_name(KeyCode::Numpad2), Some("2"));
        assert_eq!(key_name(KeyCode::Enter), Some("Return"));
        assert_eq!(key_name(KeyCode::F5), None);
    }

    #[test]
    fn test_input_map_actions() {
        let map = InputMap::new().with_binding("pause", &[KeyCode::KeyP, KeyCode::Space]);
        let mut input = InputState::new();
        let pause = ActionId::new("pause");
        assert!(!map.action_pressed(&input, &pause));

        input.press(KeyCode::Space);
        assert!(map.action_pressed(&input, &pause));
        assert!(map.action_down(&input, &pause));
        assert_eq!(map.pressed_actions(&input).count(), 1);
        assert!(!map.action_pressed(&input, &ActionId::new("quit")));
    }
}
