use anyhow::{Context, Result};
use evdev::{Device, Key as EvKey};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

use crate::constants::{paths, permissions};

/// Logical keys the overlay reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Backtick,
    Tab,
    H,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Delete,
    Control,
    Alt,
    Shift,
}

impl Key {
    pub const ALL: [Key; 11] = [
        Key::Backtick,
        Key::Tab,
        Key::H,
        Key::Digit1,
        Key::Digit2,
        Key::Digit3,
        Key::Digit4,
        Key::Delete,
        Key::Control,
        Key::Alt,
        Key::Shift,
    ];

    /// Physical keys that count as this logical key (either side for modifiers)
    fn scancodes(self) -> &'static [EvKey] {
        match self {
            Key::Backtick => &[EvKey::KEY_GRAVE],
            Key::Tab => &[EvKey::KEY_TAB],
            Key::H => &[EvKey::KEY_H],
            Key::Digit1 => &[EvKey::KEY_1],
            Key::Digit2 => &[EvKey::KEY_2],
            Key::Digit3 => &[EvKey::KEY_3],
            Key::Digit4 => &[EvKey::KEY_4],
            Key::Delete => &[EvKey::KEY_DELETE],
            Key::Control => &[EvKey::KEY_LEFTCTRL, EvKey::KEY_RIGHTCTRL],
            Key::Alt => &[EvKey::KEY_LEFTALT, EvKey::KEY_RIGHTALT],
            Key::Shift => &[EvKey::KEY_LEFTSHIFT, EvKey::KEY_RIGHTSHIFT],
        }
    }
}

/// Synchronous, non-blocking key state query
pub trait KeyPoller {
    fn is_down(&self, key: Key) -> bool;
}

/// Key states captured at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    pressed: HashSet<Key>,
}

impl KeySnapshot {
    pub fn from_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            pressed: keys.into_iter().collect(),
        }
    }
}

impl KeyPoller for KeySnapshot {
    fn is_down(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

/// Keyboards under /dev/input, polled with the kernel's current key-state query
pub struct EvdevKeyboard {
    devices: Vec<Device>,
}

impl EvdevKeyboard {
    pub fn open() -> Result<Self> {
        Ok(Self {
            devices: find_all_keyboard_devices()?,
        })
    }

    /// Read the current state of every logical key across all keyboards
    ///
    /// Devices that stop answering (unplugged) are dropped.
    pub fn sample(&mut self) -> KeySnapshot {
        let mut down: HashSet<EvKey> = HashSet::new();
        self.devices.retain(|device| match device.get_key_state() {
            Ok(state) => {
                down.extend(state.iter());
                true
            }
            Err(e) => {
                warn!(device = ?device.name(), error = %e, "Keyboard stopped responding, dropping it");
                false
            }
        });

        KeySnapshot::from_keys(
            Key::ALL
                .into_iter()
                .filter(|key| key.scancodes().iter().any(|code| down.contains(code))),
        )
    }
}

/// Find all keyboard devices that support Tab key
fn find_all_keyboard_devices() -> Result<Vec<Device>> {
    info!(path = %paths::DEV_INPUT, "Scanning for keyboard devices...");

    let mut devices = Vec::new();

    for entry in std::fs::read_dir(paths::DEV_INPUT)
        .context(format!("Failed to read {} - are you in the '{}' group?", paths::DEV_INPUT, permissions::INPUT_GROUP))?
    {
        let entry = entry?;
        let path = entry.path();

        if let Ok(device) = Device::open(&path) {
            // Tab support indicates a keyboard
            if let Some(keys) = device.supported_keys() {
                if keys.contains(EvKey::KEY_TAB) {
                    info!(device_path = %path.display(), name = ?device.name(), "Found keyboard device");
                    devices.push(device);
                }
            }
        } else {
            debug!(device_path = %path.display(), "Skipping unreadable input device");
        }
    }

    if devices.is_empty() {
        anyhow::bail!(
            "No keyboard device found. Ensure you're in '{}' group:\n\
             {}\n\
             Then log out and back in.",
            permissions::INPUT_GROUP,
            permissions::ADD_TO_INPUT_GROUP
        )
    }

    info!(count = devices.len(), "Polling keyboard device(s)");

    Ok(devices)
}

/// Check if hotkeys are available (user has input group permissions)
pub fn check_permissions() -> bool {
    std::fs::read_dir(paths::DEV_INPUT).is_ok()
}

/// Print helpful error message if permissions missing
pub fn print_permission_error() {
    error!(path = %paths::DEV_INPUT, "Cannot access input devices");
    error!(group = %permissions::INPUT_GROUP, "Hotkeys require group membership");
    error!(command = %permissions::ADD_TO_INPUT_GROUP, "Add user to input group");
    error!("  Then log out and back in");
    warn!(continuing = true, "Continuing without hotkey support...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reports_pressed_keys() {
        let snapshot = KeySnapshot::from_keys([Key::Tab, Key::Shift]);
        assert!(snapshot.is_down(Key::Tab));
        assert!(snapshot.is_down(Key::Shift));
        assert!(!snapshot.is_down(Key::H));
        assert!(!KeySnapshot::default().is_down(Key::Tab));
    }

    #[test]
    fn test_modifiers_accept_either_side() {
        assert!(Key::Control.scancodes().contains(&EvKey::KEY_RIGHTCTRL));
        assert!(Key::Alt.scancodes().contains(&EvKey::KEY_LEFTALT));
        assert!(Key::Shift.scancodes().contains(&EvKey::KEY_RIGHTSHIFT));
        assert_eq!(Key::Backtick.scancodes(), &[EvKey::KEY_GRAVE]);
    }
}
