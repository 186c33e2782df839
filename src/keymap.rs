/// What a global key press asks the front-end to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Navigate to the n-th declared state (zero based).
    NavigateTo(usize),
    TogglePause,
    ToggleHud,
    ResetParameters,
}

#[inline]
pub fn state_index_for_digit(key: &str) -> Option<usize> {
    match key {
        "1" => Some(0),
        "2" => Some(1),
        "3" => Some(2),
        "4" => Some(3),
        "5" => Some(4),
        "6" => Some(5),
        "7" => Some(6),
        "8" => Some(7),
        "9" => Some(8),
        _ => None,
    }
}

#[inline]
pub fn action_for_key(key: &str) -> Option<KeyAction> {
    if let Some(i) = state_index_for_digit(key) {
        return Some(KeyAction::NavigateTo(i));
    }
    match key {
        " " => Some(KeyAction::TogglePause),
        "h" | "H" => Some(KeyAction::ToggleHud),
        "0" | "Escape" => Some(KeyAction::ResetParameters),
        _ => None,
    }
}

/// Resolve a navigation index against the declared state names.
pub fn state_for_index<'a>(
    names: impl IntoIterator<Item = &'a str>,
    index: usize,
) -> Option<&'a str> {
    names.into_iter().nth(index)
}
