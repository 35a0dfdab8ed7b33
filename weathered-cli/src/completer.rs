use inquire::{
    CustomUserError,
    autocompletion::{Autocomplete, Replacement},
};
use std::sync::Arc;
use weathered_core::CityAutocomplete;

/// Marks the pseudo-entry that carries the suggestion panel's error text.
pub const ERROR_PREFIX: &str = "! ";

/// Feeds prompt keystrokes into the autocomplete controller and lists whatever
/// its panel currently shows. inquire only asks on input changes, so a fetch
/// that lands after the last keystroke appears on the next one.
#[derive(Debug, Clone)]
pub struct CityCompleter {
    search_bar: Arc<CityAutocomplete>,
    last_input: Option<String>,
}

impl CityCompleter {
    pub fn new(search_bar: Arc<CityAutocomplete>) -> Self {
        Self {
            search_bar,
            last_input: None,
        }
    }
}

impl Autocomplete for CityCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        if self.last_input.as_deref() != Some(input) {
            self.search_bar.on_input(input);
            self.last_input = Some(input.to_owned());
        }

        let view = self.search_bar.view();
        if !view.visible {
            return Ok(Vec::new());
        }

        Ok(match view.error {
            Some(error) => vec![format!("{ERROR_PREFIX}{error}")],
            None => view.suggestions,
        })
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion.filter(|s| !s.starts_with(ERROR_PREFIX)))
    }
}
