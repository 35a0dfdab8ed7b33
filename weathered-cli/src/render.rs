use chrono::Local;
use weathered_core::{SuggestionView, UiState, WeatherScreen, autocomplete::MIN_QUERY_CHARS};

pub fn print_screen(screen: &WeatherScreen) {
    if let Some(card) = screen.card() {
        println!("{}", card.title);
        println!("  {}  {}", card.temperature, card.description);
        println!("  Humidity:   {}", card.humidity);
        println!("  Wind:       {}", card.wind);
        println!("  Pressure:   {}", card.pressure);
        println!("  Feels like: {}", card.feels_like);
        if let Some(icon) = &card.icon_url {
            println!("  Icon:       {icon}");
        }
        if let Some(observed) = screen.report.as_ref().and_then(|r| r.observation_time) {
            println!("  Observed:   {}", observed.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
        }
    }

    if let Some(error) = screen.error {
        eprintln!("{error}");
    }

    println!("Background: {}", screen.video);
}

pub fn print_suggestions(view: &SuggestionView) {
    if view.input.trim().chars().count() < MIN_QUERY_CHARS {
        eprintln!("Type at least {MIN_QUERY_CHARS} characters to get suggestions.");
        return;
    }
    if !view.visible {
        eprintln!("No matching cities.");
        return;
    }

    match view.state {
        UiState::ShowingError => {
            if let Some(error) = &view.error {
                eprintln!("{error}");
            }
        }
        _ => {
            for (i, suggestion) in view.suggestions.iter().enumerate() {
                println!("{:>2}. {suggestion}", i + 1);
            }
        }
    }
}

pub fn print_notice(notice: &str) {
    eprintln!("⚠ {notice}");
}
