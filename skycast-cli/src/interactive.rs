//! Line-driven dashboard: plain text searches, `:`-prefixed lines are commands.

use std::io::Write;

use skycast_core::{Controller, Key, KeyValueStore, NavKey, Navigation};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::view::TerminalView;

const HELP: &str = "\
Type a city name to search. Commands:
  :here              weather for your position
  :y, :units         toggle metric/imperial
  :x, :theme         toggle light/dark
  :fav               add or remove the shown location from favorites
  :favs              list favorites
  :open N, :rm N     load or remove favorite N
  :close             close the favorites list
  :s TEXT            suggest places matching TEXT
  :down, :up         move through suggestions
  :enter             load the selected suggestion
  :esc               dismiss suggestions or favorites
  :help, :quit";

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Empty,
    Search(String),
    Suggest(String),
    Navigate(NavKey),
    Key(Key),
    Here,
    ToggleFavorite,
    ListFavorites,
    OpenFavorite(usize),
    RemoveFavorite(usize),
    CloseFavorites,
    Help,
    Quit,
    Unknown(String),
}

fn parse(line: &str) -> Action {
    let line = line.trim();
    if line.is_empty() {
        return Action::Empty;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Action::Search(line.to_string());
    };

    let (command, arg) = match rest.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (rest, ""),
    };

    match command {
        "here" => Action::Here,
        "y" | "units" => Action::Key(Key::Char('y')),
        "x" | "theme" => Action::Key(Key::Char('x')),
        "fav" => Action::ToggleFavorite,
        "favs" => Action::ListFavorites,
        "open" => favorite_index(arg)
            .map_or_else(|| Action::Unknown(line.to_string()), Action::OpenFavorite),
        "rm" => favorite_index(arg)
            .map_or_else(|| Action::Unknown(line.to_string()), Action::RemoveFavorite),
        "close" => Action::CloseFavorites,
        "s" | "suggest" => Action::Suggest(arg.to_string()),
        "down" | "j" => Action::Navigate(NavKey::Down),
        "up" | "k" => Action::Navigate(NavKey::Up),
        "enter" => Action::Navigate(NavKey::Enter),
        "esc" => Action::Key(Key::Escape),
        "h" | "help" => Action::Help,
        "q" | "quit" => Action::Quit,
        _ => Action::Unknown(line.to_string()),
    }
}

/// Favorites are numbered from 1 on screen.
fn favorite_index(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok()?.checked_sub(1)
}

pub async fn run<S: KeyValueStore>(
    controller: &mut Controller<S, TerminalView>,
) -> anyhow::Result<()> {
    println!("{HELP}");
    controller.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse(&line) {
            Action::Quit => break,
            action => apply(controller, action).await,
        }
    }

    Ok(())
}

async fn apply<S: KeyValueStore>(controller: &mut Controller<S, TerminalView>, action: Action) {
    match action {
        Action::Empty | Action::Quit => {}
        Action::Search(text) => {
            controller.search_input(&text);
            controller.submit_search().await;
        }
        Action::Suggest(text) => {
            controller.search_input(&text);
            controller.run_suggestions().await;
        }
        Action::Navigate(key) => {
            if controller.suggestion_key(key).await == Navigation::Ignored {
                println!("No suggestion selected");
            }
        }
        Action::Key(key) => controller.handle_key(key).await,
        Action::Here => controller.use_my_location().await,
        Action::ToggleFavorite => {
            if controller.state().displayed().is_none() {
                println!("Nothing to add yet");
                return;
            }
            controller.toggle_favorite();
            if controller.is_favorite() {
                println!("Added to favorites");
            } else {
                println!("Removed from favorites");
            }
        }
        Action::ListFavorites => controller.open_favorites(),
        Action::OpenFavorite(index) => {
            if !controller.select_favorite(index).await {
                println!("No favorite #{}", index + 1);
            }
        }
        Action::RemoveFavorite(index) => {
            if !controller.remove_favorite(index) {
                println!("No favorite #{}", index + 1);
            }
        }
        Action::CloseFavorites => controller.close_favorites(),
        Action::Help => println!("{HELP}"),
        Action::Unknown(line) => println!("Unknown command {line:?}, try :help"),
    }
}
