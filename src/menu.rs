use std::io::{self, Write};

use crate::types::LabelAction;

const EXIT_KEY: &str = "e";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSelection {
    Labels(LabelAction),
    Top100,
}

fn prompt(text: &str) -> Option<String> {
    println!("{text}");
    print!("> ");
    let _ = io::stdout().flush();
    let mut input = String::new();
    io::stdin().read_line(&mut input).ok()?;
    Some(input.trim().to_lowercase())
}

/// Interactive selection; returns `None` when the user exits.
pub fn main_menu() -> Option<MenuSelection> {
    loop {
        let choice = prompt(&format!(
            "###MENU###\n1: Process labels\n2: Process top 100\n{EXIT_KEY}: Exit"
        ))?;
        match choice.as_str() {
            "1" => {
                if let Some(action) = label_menu() {
                    return Some(MenuSelection::Labels(action));
                }
            }
            "2" => return Some(MenuSelection::Top100),
            key if key == EXIT_KEY => return None,
            other => println!("Unknown option: {other}"),
        }
    }
}

fn label_menu() -> Option<LabelAction> {
    loop {
        let choice = prompt(&format!(
            "###LABELS###\n1: Songstats (links + country)\n2: Links (activity + demo email)\n3: Vinyls (merch store)\n{EXIT_KEY}: Back"
        ))?;
        match choice.as_str() {
            "1" => return Some(LabelAction::Songstats),
            "2" => return Some(LabelAction::Links),
            "3" => return Some(LabelAction::Vinyls),
            key if key == EXIT_KEY => return None,
            other => println!("Unknown option: {other}"),
        }
    }
}
