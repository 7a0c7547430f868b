//! Interactive multiple-choice selection.
//!
//! # Responsibility
//! - Present a numbered item list on the terminal and read a selection:
//!   individual numbers, ranges, `all`, or `none`/empty.

use crate::error::CliResult;
use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

/// One selectable row: a short display line plus the full identifier.
pub struct MenuItem {
    pub display: String,
    pub id: String,
}

/// Shows the menu and returns the chosen indices, sorted ascending.
pub fn select(title: &str, items: &[MenuItem]) -> CliResult<Vec<usize>> {
    println!();
    println!("{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
    println!();

    for (i, item) in items.iter().enumerate() {
        println!("  [{}] {}", i + 1, item.display);
        println!("      {}", item.id);
        println!();
    }

    println!("{}", "=".repeat(60));
    println!();
    println!("Enter selection:");
    println!("  - Individual numbers: 1, 3, 5");
    println!("  - Ranges: 1-5");
    println!("  - 'all' to select all");
    println!("  - 'none' or empty to skip");
    println!();
    print!("Your selection: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(parse_selection(&input, items.len()))
}

/// Parses a selection string against a list of `len` items. Out-of-range
/// and unparseable parts are reported and dropped, never fatal.
pub fn parse_selection(input: &str, len: usize) -> Vec<usize> {
    let input = input.trim().to_lowercase();
    if input.is_empty() || input == "none" {
        return vec![];
    }
    if input == "all" {
        return (0..len).collect();
    }

    let mut selected = BTreeSet::new();
    for part in input.replace(',', " ").split_whitespace() {
        if let Some((start, end)) = part.split_once('-') {
            match (start.parse::<usize>(), end.parse::<usize>()) {
                (Ok(start), Ok(end)) => {
                    // Clamp so an absurd upper bound does not iterate.
                    for i in start.max(1)..=end.min(len) {
                        selected.insert(i - 1);
                    }
                }
                _ => eprintln!("Warning: invalid range '{part}', skipping"),
            }
        } else {
            match part.parse::<usize>() {
                Ok(i) if (1..=len).contains(&i) => {
                    selected.insert(i - 1);
                }
                Ok(i) => eprintln!("Warning: {i} out of range, skipping"),
                Err(_) => eprintln!("Warning: invalid number '{part}', skipping"),
            }
        }
    }
    selected.into_iter().collect()
}
