use crossterm::style::Stylize;
use std::path::Path;

pub fn line(text: &str) {
    println!("{text}");
}

pub fn heading(text: &str) {
    println!("\n{}", text.bold());
}

pub fn success(text: &str) {
    println!("{}", text.green());
}

pub fn warning(text: &str) {
    println!("{}", text.yellow());
}

pub fn error(text: &str) {
    eprintln!("{}", text.trim_end().red());
}

pub fn trace(tag: &str, dir: &Path, command: &str) {
    println!("{} [{}] {}", tag.bold(), dir.display(), command);
}
