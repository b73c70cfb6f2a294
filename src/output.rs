//! Terminal presentation helpers

use colored::Colorize;

use crate::models::deployment::DeploymentState;

/// Render a state with the conventional color for it
pub fn color_state(state: DeploymentState) -> String {
    let name = state.as_str();
    match state {
        DeploymentState::Queued | DeploymentState::Pending => name.cyan().to_string(),
        DeploymentState::InProgress => name.yellow().to_string(),
        DeploymentState::Success => name.green().to_string(),
        DeploymentState::Failure | DeploymentState::Error => name.bright_red().to_string(),
        DeploymentState::Inactive | DeploymentState::Unknown => name.blue().to_string(),
    }
}

pub fn color_unknown(s: &str) -> String {
    s.blue().to_string()
}

pub fn print_info(s: &str) {
    println!("{}", s.cyan());
}

pub fn print_success(s: &str) {
    println!("{}", s.green());
}

pub fn print_warning(s: &str) {
    println!("{}", s.yellow());
}

pub fn print_error(s: &str) {
    eprintln!("{}", s.red());
}

/// Shorten 40-hex SHAs to 7 characters; symbolic refs pass through
pub fn short_sha(git_ref: &str) -> &str {
    let is_full_sha = git_ref.len() == 40
        && git_ref
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if is_full_sha {
        &git_ref[..7]
    } else {
        git_ref
    }
}

/// Yes/no/unknown rendering for tri-state flags
pub fn bool_str(value: Option<bool>) -> String {
    match value {
        Some(true) => "yes".green().to_string(),
        Some(false) => "no".red().to_string(),
        None => color_unknown("unknown"),
    }
}

/// Compact "how long ago" rendering for status ages
pub fn human_age(age: chrono::Duration) -> String {
    let secs = age.num_seconds().max(0);
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86400)
    }
}

/// Ask the operator a yes/no question on stdin
pub fn confirm(question: &str) -> Result<bool, std::io::Error> {
    use std::io::Write;

    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Ask the operator for a value on stdin, falling back to a default
pub fn prompt(question: &str, default: Option<&str>) -> Result<String, std::io::Error> {
    use std::io::Write;

    match default {
        Some(default) => print!("{} [{}]: ", question, default),
        None => print!("{}: ", question),
    }
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    let answer = answer.trim();
    if answer.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(answer.to_string())
    }
}

/// Minimal column-aligned table writer
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| display_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(display_width(cell));
            }
        }

        let mut out = String::new();
        render_line(&mut out, &self.headers, &widths);
        let separators: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        render_line(&mut out, &separators, &widths);
        for row in &self.rows {
            render_line(&mut out, row, &widths);
        }
        out
    }
}

fn render_line(out: &mut String, cells: &[String], widths: &[usize]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        // Pad by display width so colored cells line up
        if i < cells.len() - 1 {
            let padding = widths[i].saturating_sub(display_width(cell));
            out.extend(std::iter::repeat(' ').take(padding));
        }
    }
    out.push('\n');
}

/// Printable width of a string, ignoring ANSI color escapes
fn display_width(s: &str) -> usize {
    let mut width = 0;
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}
