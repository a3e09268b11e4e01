//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the Scholar CLI.

use owo_colors::OwoColorize;

use crate::types::{PaperRecord, ResearchResponse};

const BANNER: [&str; 5] = [
    r" ____   ____ _   _  ___  _        _    ____  ",
    r"/ ___| / ___| | | |/ _ \| |      / \  |  _ \ ",
    r"\___ \| |   | |_| | | | | |     / _ \ | |_) |",
    r" ___) | |___|  _  | |_| | |___ / ___ \|  _ < ",
    r"|____/ \____|_| |_|\___/|_____/_/   \_\_| \_\",
];

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the Scholar banner
    pub fn banner(&self) {
        println!();
        for (i, line) in BANNER.iter().enumerate() {
            if self.colored {
                if i < 2 {
                    println!("   {}", line.bright_cyan().bold());
                } else {
                    println!("   {}", line.blue().bold());
                }
            } else {
                println!("   {}", line);
            }
        }
        if self.colored {
            println!(
                "\n   {} {}\n",
                "arXiv Research Assistant".bright_white().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!("\n   arXiv Research Assistant v{}\n", env!("CARGO_PKG_VERSION"));
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print one paper with its rank and score
    pub fn paper(&self, rank: usize, paper: &PaperRecord) {
        let score = format!("{:>3}", paper.matching_score);
        let authors = if paper.authors.is_empty() {
            "Unknown authors".to_string()
        } else {
            paper.authors.join(", ")
        };

        if self.colored {
            let score = match paper.matching_score {
                70..=100 => score.green().bold().to_string(),
                40..=69 => score.yellow().bold().to_string(),
                _ => score.red().to_string(),
            };
            println!(
                "\n  {} {} {}",
                format!("{:>2}.", rank).dimmed(),
                score,
                paper.title.bright_white().bold()
            );
            println!("         {}", authors.dimmed());
            println!("         {}", paper.pdf_link.bright_cyan());
            if !paper.summary.is_empty() {
                println!("         {}", paper.summary);
            }
        } else {
            println!("\n  {:>2}. [{}] {}", rank, score, paper.title);
            println!("         {}", authors);
            println!("         {}", paper.pdf_link);
            if !paper.summary.is_empty() {
                println!("         {}", paper.summary);
            }
        }
    }

    /// Print a full research response
    pub fn research_response(&self, response: &ResearchResponse, sort_by_score: bool) {
        self.header(&format!("Results for \"{}\"", response.query));
        if response.papers.is_empty() {
            self.warning("No papers matched this query");
            return;
        }

        for (i, paper) in display_order(&response.papers, sort_by_score)
            .into_iter()
            .enumerate()
        {
            self.paper(i + 1, paper);
        }
        println!();
        self.info(&format!("{} papers", response.papers.len()));
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}

/// Papers in display order. Sorting is stable, so ties keep analyst rank.
pub fn display_order(papers: &[PaperRecord], sort_by_score: bool) -> Vec<&PaperRecord> {
    let mut ordered: Vec<&PaperRecord> = papers.iter().collect();
    if sort_by_score {
        ordered.sort_by(|a, b| b.matching_score.cmp(&a.matching_score));
    }
    ordered
}
