use std::io::Write;

use gazette_core::directory::{ADMIN_EXCERPT, CARD_EXCERPT, FEATURED_EXCERPT};
use gazette_core::{ArticleView, FrontPage, LoadReport, MutationOutcome, ReferenceEntry};
use owo_colors::OwoColorize;

pub const EMPTY_MESSAGE: &str = "No articles available";

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn heading(w: &mut dyn Write, text: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", text.bold())
    } else {
        writeln!(w, "{}", text)
    }
}

fn byline(w: &mut dyn Write, view: &ArticleView, color: ColorMode) -> std::io::Result<()> {
    let line = match view.published_on().as_str() {
        "" => format!("{} | {}", view.category, view.author),
        date => format!("{} | {} | {}", view.category, view.author, date),
    };
    if color.enabled() {
        writeln!(w, "  {}", line.dimmed())
    } else {
        writeln!(w, "  {}", line)
    }
}

/// Print the front page: featured article first, then the card grid.
pub fn print_front_page(
    w: &mut dyn Write,
    page: &FrontPage,
    color: ColorMode,
) -> std::io::Result<()> {
    let featured = &page.featured;
    if color.enabled() {
        writeln!(w, "{} {}", "FEATURED".yellow().bold(), featured.title.bold())?;
    } else {
        writeln!(w, "FEATURED {}", featured.title)?;
    }
    byline(w, featured, color)?;
    writeln!(w, "  {}", featured.excerpt(FEATURED_EXCERPT))?;
    if let Some(image) = &featured.image {
        writeln!(w, "  image: {}", image)?;
    }

    for view in &page.rest {
        writeln!(w)?;
        heading(w, &format!("[{}] {}", view.id, view.title), color)?;
        byline(w, view, color)?;
        writeln!(w, "  {}", view.excerpt(CARD_EXCERPT))?;
    }
    Ok(())
}

/// Compact one-line-per-article table, as on the admin screen.
pub fn print_admin_rows(
    w: &mut dyn Write,
    views: &[ArticleView],
    color: ColorMode,
) -> std::io::Result<()> {
    for view in views {
        let id = format!("{:>4}", view.id.as_str());
        if color.enabled() {
            write!(w, "{} ", id.cyan())?;
        } else {
            write!(w, "{} ", id)?;
        }
        writeln!(
            w,
            "{} | {} | {} | {}",
            view.title,
            view.category,
            view.author,
            view.excerpt(ADMIN_EXCERPT)
        )?;
    }
    Ok(())
}

/// Full article body with resolved labels.
pub fn print_detail(w: &mut dyn Write, view: &ArticleView, color: ColorMode) -> std::io::Result<()> {
    heading(w, &view.title, color)?;
    byline(w, view, color)?;
    if let Some(image) = &view.image {
        writeln!(w, "  image: {}", image)?;
    }
    writeln!(w)?;
    writeln!(w, "{}", view.content)?;
    Ok(())
}

/// Selection lists for the form's category and author fields.
pub fn print_options(
    w: &mut dyn Write,
    categories: &[ReferenceEntry],
    authors: &[ReferenceEntry],
    color: ColorMode,
) -> std::io::Result<()> {
    for (title, entries) in [("Categories", categories), ("Authors", authors)] {
        heading(w, title, color)?;
        if entries.is_empty() {
            writeln!(w, "  (none)")?;
        }
        for entry in entries {
            writeln!(w, "  {:>4}  {}", entry.id.as_str(), entry.label)?;
        }
    }
    Ok(())
}

/// Non-fatal load failures, one per line.
pub fn print_load_warnings(
    w: &mut dyn Write,
    report: &LoadReport,
    color: ColorMode,
) -> std::io::Result<()> {
    for failure in &report.failures {
        if color.enabled() {
            writeln!(w, "{} {}", "WARNING:".yellow(), failure.user_message())?;
        } else {
            writeln!(w, "WARNING: {}", failure.user_message())?;
        }
    }
    Ok(())
}

/// Success line for a write, plus any refresh failures that followed it.
pub fn print_outcome(
    w: &mut dyn Write,
    outcome: &MutationOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    let message = match &outcome.article {
        Some(article) => format!("{} (id {})", outcome.message(), article.id),
        None => outcome.message().to_string(),
    };
    if color.enabled() {
        writeln!(w, "{}", message.green())?;
    } else {
        writeln!(w, "{}", message)?;
    }
    print_load_warnings(w, &outcome.refresh, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazette_core::Id;

    fn view(id: &str, content: &str) -> ArticleView {
        ArticleView {
            id: Id::new(id),
            title: format!("Title {id}"),
            content: content.to_string(),
            image: None,
            created_at: None,
            category: "Tech".to_string(),
            author: "Anonymous".to_string(),
        }
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn front_page_plain_text() {
        let page = FrontPage {
            featured: view("1", "Lead story."),
            rest: vec![view("2", &"x".repeat(120))],
        };
        let out = render(|w| print_front_page(w, &page, ColorMode(false)));
        assert!(out.starts_with("FEATURED Title 1\n  Tech | Anonymous\n  Lead story....\n"));
        assert!(out.contains(&format!("  {}...\n", "x".repeat(CARD_EXCERPT))));
    }

    #[test]
    fn admin_rows_use_short_excerpt() {
        let out = render(|w| print_admin_rows(w, &[view("7", &"y".repeat(80))], ColorMode(false)));
        assert_eq!(
            out,
            format!("   7 Title 7 | Tech | Anonymous | {}...\n", "y".repeat(ADMIN_EXCERPT))
        );
    }

    #[test]
    fn options_list_empty_tables() {
        let out = render(|w| print_options(w, &[], &[ReferenceEntry::new(Id::new("2"), "ada")], ColorMode(false)));
        assert_eq!(out, "Categories\n  (none)\nAuthors\n     2  ada\n");
    }
}
