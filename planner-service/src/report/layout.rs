//! Page geometry for the report, independent of the PDF engine.
//!
//! All coordinates are millimetres measured from the top-left corner of an A4
//! portrait page; text `y` values are baselines.

use super::font_metrics::{text_width_mm, FontStyle};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 10.0;
pub const PRINTABLE_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f32 = 15.0;
const TITLE_BASELINE: f32 = 17.0;
const TITLE_X_WITH_LOGO: f32 = 34.0;

const LOGO_TOP: f32 = 6.0;
const LOGO_MAX_WIDTH: f32 = 20.0;
const LOGO_MAX_HEIGHT: f32 = 16.0;

const META_SIZE: f32 = 12.0;
const META_BASELINE: f32 = 33.0;
const RULE_GAP: f32 = 3.0;

const BODY_SIZE: f32 = 11.0;
const LINE_HEIGHT: f32 = 6.0;
const BODY_TOP_AFTER_RULE: f32 = 7.0;
const BODY_TOP_CONTINUED: f32 = 34.0;
const BODY_BOTTOM: f32 = 277.0;

const FOOTER_SIZE: f32 = 8.0;
const CAPTION_BASELINE: f32 = 283.0;
const PAGE_NUMBER_BASELINE: f32 = 288.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        /// Set on body lines, which may use the embedded font.
        body: bool,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
    },
    /// Logo box; the image is scaled to fit and anchored at the top-left.
    Logo {
        x: f32,
        top: f32,
        max_width: f32,
        max_height: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub number: usize,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub title: String,
    pub caption: Option<String>,
    pub has_logo: bool,
    /// Multiplier on Helvetica widths for body text. Above 1.0 for embedded
    /// fonts whose metrics are unknown.
    pub body_width_scale: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            caption: None,
            has_logo: false,
            body_width_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub pages: Vec<PageLayout>,
}

impl ReportLayout {
    /// Lay out already-sanitized text.
    pub fn build(body: &str, student_name: &str, topic: &str, options: &LayoutOptions) -> Self {
        let mut builder = Builder {
            options,
            pages: Vec::new(),
            y: 0.0,
        };
        builder.new_page();

        let meta = metadata_line(student_name, topic);
        let meta_lines = wrap(&meta, FontStyle::Bold, META_SIZE, PRINTABLE_WIDTH, 1.0);
        let mut y = META_BASELINE;
        for line in meta_lines {
            builder.push(Item::Text {
                text: line,
                x: MARGIN,
                y,
                size: META_SIZE,
                style: FontStyle::Bold,
                body: false,
            });
            y += LINE_HEIGHT;
        }
        let rule_y = y - LINE_HEIGHT + RULE_GAP;
        builder.push(Item::Rule {
            x1: MARGIN,
            x2: PAGE_WIDTH - MARGIN,
            y: rule_y,
        });
        builder.y = rule_y + BODY_TOP_AFTER_RULE;

        for paragraph in body.split('\n') {
            if paragraph.trim().is_empty() {
                builder.advance();
                continue;
            }
            for line in wrap(
                paragraph,
                FontStyle::Regular,
                BODY_SIZE,
                PRINTABLE_WIDTH,
                options.body_width_scale,
            ) {
                builder.body_line(line);
            }
        }

        ReportLayout {
            pages: builder.pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text items in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| {
            p.items.iter().filter_map(|item| match item {
                Item::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

pub fn metadata_line(student_name: &str, topic: &str) -> String {
    format!("Student: {} | Topic: {}", student_name, topic)
}

struct Builder<'a> {
    options: &'a LayoutOptions,
    pages: Vec<PageLayout>,
    y: f32,
}

impl Builder<'_> {
    fn push(&mut self, item: Item) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    fn new_page(&mut self) {
        let number = self.pages.len() + 1;
        let mut items = Vec::new();

        // Header
        if self.options.has_logo {
            items.push(Item::Logo {
                x: MARGIN,
                top: LOGO_TOP,
                max_width: LOGO_MAX_WIDTH,
                max_height: LOGO_MAX_HEIGHT,
            });
            items.push(title_item(&self.options.title, TITLE_X_WITH_LOGO));
        } else {
            let width = text_width_mm(&self.options.title, FontStyle::Bold, TITLE_SIZE);
            let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
            items.push(title_item(&self.options.title, x));
        }

        // Footer
        if let Some(caption) = self.options.caption.as_deref().filter(|c| !c.is_empty()) {
            items.push(centered(caption, FontStyle::Italic, FOOTER_SIZE, CAPTION_BASELINE));
        }
        items.push(centered(
            &format!("Page {}", number),
            FontStyle::Italic,
            FOOTER_SIZE,
            PAGE_NUMBER_BASELINE,
        ));

        self.pages.push(PageLayout { number, items });
        self.y = BODY_TOP_CONTINUED;
    }

    fn advance(&mut self) {
        self.y += LINE_HEIGHT;
    }

    fn body_line(&mut self, text: String) {
        if self.y > BODY_BOTTOM {
            self.new_page();
        }
        let y = self.y;
        self.push(Item::Text {
            text,
            x: MARGIN,
            y,
            size: BODY_SIZE,
            style: FontStyle::Regular,
            body: true,
        });
        self.advance();
    }
}

fn title_item(title: &str, x: f32) -> Item {
    Item::Text {
        text: title.to_string(),
        x,
        y: TITLE_BASELINE,
        size: TITLE_SIZE,
        style: FontStyle::Bold,
        body: false,
    }
}

fn centered(text: &str, style: FontStyle, size: f32, y: f32) -> Item {
    let width = text_width_mm(text, style, size);
    Item::Text {
        text: text.to_string(),
        x: ((PAGE_WIDTH - width) / 2.0).max(MARGIN),
        y,
        size,
        style,
        body: false,
    }
}

/// Greedy word wrap. Words wider than a full line are split by character.
fn wrap(text: &str, style: FontStyle, size: f32, max_width: f32, scale: f32) -> Vec<String> {
    let fits = |s: &str| text_width_mm(s, style, size) * scale <= max_width;
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if fits(&candidate) {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if fits(word) {
            current = word.to_string();
            continue;
        }

        for c in word.chars() {
            current.push(c);
            if !fits(&current) && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> LayoutOptions {
        LayoutOptions {
            title: "Enrichment Planner Report".into(),
            caption: Some("Confidential".into()),
            ..Default::default()
        }
    }

    fn body_lines(page: &PageLayout) -> Vec<(&str, f32)> {
        page.items
            .iter()
            .filter_map(|item| match item {
                Item::Text {
                    text, y, body: true, ..
                } => Some((text.as_str(), *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_first_page_has_metadata_and_rule() {
        let layout = ReportLayout::build("Body", "Ada", "Sustainable Energy", &options());

        assert_eq!(layout.page_count(), 1);
        assert!(layout.contains_text("Student: Ada | Topic: Sustainable Energy"));
        let page = &layout.pages[0];
        assert!(page.items.iter().any(|i| matches!(i, Item::Rule { .. })));
        assert!(layout.contains_text("Page 1"));
        assert!(layout.contains_text("Confidential"));
    }

    #[test]
    fn test_long_body_continues_on_new_pages_with_header_and_footer() {
        let body = (0..120)
            .map(|i| format!("Line number {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let layout = ReportLayout::build(&body, "Ada", "Energy", &options());

        assert!(layout.page_count() >= 3);
        for page in &layout.pages {
            let texts: Vec<&str> = page
                .items
                .iter()
                .filter_map(|i| match i {
                    Item::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            assert!(texts.contains(&"Enrichment Planner Report"));
            assert!(texts.contains(&format!("Page {}", page.number).as_str()));
            assert!(body_lines(page).iter().all(|(_, y)| *y <= BODY_BOTTOM));
        }

        let metadata_pages = layout
            .pages
            .iter()
            .filter(|p| {
                p.items.iter().any(|i| matches!(i, Item::Text { text, .. } if text.starts_with("Student:")))
            })
            .count();
        assert_eq!(metadata_pages, 1);
        assert!(layout.contains_text("Line number 119"));
    }

    #[test]
    fn test_constant_line_height() {
        let layout = ReportLayout::build("a\nb\nc", "Ada", "Energy", &options());
        let lines = body_lines(&layout.pages[0]);
        assert_eq!(lines.len(), 3);
        assert!((lines[1].1 - lines[0].1 - LINE_HEIGHT).abs() < f32::EPSILON);
        assert!((lines[2].1 - lines[1].1 - LINE_HEIGHT).abs() < f32::EPSILON);
    }

    #[test]
    fn test_wrapped_lines_fit_printable_width() {
        let paragraph = "Analysis of renewable energy sources ".repeat(20);
        let lines = wrap(&paragraph, FontStyle::Regular, BODY_SIZE, PRINTABLE_WIDTH, 1.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, FontStyle::Regular, BODY_SIZE) <= PRINTABLE_WIDTH);
        }
        assert_eq!(lines.join(" "), paragraph.trim_end());
    }

    #[test]
    fn test_overlong_word_is_split() {
        let word = "x".repeat(400);
        let lines = wrap(&word, FontStyle::Regular, BODY_SIZE, PRINTABLE_WIDTH, 1.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_logo_moves_title() {
        let mut opts = options();
        opts.has_logo = true;
        let layout = ReportLayout::build("", "", "", &opts);
        let page = &layout.pages[0];
        assert!(page.items.iter().any(|i| matches!(i, Item::Logo { .. })));
        assert!(page.items.iter().any(
            |i| matches!(i, Item::Text { text, x, .. } if text == "Enrichment Planner Report" && *x == TITLE_X_WITH_LOGO)
        ));
    }
}
