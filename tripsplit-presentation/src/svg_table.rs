use std::{borrow::Cow, fmt::Write};
use tripsplit_application::Theme;

const FONT_SIZE: u32 = 14;
const CELL_PADDING: u32 = 10;
const ROW_HEIGHT: u32 = FONT_SIZE + CELL_PADDING * 2;
const FONT_FAMILY: &str = "sans-serif";
const CHAR_WIDTH: f32 = 8.5;
const WIDE_CHAR_WIDTH: f32 = 15.0;
const MIN_COLUMN_WIDTH: u32 = 20;

/// Colors used for one rendered table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub header_bg: &'static str,
    pub header_text: &'static str,
    pub row_bg_even: &'static str,
    pub row_bg_odd: &'static str,
    pub row_text: &'static str,
    pub border: &'static str,
}

impl Palette {
    pub const LIGHT: Self = Self {
        background: "#ffffff",
        header_bg: "#4a5568",
        header_text: "#ffffff",
        row_bg_even: "#f7fafc",
        row_bg_odd: "#edf2f7",
        row_text: "#1a202c",
        border: "#cbd5e0",
    };

    pub const DARK: Self = Self {
        background: "#111827",
        header_bg: "#6366f1",
        header_text: "#f9fafb",
        row_bg_even: "#1f2937",
        row_bg_odd: "#273244",
        row_text: "#e5e7eb",
        border: "#374151",
    };

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::LIGHT,
            Theme::Dark => Self::DARK,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::LIGHT
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    fn anchor(self) -> &'static str {
        match self {
            Self::Left => "start",
            Self::Center => "middle",
            Self::Right => "end",
        }
    }

    fn text_x(self, cell_x: u32, cell_width: u32) -> u32 {
        match self {
            Self::Left => cell_x,
            Self::Center => cell_x + cell_width / 2,
            Self::Right => cell_x + cell_width,
        }
    }
}

/// Builds a striped SVG table. Rows shorter than the header are padded with
/// empty cells; extra cells are dropped.
pub struct SvgTableBuilder<'a, Row> {
    headers: &'a [Cow<'a, str>],
    alignments: &'a [Alignment],
    rows: Vec<Row>,
    palette: Palette,
}

impl<Row> Default for SvgTableBuilder<'_, Row> {
    fn default() -> Self {
        Self {
            headers: &[],
            alignments: &[],
            rows: Vec::new(),
            palette: Palette::default(),
        }
    }
}

impl<'a, Row> SvgTableBuilder<'a, Row>
where
    Row: AsRef<[Cow<'a, str>]>,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(mut self, headers: &'a [Cow<'a, str>]) -> Self {
        self.headers = headers;
        self
    }

    pub fn alignments(mut self, alignments: &'a [Alignment]) -> Self {
        self.alignments = alignments;
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn build(self) -> String {
        let column_count = self.headers.len();
        if column_count == 0 {
            return String::new();
        }

        let mut widths: Vec<u32> = self.headers.iter().map(|h| text_width(h)).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row.as_ref()) {
                *width = (*width).max(text_width(cell));
            }
        }

        let total_width = widths.iter().sum::<u32>() + (column_count as u32 + 1) * CELL_PADDING;
        let total_height = ROW_HEIGHT * (1 + self.rows.len() as u32) + 2;
        let palette = self.palette;

        let mut svg = String::with_capacity(1024 + self.rows.len() * 256);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{total_width}" height="{total_height}" viewBox="0 0 {total_width} {total_height}">"#
        );
        let _ = writeln!(
            svg,
            r#"<style>text {{ font-family: {FONT_FAMILY}; font-size: {FONT_SIZE}px; }}</style>"#
        );
        let _ = writeln!(
            svg,
            r#"<rect width="{total_width}" height="{total_height}" fill="{}" rx="4" />"#,
            palette.border
        );
        let _ = writeln!(
            svg,
            r#"<rect x="1" y="1" width="{}" height="{ROW_HEIGHT}" fill="{}" rx="3" />"#,
            total_width - 2,
            palette.header_bg
        );
        self.write_cells(&mut svg, &widths, 0, self.headers, palette.header_text);

        for (idx, row) in self.rows.iter().enumerate() {
            let y = ROW_HEIGHT * (1 + idx as u32) + 1;
            let fill = if idx % 2 == 0 {
                palette.row_bg_even
            } else {
                palette.row_bg_odd
            };
            let _ = writeln!(
                svg,
                r#"<rect x="1" y="{y}" width="{}" height="{ROW_HEIGHT}" fill="{fill}" />"#,
                total_width - 2
            );
            self.write_cells(&mut svg, &widths, y, row.as_ref(), palette.row_text);
        }

        svg.push_str("</svg>");
        svg
    }

    fn write_cells(
        &self,
        svg: &mut String,
        widths: &[u32],
        top: u32,
        cells: &[Cow<'_, str>],
        color: &str,
    ) {
        let baseline = top + ROW_HEIGHT / 2 + FONT_SIZE / 2 - 2;
        let mut x = CELL_PADDING;
        for (idx, width) in widths.iter().enumerate() {
            let alignment = self.alignments.get(idx).copied().unwrap_or_default();
            let text = cells.get(idx).map(|cell| escape_xml(cell)).unwrap_or_default();
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{baseline}" fill="{color}" text-anchor="{}">{text}</text>"#,
                alignment.text_x(x, *width),
                alignment.anchor()
            );
            x += width + CELL_PADDING;
        }
    }
}

fn text_width(text: &str) -> u32 {
    let width: f32 = text
        .chars()
        .map(|c| if c.is_ascii() { CHAR_WIDTH } else { WIDE_CHAR_WIDTH })
        .sum();
    (width.ceil() as u32).max(MIN_COLUMN_WIDTH)
}

pub fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut escaped = String::with_capacity(s.len() + 10);
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Stacks SVG documents top to bottom, centered horizontally, on a
/// `background` canvas. `None` when `svgs` is empty or any document lacks
/// numeric `width`/`height` attributes.
pub fn combine_svgs_vertically(svgs: &[&str], background: &str) -> Option<String> {
    const SPACING: u32 = 20;

    if svgs.is_empty() {
        return None;
    }

    let parts = svgs
        .iter()
        .map(|svg| {
            Some((
                svg_dimension(svg, "width")?,
                svg_dimension(svg, "height")?,
                svg_body(svg)?,
            ))
        })
        .collect::<Option<Vec<_>>>()?;

    let width = parts.iter().map(|(w, _, _)| *w).max().unwrap_or_default() + SPACING * 2;
    let height = parts.iter().map(|(_, h, _)| *h).sum::<u32>() + SPACING * (parts.len() as u32 + 1);

    let mut combined = String::with_capacity(svgs.iter().map(|s| s.len()).sum::<usize>() + 512);
    let _ = writeln!(
        combined,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = writeln!(
        combined,
        r#"<style>text {{ font-family: {FONT_FAMILY}; font-size: {FONT_SIZE}px; }}</style>"#
    );
    let _ = writeln!(
        combined,
        r#"<rect width="{width}" height="{height}" fill="{background}" />"#
    );

    let mut y = SPACING;
    for (part_width, part_height, body) in parts {
        let x = (width - part_width) / 2;
        let _ = writeln!(combined, r#"<g transform="translate({x}, {y})">"#);
        combined.push_str(body.trim());
        combined.push_str("\n</g>\n");
        y += part_height + SPACING;
    }

    combined.push_str("</svg>");
    Some(combined)
}

fn svg_dimension(svg: &str, attr: &str) -> Option<u32> {
    let pattern = format!(" {attr}=\"");
    let start = svg.find(&pattern)? + pattern.len();
    let end = svg[start..].find('"')? + start;
    svg[start..end].parse().ok()
}

/// Inner markup of an SVG document with its `<style>` block removed.
fn svg_body(svg: &str) -> Option<Cow<'_, str>> {
    const STYLE_OPEN: &str = "<style>";
    const STYLE_CLOSE: &str = "</style>";

    let start = svg.find('>')? + 1;
    let end = svg.rfind("</svg>")?;
    let body = svg.get(start..end)?;

    match (body.find(STYLE_OPEN), body.find(STYLE_CLOSE)) {
        (Some(open), Some(close)) if open < close => Some(Cow::Owned(format!(
            "{}{}",
            &body[..open],
            &body[close + STYLE_CLOSE.len()..]
        ))),
        _ => Some(Cow::Borrowed(body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_table(palette: Palette) -> String {
        SvgTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[Cow::Borrowed("Member"), Cow::Borrowed("Balance")])
            .palette(palette)
            .row([Cow::Borrowed("Asha"), Cow::Borrowed("+100.00")])
            .row([Cow::Borrowed("Ben"), Cow::Borrowed("-100.00")])
            .build()
    }

    #[test]
    fn table_contains_every_cell() {
        let svg = sample_table(Palette::LIGHT);

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        for text in ["Member", "Balance", "Asha", "Ben", "+100.00", "-100.00"] {
            assert!(svg.contains(text), "missing {text}");
        }
        assert!(svg.contains(r#"text-anchor="end""#));
    }

    #[rstest]
    #[case::light(Theme::Light, "#f7fafc")]
    #[case::dark(Theme::Dark, "#1f2937")]
    fn table_uses_theme_colors(#[case] theme: Theme, #[case] stripe: &str) {
        let svg = sample_table(Palette::for_theme(theme));

        assert!(svg.contains(stripe));
    }

    #[test]
    fn empty_header_renders_nothing() {
        let svg = SvgTableBuilder::<[Cow<'_, str>; 0]>::new().build();

        assert!(svg.is_empty());
    }

    #[test]
    fn short_rows_are_padded() {
        let svg = SvgTableBuilder::new()
            .headers(&[Cow::Borrowed("From"), Cow::Borrowed("To")])
            .row(vec![Cow::Borrowed("Asha")])
            .build();

        assert_eq!(svg.matches("<text").count(), 4);
    }

    #[rstest]
    #[case::escapes_all("<test & 'value'>", "&lt;test &amp; &#39;value&#39;&gt;")]
    #[case::quotes("\"q\"", "&quot;q&quot;")]
    #[case::keeps_plain("plain", "plain")]
    fn escape_xml_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_xml(input), expected);
    }

    #[test]
    fn combine_stacks_and_centers() {
        let first = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50"><style>x</style><text>First</text></svg>"#;
        let second = r#"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="60"><text>Second</text></svg>"#;

        let combined = combine_svgs_vertically(&[first, second], "#ffffff").expect("combined");

        assert!(combined.contains(r#"width="160""#));
        assert!(combined.contains(r#"height="170""#));
        assert!(combined.contains("translate(30, 20)"));
        assert!(combined.contains("translate(20, 90)"));
        assert!(combined.contains("First"));
        assert!(combined.contains("Second"));
        assert_eq!(combined.matches("<style>").count(), 1);
    }

    #[rstest]
    #[case::empty(&[])]
    #[case::missing_size(&[r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#])]
    fn combine_rejects(#[case] svgs: &[&str]) {
        assert_eq!(combine_svgs_vertically(svgs, "#000000"), None);
    }
}
