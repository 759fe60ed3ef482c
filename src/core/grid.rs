use scraper::{ElementRef, Html, Selector};
use std::fmt;
use std::sync::LazyLock;

pub const GRID_SIZE: usize = 9;
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;
pub const PLACEHOLDER: char = '.';
/// Pixel size of one cell in the sudokupad layout.
pub const DEFAULT_CELL_SIZE_PX: f64 = 64.0;

static GIVENS_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("g#cell-givens").expect("valid givens selector"));
static LABEL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("text").expect("valid label selector"));

/// A 9x9 board, row major, `.` for unknown cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: [char; GRID_CELLS],
}

impl Grid {
    pub fn empty() -> Self {
        Self {
            cells: [PLACEHOLDER; GRID_CELLS],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        if row < GRID_SIZE && col < GRID_SIZE {
            Some(self.cells[row * GRID_SIZE + col])
        } else {
            None
        }
    }

    pub fn cells(&self) -> &[char; GRID_CELLS] {
        &self.cells
    }

    pub fn given_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != PLACEHOLDER).count()
    }

    /// No cell was resolved. Callers treat this like a failed scrape.
    pub fn is_blank(&self) -> bool {
        self.given_count() == 0
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.cells {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingCoordinate(&'static str),
    InvalidCoordinate { axis: &'static str, raw: String },
    OutOfRange { row: i64, col: i64 },
    InvalidText(String),
}

/// Result of mapping one `<text>` label onto the board.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelParse {
    Placed { index: usize, value: char },
    Skipped(SkipReason),
}

/// Maps the rendered givens onto a [`Grid`] by their page coordinates.
#[derive(Debug, Clone, Copy)]
pub struct GridExtractor {
    cell_size: f64,
}

impl Default for GridExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE_PX)
    }
}

impl GridExtractor {
    pub fn new(cell_size: f64) -> Self {
        Self { cell_size }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// `None` when the page has no givens container or it holds no labels.
    pub fn extract(&self, markup: &str) -> Option<Grid> {
        let document = Html::parse_document(markup);
        let container = document.select(&GIVENS_SELECTOR).next()?;

        let labels: Vec<ElementRef<'_>> = container.select(&LABEL_SELECTOR).collect();
        if labels.is_empty() {
            return None;
        }

        let mut grid = Grid::empty();
        let mut skipped = 0usize;

        for label in labels {
            let text: String = label.text().collect();
            let parsed = self.parse_label(&text, label.value().attr("x"), label.value().attr("y"));
            match parsed {
                LabelParse::Placed { index, value } => grid.cells[index] = value,
                LabelParse::Skipped(reason) => {
                    tracing::debug!("Skipping label {:?}: {:?}", text.trim(), reason);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} of the rendered labels", skipped);
        }

        Some(grid)
    }

    pub fn parse_label(&self, text: &str, x: Option<&str>, y: Option<&str>) -> LabelParse {
        let col = match self.axis_index("x", x) {
            Ok(col) => col,
            Err(reason) => return LabelParse::Skipped(reason),
        };
        let row = match self.axis_index("y", y) {
            Ok(row) => row,
            Err(reason) => return LabelParse::Skipped(reason),
        };

        let size = GRID_SIZE as i64;
        if !(0..size).contains(&row) || !(0..size).contains(&col) {
            return LabelParse::Skipped(SkipReason::OutOfRange { row, col });
        }

        // 一格只能放一個可見字元，否則字串長度會偏離 81
        let trimmed = text.trim();
        let mut chars = trimmed.chars();
        let value = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_alphanumeric() || c.is_ascii_punctuation() => c,
            _ => return LabelParse::Skipped(SkipReason::InvalidText(trimmed.to_string())),
        };

        LabelParse::Placed {
            index: row as usize * GRID_SIZE + col as usize,
            value,
        }
    }

    fn axis_index(
        &self,
        axis: &'static str,
        raw: Option<&str>,
    ) -> std::result::Result<i64, SkipReason> {
        let raw = raw.ok_or(SkipReason::MissingCoordinate(axis))?;
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| SkipReason::InvalidCoordinate {
                axis,
                raw: raw.to_string(),
            })?;

        let cell = (value / self.cell_size).floor();
        if !cell.is_finite() {
            return Err(SkipReason::InvalidCoordinate {
                axis,
                raw: raw.to_string(),
            });
        }
        // 超出 i64 的值會被飽和轉換，之後一樣落在範圍外
        Ok(cell as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn givens(labels: &str) -> String {
        format!(
            r#"<html><body><div id="board"><svg width="576" height="576">
<g id="cell-colors"></g>
<g id="cell-givens">{}</g>
</svg></div></body></html>"#,
            labels
        )
    }

    #[test]
    fn test_missing_container_is_absent() {
        let extractor = GridExtractor::default();
        let markup = r#"<html><body><svg><g id="cell-values"><text x="10" y="10">5</text></g></svg></body></html>"#;
        assert!(extractor.extract(markup).is_none());
        assert!(extractor.extract("").is_none());
        assert!(extractor.extract("<html><title>Page not found</title></html>").is_none());
    }

    #[test]
    fn test_container_without_labels_is_absent() {
        let extractor = GridExtractor::default();
        assert!(extractor.extract(&givens("")).is_none());
    }

    #[test]
    fn test_out_of_range_label_is_dropped() {
        let extractor = GridExtractor::default();
        let markup = givens(r#"<text x="70" y="10">5</text><text x="400" y="600">9</text>"#);

        let grid = extractor.extract(&markup).unwrap();
        let expected: String = (0..GRID_CELLS)
            .map(|i| if i == 1 { '5' } else { '.' })
            .collect();

        assert_eq!(grid.to_string(), expected);
        assert_eq!(grid.get(0, 1), Some('5'));
        assert_eq!(grid.given_count(), 1);
    }

    #[test]
    fn test_labels_map_by_cell() {
        let extractor = GridExtractor::default();
        let markup = givens(
            r#"<text x="32" y="32"> 1 </text>
<text x="544" y="544">9</text>
<text x="288.5" y="160.25">4</text>"#,
        );

        let grid = extractor.extract(&markup).unwrap();
        assert_eq!(grid.get(0, 0), Some('1'));
        assert_eq!(grid.get(8, 8), Some('9'));
        assert_eq!(grid.get(2, 4), Some('4'));
        assert_eq!(grid.to_string().len(), GRID_CELLS);
    }

    #[test]
    fn test_malformed_labels_do_not_abort_extraction() {
        let extractor = GridExtractor::default();
        let markup = givens(
            r#"<text y="10">1</text>
<text x="abc" y="10">2</text>
<text x="10" y="NaN">3</text>
<text x="80" y="80">  </text>
<text x="150" y="150">12</text>
<text x="-5" y="10">4</text>
<text x="600" y="10">5</text>
<text x="200" y="10">6</text>"#,
        );

        let grid = extractor.extract(&markup).unwrap();
        assert_eq!(grid.given_count(), 1);
        assert_eq!(grid.get(0, 3), Some('6'));
    }

    #[test]
    fn test_all_labels_malformed_gives_blank_grid() {
        let extractor = GridExtractor::default();
        let markup = givens(r#"<text x="900" y="900">7</text>"#);

        let grid = extractor.extract(&markup).unwrap();
        assert!(grid.is_blank());
        assert_eq!(grid.to_string(), ".".repeat(GRID_CELLS));
    }

    #[test]
    fn test_last_write_wins() {
        let extractor = GridExtractor::default();
        let markup = givens(r#"<text x="10" y="10">3</text><text x="20" y="20">8</text>"#);

        let grid = extractor.extract(&markup).unwrap();
        assert_eq!(grid.get(0, 0), Some('8'));
    }

    #[test]
    fn test_custom_cell_size() {
        let extractor = GridExtractor::new(32.0);
        let markup = givens(r#"<text x="70" y="40">2</text>"#);

        let grid = extractor.extract(&markup).unwrap();
        assert_eq!(grid.get(1, 2), Some('2'));
    }

    #[test]
    fn test_invisible_characters_are_not_cell_values() {
        let extractor = GridExtractor::default();
        for invisible in ["\u{200B}", "\u{FEFF}", "\u{00AD}", "\u{0007}"] {
            assert!(matches!(
                extractor.parse_label(invisible, Some("10"), Some("10")),
                LabelParse::Skipped(SkipReason::InvalidText(_))
            ));
        }

        let markup = givens("<text x=\"10\" y=\"10\">\u{200B}</text><text x=\"70\" y=\"10\">?</text>");
        let grid = extractor.extract(&markup).unwrap();
        assert_eq!(grid.get(0, 0), Some(PLACEHOLDER));
        assert_eq!(grid.get(0, 1), Some('?'));
    }

    #[test]
    fn test_parse_label_reports_skip_reason() {
        let extractor = GridExtractor::default();
        assert_eq!(
            extractor.parse_label("5", None, Some("10")),
            LabelParse::Skipped(SkipReason::MissingCoordinate("x"))
        );
        assert_eq!(
            extractor.parse_label("5", Some("10"), Some("576")),
            LabelParse::Skipped(SkipReason::OutOfRange { row: 9, col: 0 })
        );
        assert_eq!(
            extractor.parse_label("5", Some("575.9"), Some(" 0 ")),
            LabelParse::Placed { index: 8, value: '5' }
        );
        assert!(matches!(
            extractor.parse_label("5", Some("inf"), Some("0")),
            LabelParse::Skipped(SkipReason::InvalidCoordinate { axis: "x", .. })
        ));
    }

    #[test]
    fn test_grid_cells_are_placeholder_or_single_visible_char() {
        let extractor = GridExtractor::default();
        let mut labels = String::new();
        for i in 0..GRID_CELLS {
            let (row, col) = (i / GRID_SIZE, i % GRID_SIZE);
            labels.push_str(&format!(
                r#"<text x="{}" y="{}">{}</text>"#,
                col * 64 + 32,
                row * 64 + 32,
                (i % 9) + 1
            ));
        }

        let grid = extractor.extract(&givens(&labels)).unwrap();
        let rendered = grid.to_string();
        assert_eq!(rendered.chars().count(), GRID_CELLS);
        assert!(rendered
            .chars()
            .all(|c| c == PLACEHOLDER || ('1'..='9').contains(&c)));
        assert_eq!(grid.given_count(), GRID_CELLS);
    }
}
