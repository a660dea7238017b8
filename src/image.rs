//! The reference image and the palette that turns its codes into colors.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Cell code that means "leave this pixel alone".
pub const DEFAULT_SKIP_MARKER: char = ' ';

/// Rectangular grid of single-character color codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    buffer: Vec<Vec<char>>,
    width: usize,
    skip_marker: char,
}

impl ReferenceImage {
    /// Parse one row per line. Short rows are padded with the skip marker.
    pub fn parse(text: &str, skip_marker: char) -> Result<Self> {
        let mut buffer: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.trim_end_matches('\r').chars().collect())
            .collect();
        while buffer.last().map_or(false, |row| row.is_empty()) {
            buffer.pop();
        }
        let width = buffer.iter().map(Vec::len).max().unwrap_or(0);
        if buffer.is_empty() || width == 0 {
            return Err(Error::Config("reference image is empty".into()));
        }
        for row in &mut buffer {
            row.resize(width, skip_marker);
        }
        Ok(Self {
            buffer,
            width,
            skip_marker,
        })
    }

    pub fn load(path: &Path, skip_marker: char) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, skip_marker)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.buffer.len()
    }

    pub fn skip_marker(&self) -> char {
        self.skip_marker
    }

    pub fn get_cell(&self, x: usize, y: usize) -> char {
        self.buffer[y][x]
    }

    fn codes(&self) -> impl Iterator<Item = char> + '_ {
        self.buffer.iter().flatten().copied()
    }
}

/// Fixed mapping from cell code to a concrete color string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: BTreeMap<char, String>,
}

impl Default for Palette {
    fn default() -> Self {
        let colors = [('#', "#000000"), ('.', "#3690EA"), ('*', "#ffffff")]
            .into_iter()
            .map(|(code, color)| (code, color.to_string()))
            .collect();
        Self { colors }
    }
}

impl Palette {
    pub fn new(colors: BTreeMap<char, String>) -> Self {
        Self { colors }
    }

    /// Build a palette from string keys, as they come out of a TOML table.
    pub fn from_table(table: &BTreeMap<String, String>) -> Result<Self> {
        let mut colors = BTreeMap::new();
        for (key, color) in table {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(code), None) => {
                    colors.insert(code, color.clone());
                }
                _ => {
                    return Err(Error::Config(format!(
                        "palette key {key:?} must be a single character"
                    )))
                }
            }
        }
        Ok(Self { colors })
    }

    pub fn color(&self, code: char) -> Option<&str> {
        self.colors.get(&code).map(String::as_str)
    }

    /// Resolve every cell of `image` to a color, failing on the first code
    /// the palette doesn't know.
    pub fn resolve(&self, image: &ReferenceImage) -> Result<Target> {
        if let Some(code) = image
            .codes()
            .find(|&code| code != image.skip_marker() && self.color(code).is_none())
        {
            return Err(Error::Config(format!(
                "image code {code:?} has no palette entry"
            )));
        }
        let cells = image
            .buffer
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&code| {
                        if code == image.skip_marker() {
                            None
                        } else {
                            self.color(code).map(str::to_string)
                        }
                    })
                    .collect()
            })
            .collect();
        Ok(Target {
            cells,
            width: image.width(),
        })
    }
}

/// A reference image with every cell already mapped through the palette.
/// `None` cells are transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    cells: Vec<Vec<Option<String>>>,
    width: usize,
}

impl Target {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<&str> {
        self.cells[y][x].as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pads_short_rows() {
        let image = ReferenceImage::parse("##\n#\n.*.\n", ' ').unwrap();
        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 3);
        assert_eq!(image.get_cell(2, 0), ' ');
        assert_eq!(image.get_cell(1, 1), ' ');
        assert_eq!(image.get_cell(1, 2), '*');
    }

    #[test]
    fn parse_strips_carriage_returns() {
        let image = ReferenceImage::parse("#.\r\n.#\r\n", ' ').unwrap();
        assert_eq!(image.width(), 2);
        assert_eq!(image.get_cell(1, 0), '.');
    }

    #[test]
    fn parse_rejects_empty_image() {
        assert!(matches!(
            ReferenceImage::parse("\n\n", ' '),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn resolve_maps_codes_and_skips() {
        let image = ReferenceImage::parse("# \n.*", ' ').unwrap();
        let target = Palette::default().resolve(&image).unwrap();
        assert_eq!(target.color_at(0, 0), Some("#000000"));
        assert_eq!(target.color_at(1, 0), None);
        assert_eq!(target.color_at(0, 1), Some("#3690EA"));
        assert_eq!(target.color_at(1, 1), Some("#ffffff"));
    }

    #[test]
    fn resolve_rejects_unknown_code() {
        let image = ReferenceImage::parse("#x", ' ').unwrap();
        let err = Palette::default().resolve(&image).unwrap_err();
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn custom_skip_marker_is_transparent() {
        let image = ReferenceImage::parse("_#", '_').unwrap();
        let target = Palette::default().resolve(&image).unwrap();
        assert_eq!(target.color_at(0, 0), None);
    }

    #[test]
    fn from_table_rejects_long_keys() {
        let mut table = BTreeMap::new();
        table.insert("ab".to_string(), "#000000".to_string());
        assert!(Palette::from_table(&table).is_err());

        let mut table = BTreeMap::new();
        table.insert("r".to_string(), "#ff0000".to_string());
        let palette = Palette::from_table(&table).unwrap();
        assert_eq!(palette.color('r'), Some("#ff0000"));
    }
}
