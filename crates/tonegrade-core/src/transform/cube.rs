//! Adobe/Resolve `.cube` text for 3D LUTs.
//!
//! Only the text format lives here; reading and writing files is left to
//! the caller. Supported keywords: `TITLE`, `LUT_3D_SIZE`, `DOMAIN_MIN`,
//! `DOMAIN_MAX` (must be the unit cube). Comments start with `#`.

use std::fmt::Write as _;

use crate::error::GradeError;
use crate::transform::lut3d::Lut3D;

impl Lut3D {
    /// Serialize as `.cube` text with red varying fastest.
    pub fn to_cube_string(&self, title: &str) -> String {
        let size = self.size();
        let mut out = String::with_capacity(size * size * size * 28 + 64);
        let _ = writeln!(out, "TITLE \"{}\"", title.replace('"', "'"));
        let _ = writeln!(out, "LUT_3D_SIZE {size}");
        let _ = writeln!(out, "DOMAIN_MIN 0.0 0.0 0.0");
        let _ = writeln!(out, "DOMAIN_MAX 1.0 1.0 1.0");
        for rgb in self.data().chunks_exact(3) {
            let _ = writeln!(out, "{:.6} {:.6} {:.6}", rgb[0], rgb[1], rgb[2]);
        }
        out
    }

    /// Parse `.cube` text.
    pub fn parse_cube(text: &str) -> Result<Self, GradeError> {
        let mut size: Option<usize> = None;
        let mut data = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(head) = parts.next() else {
                continue;
            };

            match head {
                "TITLE" => {}
                "LUT_1D_SIZE" => {
                    return Err(cube_error(line_no, "1D .cube files are not supported"));
                }
                "LUT_3D_SIZE" => {
                    let value = parts
                        .next()
                        .and_then(|s| s.parse::<usize>().ok())
                        .ok_or_else(|| cube_error(line_no, "LUT_3D_SIZE needs an integer"))?;
                    if value < 2 {
                        return Err(GradeError::LutSize(value));
                    }
                    size = Some(value);
                }
                "DOMAIN_MIN" | "DOMAIN_MAX" => {
                    let expected = if head == "DOMAIN_MIN" { 0.0 } else { 1.0 };
                    let values = parse_floats(head, parts, line_no)?;
                    if values.iter().any(|v| (v - expected).abs() > 1e-6) {
                        return Err(cube_error(line_no, "only the unit domain is supported"));
                    }
                }
                _ => {
                    let first: f32 = head
                        .parse()
                        .map_err(|_| cube_error(line_no, &format!("unknown keyword `{head}`")))?;
                    let rest = parse_floats(head, parts, line_no)?;
                    if rest.len() != 2 {
                        return Err(cube_error(line_no, "expected three values per row"));
                    }
                    data.extend_from_slice(&[first, rest[0], rest[1]]);
                }
            }
        }

        let size = size.ok_or_else(|| cube_error(0, "missing LUT_3D_SIZE"))?;
        Lut3D::from_data(size, data)
    }
}

fn parse_floats<'a>(
    head: &str,
    parts: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec<f32>, GradeError> {
    parts
        .map(|p| {
            p.parse::<f32>()
                .map_err(|_| cube_error(line, &format!("`{p}` after `{head}` is not a number")))
        })
        .collect()
}

fn cube_error(line: usize, reason: &str) -> GradeError {
    GradeError::Cube {
        line,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_text_roundtrips() {
        let lut = Lut3D::from_fn(5, |[r, g, b]| [g, b * 0.5, 1.0 - r]);
        let text = lut.to_cube_string("swap");
        assert!(text.starts_with("TITLE \"swap\"\nLUT_3D_SIZE 5\n"));

        let parsed = Lut3D::parse_cube(&text).unwrap();
        assert_eq!(parsed.size(), 5);
        for (a, b) in parsed.data().iter().zip(lut.data()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let text = "# made by hand\n\nLUT_3D_SIZE 2\n\
                    0 0 0\n1 0 0\n0 1 0\n1 1 0\n0 0 1\n1 0 1\n0 1 1\n1 1 1 # white\n";
        let lut = Lut3D::parse_cube(text).unwrap();
        assert!(lut.is_identity(1e-6));
    }

    #[test]
    fn test_parse_rejects_short_rows() {
        let err = Lut3D::parse_cube("LUT_3D_SIZE 2\n0 0\n").unwrap_err();
        assert!(matches!(err, GradeError::Cube { line: 2, .. }));
    }

    #[test]
    fn test_parse_rejects_wrong_node_count() {
        let err = Lut3D::parse_cube("LUT_3D_SIZE 2\n0 0 0\n").unwrap_err();
        assert!(matches!(err, GradeError::LutData { expected: 24, len: 3, .. }));
    }

    #[test]
    fn test_parse_requires_size() {
        let err = Lut3D::parse_cube("0 0 0\n").unwrap_err();
        assert!(matches!(err, GradeError::Cube { line: 0, .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_keyword() {
        let err = Lut3D::parse_cube("LUT_3D_SIZE 2\nFOO 1\n").unwrap_err();
        assert!(matches!(err, GradeError::Cube { line: 2, .. }));
    }
}
