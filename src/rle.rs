use anyhow::Context;
use anyhow::bail;
use tracing::debug;

use crate::parse_util;
use crate::parse_util::ParseResult;
use crate::rules;

/// Largest width or height of a pattern without a header line.
pub const MAX_EXTENT: usize = 1 << 16;

#[derive(Debug, Default)]
pub struct RleFile<'a> {
    pub name: Option<&'a [u8]>,

    /// Bounding box announced by the header line, as `(width, height)`
    pub size: Option<(usize, usize)>,
}

/// Parse the RLE file format. Assumes the bytes are valid Ascii.
///
/// `f` is called with the `(row, col)` of every alive cell, relative to the top left corner of the
/// pattern. Rules other than B3/S23 are refused.
///
/// See: https://conwaylife.com/wiki/Run_Length_Encoded
pub fn read_rle<F>(mut bytes: &[u8], f: F) -> ParseResult<RleFile<'_>>
where
    F: FnMut(usize, usize),
{
    let mut file = RleFile::default();

    // Parse as many comment lines as possible
    loop {
        bytes = parse_util::take_ws(bytes);

        let Some(b'#') = parse_util::peek_1(bytes) else {
            break;
        };

        let (line, rest) = parse_util::take_line(bytes);

        match read_line_comment(line).context("Failed to read comment line")? {
            RleCommentLine::Comment => {}
            RleCommentLine::Name { name } => {
                if file.name.is_some() {
                    bail!("Rle file name already defined")
                }

                file.name = Some(name);
            }
        }

        bytes = rest;
    }

    // Parse header line, if it's present
    if let Some(b'x' | b'X') = parse_util::peek_1(bytes) {
        let (line, rest) = parse_util::take_line(bytes);

        file.size = Some(read_line_header(line).context("Failed to read header line")?);
        bytes = rest;
    }

    let bounds = file.size.unwrap_or((MAX_EXTENT, MAX_EXTENT));
    read_encoding(bytes, bounds, f).context("Failed to read encoding")?;

    debug!(
        name = ?file.name.map(String::from_utf8_lossy),
        size = ?file.size,
        "Read RLE pattern"
    );

    Ok(file)
}

enum RleCommentLine<'a> {
    Comment,
    Name { name: &'a [u8] },
}

/// Parse a single `#` line, without its linebreak.
fn read_line_comment(line: &[u8]) -> ParseResult<RleCommentLine<'_>> {
    let line = parse_util::expect(b'#', line)?;

    let (Some(b), line) = parse_util::take_1(line) else {
        bail!("No comment type");
    };

    let text = line.trim_ascii();

    match b {
        b'C' | b'c' => Ok(RleCommentLine::Comment),

        b'N' => {
            if text.is_empty() {
                bail!("Empty name line")
            }

            Ok(RleCommentLine::Name { name: text })
        }

        // Authorship is not kept. Offsets only make sense on an unbounded plane, patterns get
        // placed explicitly.
        b'O' | b'P' | b'R' => Ok(RleCommentLine::Comment),

        b'r' => {
            check_rule(text)?;

            Ok(RleCommentLine::Comment)
        }

        b => {
            bail!("Unrecognized comment type '{}'", b as char)
        }
    }
}

fn check_rule(rule: &[u8]) -> ParseResult<()> {
    let Ok(rule) = std::str::from_utf8(rule) else {
        bail!("Failed to convert rule to utf-8")
    };

    if !rules::is_life_rule(rule) {
        bail!("Unsupported rule \"{}\", only B3/S23 is supported", rule.trim())
    }

    Ok(())
}

/// Parse `x = <width>, y = <height>[, rule = <rule>]`.
fn read_line_header(line: &[u8]) -> ParseResult<(usize, usize)> {
    let (width, line) = read_dimension(b'x', line).context("Failed to parse width")?;
    let (height, line) = read_dimension(b'y', line).context("Failed to parse height")?;

    let line = parse_util::take_ws(line);
    if line.is_empty() {
        return Ok((width, height));
    }

    let line = parse_util::expect_slice(b"rule", line)?;
    let line = parse_util::take_ws(line);
    let line = parse_util::expect(b'=', line)?;

    check_rule(line)?;

    Ok((width, height))
}

/// Parse `<axis> = <n>` followed by an optional `,`.
fn read_dimension(axis: u8, line: &[u8]) -> ParseResult<(usize, &[u8])> {
    let line = parse_util::take_ws(line);
    let line = parse_util::expect_slice(&[axis], line)?;
    let line = parse_util::take_ws(line);
    let line = parse_util::expect(b'=', line)?;

    let (Some(n), line) = parse_util::take_with(b',', line) else {
        bail!("Expected a number, found end of input")
    };

    Ok((parse_util::convert(n)?, line))
}

/// Read the cells of the pattern. Every run must stay within `(width, height)`.
fn read_encoding<F>(mut bytes: &[u8], (width, height): (usize, usize), mut f: F) -> ParseResult<()>
where
    F: FnMut(usize, usize),
{
    let mut rep: usize = 1;

    let (mut row, mut col) = (0, 0);

    // Column right after a run of `rep` cells, if the run fits in a row
    let run_end = |col: usize, rep: usize| col.checked_add(rep).filter(|&end| end <= width);

    loop {
        let Some(b) = parse_util::peek_1(bytes) else {
            bail!("Unexpected end of input")
        };

        match b {
            w if w.is_ascii_whitespace() => {
                bytes = &bytes[1..];
            }

            // End of input
            b'!' => break,

            // Dead cell
            b'b' => {
                bytes = &bytes[1..];

                let Some(end) = run_end(col, rep) else {
                    bail!("Run of {rep} dead cells at column {col} is wider than {width}")
                };

                col = end;
                rep = 1;
            }

            // Live cell
            b'o' => {
                bytes = &bytes[1..];

                if row >= height {
                    bail!("Live cells on row {row}, but the pattern is {height} rows high")
                }

                let Some(end) = run_end(col, rep) else {
                    bail!("Run of {rep} live cells at column {col} is wider than {width}")
                };

                for col in col..end {
                    f(row, col)
                }

                col = end;
                rep = 1;
            }

            // End of line
            b'$' => {
                bytes = &bytes[1..];

                let Some(next) = row.checked_add(rep) else {
                    bail!("Run of {rep} line ends overflows")
                };

                row = next;
                col = 0;
                rep = 1;
            }

            n if n.is_ascii_digit() => {
                let (Some(n), rest) = parse_util::take_until_fn(|b| !b.is_ascii_digit(), bytes)
                else {
                    unreachable!("We peeked and found a digit")
                };
                bytes = rest;

                if let Some(b'\n' | b'\r') = parse_util::peek_1(bytes) {
                    bail!("Repeat count cannot be cut off by a new line")
                };

                rep = parse_util::convert(n).context("Failed to convert run length")?;
            }

            b => bail!("Unrecognized character '{}'", b as char),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(rle: &str) -> ParseResult<Vec<(usize, usize)>> {
        let mut cells = Vec::new();
        read_rle(rle.as_bytes(), |row, col| cells.push((row, col)))?;

        Ok(cells)
    }

    #[test]
    fn glider() {
        let rle = "#N Glider\n#O Richard K. Guy\nx = 3, y = 3, rule = B3/S23\nbob$2bo$3o!\n";

        assert_eq!(
            cells(rle).unwrap(),
            vec![(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)]
        );
    }

    #[test]
    fn header() {
        assert_eq!(read_line_header(b"x = 1, y = 2").unwrap(), (1, 2));
        assert_eq!(read_line_header(b"x=10,y=3,rule=23/3").unwrap(), (10, 3));
    }

    #[test]
    fn metadata() {
        let file = read_rle(b"#N Block\n#O nobody\nx = 2, y = 2\n2o$2o!", |_, _| {}).unwrap();

        assert_eq!(file.name, Some(b"Block".as_slice()));
        assert_eq!(file.size, Some((2, 2)));
    }

    #[test]
    fn huge_run_counts_are_errors() {
        assert!(cells("x = 3, y = 1\n18446744073709551615b2o!").is_err());
        assert!(cells("x = 3, y = 2\n18446744073709551615$o!").is_err());
        assert!(cells("4000000000o!").is_err());
        assert!(cells("o18446744073709551615$18446744073709551615$o!").is_err());
    }

    #[test]
    fn runs_stay_inside_the_header() {
        let err = cells("x = 1, y = 1\n5o!").unwrap_err();
        assert!(format!("{err:#}").contains("wider than 1"));

        assert!(cells("x = 2, y = 1\no$o!").is_err());
        assert_eq!(cells("x = 3, y = 2\n3o$2bo!").unwrap().len(), 4);
    }

    #[test]
    fn run_counts_skip_rows() {
        assert_eq!(cells("o2$o!").unwrap(), vec![(0, 0), (2, 0)]);
    }

    #[test]
    fn refuses_other_rules() {
        let err = cells("x = 1, y = 1, rule = B36/S23\no!").unwrap_err();

        assert!(format!("{err:#}").contains("only B3/S23"));
        assert!(cells("#r 34/34\no!").is_err());
    }

    #[test]
    fn requires_terminator() {
        assert!(cells("x = 1, y = 1\no").is_err());
    }
}
