//! Script lines for `loud` and `silent` markers.

use crate::util::unescape_entities;

/// Spaces a tab counts for when measuring the base indentation.
const TAB_WIDTH: usize = 8;

/// Lines of a `loud` marker's source with blank lines removed and trailing
/// whitespace stripped.
pub fn loud_source_lines(source: &str) -> Vec<String> {
    unescape_entities(source)
        .split('\n')
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a `loud` marker's source spans more than one non-blank line.
pub fn is_multiline(source: &str) -> bool {
    source.split('\n').filter(|l| !l.trim().is_empty()).nth(1).is_some()
}

/// Turn `loud` source lines into output lines (without indentation).
///
/// One line becomes `= expr`. Several lines are re-based on the last line's
/// indentation, continuation lines are pushed two spaces right, and every
/// line is padded so the trailing `|` markers share a column.
///
/// # Examples
///
/// ```
/// use hamlize::haml::align_loud_lines;
///
/// let lines = vec![
///     "    foo +".to_string(),
///     "      bar.baz.bang +".to_string(),
///     "    baz".to_string(),
/// ];
/// assert_eq!(
///     align_loud_lines(lines),
///     vec![
///         "= foo +            |",
///         "    bar.baz.bang + |",
///         "  baz              |",
///     ]
/// );
/// ```
pub fn align_loud_lines(mut lines: Vec<String>) -> Vec<String> {
    let Some(first) = lines.first_mut() else {
        return lines;
    };
    *first = format!("= {}", first.trim_start_matches([' ', '\t']));

    if lines.len() == 1 {
        return lines;
    }

    let base = lines.last().map_or(0, |l| indent_width(l));
    for line in lines.iter_mut() {
        let strip = line
            .bytes()
            .take(base)
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        line.drain(..strip);
    }
    for line in lines.iter_mut().skip(1) {
        line.insert_str(0, "  ");
    }

    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 1;
    lines
        .into_iter()
        .map(|line| {
            let pad = width - line.chars().count();
            format!("{line}{}|", " ".repeat(pad))
        })
        .collect()
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// `- statement` lines for a `silent` marker, one per non-blank line.
pub fn silent_lines(source: &str) -> Vec<String> {
    unescape_entities(source)
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("- {line}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_line() {
        let lines = loud_source_lines(" h @item.title ");
        assert_eq!(align_loud_lines(lines), vec!["= h @item.title"]);
    }

    #[test]
    fn test_entities_are_unescaped() {
        let lines = loud_source_lines(" 3 &lt; 5 ? &quot;OK&quot; : x ");
        assert_eq!(align_loud_lines(lines), vec!["= 3 < 5 ? \"OK\" : x"]);
    }

    #[test]
    fn test_blank_lines_dropped() {
        assert_eq!(loud_source_lines("\n    foo\n  \n"), vec!["    foo"]);
        assert!(loud_source_lines(" \n ").is_empty());
    }

    #[test]
    fn test_weird_indentation() {
        let lines = loud_source_lines("\n    foo +\n  bar.baz.bang +\n    baz\n  ");
        assert_eq!(
            align_loud_lines(lines),
            vec!["= foo +          |", "  bar.baz.bang + |", "  baz            |"]
        );
    }

    #[test]
    fn test_block_expression() {
        let lines = loud_source_lines(" foo.bar do\n        bang\n      end ");
        assert_eq!(
            align_loud_lines(lines),
            vec!["= foo.bar do |", "    bang     |", "  end        |"]
        );
    }

    #[test]
    fn test_tab_counts_as_eight() {
        let lines = vec!["a +".to_string(), "\t\tb +".to_string(), "\tc".to_string()];
        assert_eq!(
            align_loud_lines(lines),
            vec!["= a + |", "  b + |", "  c   |"]
        );
    }

    #[test]
    fn test_is_multiline() {
        assert!(is_multiline("\n  foo +\n  bar\n"));
        assert!(!is_multiline("\n  foo\n  "));
    }

    #[test]
    fn test_silent_lines() {
        assert_eq!(
            silent_lines("\n    foo\n\n    bar = baz\n  "),
            vec!["- foo", "- bar = baz"]
        );
        assert_eq!(silent_lines(" form_for "), vec!["- form_for"]);
    }

    proptest! {
        #[test]
        fn prop_pipes_share_a_column(
            body in proptest::collection::vec(("[ ]{0,6}", "[a-z.+()]{1,12}"), 2..6)
        ) {
            let lines: Vec<String> = body.iter().map(|(i, s)| format!("{i}{s}")).collect();
            let aligned = align_loud_lines(lines);
            let columns: Vec<usize> = aligned.iter().map(|l| l.chars().count()).collect();
            prop_assert!(aligned.iter().all(|l| l.ends_with('|')));
            prop_assert!(columns.windows(2).all(|w| w[0] == w[1]));
        }
    }
}
