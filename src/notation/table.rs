use itertools::Itertools;

use crate::grammar::{CykResult, Grammar, NonTerminal};

/// Whether a non-terminal was minted by the normalizer (a terminal proxy or
/// a binarization chain link) rather than written by the user.
fn is_generated(nonterm: &NonTerminal) -> bool {
    nonterm.id().starts_with("_T") || nonterm.id().starts_with("_N")
}

fn center(s: &str, width: usize) -> String {
    let len = s.chars().count();
    let pad = width.saturating_sub(len);
    format!("{}{}{}", " ".repeat(pad / 2), s, " ".repeat(pad - pad / 2))
}

fn separator(kind: char, label_width: usize, cell_width: usize, columns: usize) -> String {
    let (left, middle, right) = match kind {
        't' => ('┌', '┬', '┐'),
        'b' => ('└', '┴', '┘'),
        _ => ('├', '┼', '┤'),
    };

    let bar = "─".repeat(cell_width);
    format!(
        "{}{}{}{}",
        " ".repeat(label_width),
        left,
        (0..columns).map(|_| bar.as_str()).join(&middle.to_string()),
        right,
    )
}

/// Render a filled CYK table as a triangular box diagram.
///
/// Cells list the user-visible non-terminals deriving the corresponding
/// substring (generated proxy and chain names are filtered out, an empty
/// cell shows a dash) and the full-span cell gains a check mark when the
/// start symbol made it in. Returns an empty string for the empty word,
/// whose membership is decided without a table.
pub fn render_cyk_table(grammar: &Grammar, word: &str, result: &CykResult) -> String {
    let chars: Vec<char> = word.chars().collect();
    let n = chars.len();

    if n == 0 || result.table().is_empty() {
        return String::new();
    }

    let cell_text = |i: usize, len: usize| -> Option<String> {
        if i + len > n {
            return None;
        }
        let visible: Vec<&str> = result.table()[i][len - 1]
            .iter()
            .filter(|nt| !is_generated(nt))
            .map(|nt| nt.id())
            .collect();
        Some(if visible.is_empty() {
            "—".to_string()
        } else {
            visible.join(",")
        })
    };

    let mut max_width = 1;
    for i in 0..n {
        for len in 1..=n - i {
            if let Some(cell) = cell_text(i, len) {
                max_width = max_width.max(cell.chars().count());
            }
        }
        max_width = max_width.max(chars[i].to_string().chars().count());
    }
    let cell_width = max_width + 4;
    let label_width = n.to_string().len() + 1;

    let mut lines = Vec::new();
    lines.push(separator('t', label_width, cell_width, n));

    for len in (1..=n).rev() {
        let mut row = format!("{} │", center(&len.to_string(), label_width - 1));
        for i in 0..n {
            match cell_text(i, len) {
                None => {
                    row.push_str(&" ".repeat(cell_width));
                    row.push('│');
                },
                Some(cell) => {
                    let full_span = len == n && i == 0 && cell != "—";
                    let checked = full_span
                        && cell.split(',').any(|nt| nt == grammar.start_symbol().id());
                    let text = if checked {
                        format!("{} ✓", cell)
                    } else {
                        cell
                    };
                    row.push_str(&center(&text, cell_width));
                    row.push('│');
                },
            }
        }
        lines.push(row);
        if len > 1 {
            lines.push(separator('m', label_width, cell_width, n));
        }
    }

    lines.push(separator('b', label_width, cell_width, n));

    let mut char_row = " ".repeat(label_width);
    for c in &chars {
        char_row.push(' ');
        char_row.push_str(&center(&c.to_string(), cell_width));
    }
    lines.push(char_row);

    lines.join("\n")
}
