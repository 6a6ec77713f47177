/// Renders a bordered text table with a centred title row, each column as wide
/// as its widest cell.
///
/// ```text
/// +----------------------------------+
/// |               Diff               |
/// +----------------------------------+
/// +------+-----------+--------+------+
/// | Host | Interface | Config | IPAM |
/// +------+-----------+--------+------+
/// | sw1  | Gi1/0/1   | Uplink |      |
/// +------+-----------+--------+------+
/// ```
pub fn render_table(title: &str, head: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = (0..head.len())
        .map(|i| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(head[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let total_width = widths.iter().sum::<usize>() + 3 * head.len() + 1;
    let inner = total_width.saturating_sub(4).max(title.chars().count());

    let mut out = Vec::new();
    let top_border = format!("+-{}-+", "-".repeat(inner));
    out.push(top_border.clone());
    out.push(format!("| {} |", center(title, inner)));
    out.push(top_border);

    let separator = format!(
        "+-{}-+",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    let format_row = |cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| pad(cells.get(i).map(String::as_str).unwrap_or(""), *w))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    out.push(separator.clone());
    let head: Vec<String> = head.iter().map(|h| h.to_string()).collect();
    out.push(format_row(&head));
    out.push(separator.clone());
    for row in rows {
        out.push(format_row(row));
    }
    out.push(separator);

    out.join("\n")
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let total = width.saturating_sub(len);
    let left = total / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(total - left))
}
