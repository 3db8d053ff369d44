use textwrap::wrap;

/// Clamp a scroll offset and return the visible `[start, end)` window along
/// with the largest valid offset.
pub fn visible_window(
    lines_count: usize,
    visible_height: usize,
    current_scroll: u16,
) -> (usize, usize, u16) {
    let max_scroll = lines_count.saturating_sub(visible_height) as u16;
    let safe_scroll = current_scroll.min(max_scroll);
    let start_index = if lines_count == 0 {
        0
    } else {
        (safe_scroll as usize).min(lines_count - 1)
    };
    let end_index = (start_index + visible_height).min(lines_count);

    (start_index, end_index, max_scroll)
}

/// Wrap numbered poem lines to `width`, continuation rows indented under the
/// text rather than the number.
pub fn wrap_poem(lines: &[String], width: usize) -> Vec<(Option<usize>, String)> {
    let gutter = format!("{}", lines.len()).len() + 2;
    let text_width = width.saturating_sub(gutter).max(1);

    let mut rows = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let wrapped = wrap(line, text_width);
        if wrapped.is_empty() {
            rows.push((Some(i + 1), String::new()));
            continue;
        }
        for (j, part) in wrapped.into_iter().enumerate() {
            let number = if j == 0 { Some(i + 1) } else { None };
            rows.push((number, part.into_owned()));
        }
    }
    rows
}
