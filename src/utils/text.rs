/// First line of `text`, cut to `max_chars` characters with a trailing ellipsis when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let mut chars = first_line.chars();
    let head: String = chars.by_ref().take(max_chars).collect();

    if chars.next().is_some() || text.lines().nth(1).is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
