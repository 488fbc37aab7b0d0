//! Whitespace handling shared by templates and generators

/// Remove the common leading whitespace from every line
///
/// Lines holding only spaces and tabs become empty and do not take part in
/// computing the margin.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    let mut margin: Option<&str> = None;
    for line in &lines {
        let content = line.trim_start_matches([' ', '\t']);
        if content.is_empty() {
            continue;
        }
        let indent = &line[..line.len() - content.len()];
        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }
    let margin = margin.unwrap_or("");

    lines
        .iter()
        .map(|line| {
            if line.trim_start_matches([' ', '\t']).is_empty() {
                ""
            } else {
                line.strip_prefix(margin).unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

/// Follow every newline in `text` with `indent`
pub fn indent_newlines(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_string();
    }
    text.replace('\n', &format!("\n{}", indent))
}

/// The whitespace a line starts with
pub fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Template source preprocessing
///
/// A source opening with a newline is dedented and loses that newline; a
/// trailing blank line is dropped; multi-line text is dedented once more.
pub fn normalize(source: &str) -> String {
    let mut text = match source.strip_prefix('\n') {
        Some(_) => {
            let dedented = dedent(source);
            dedented[1..].to_string()
        }
        None => source.to_string(),
    };

    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() >= 2 && lines[lines.len() - 1].trim().is_empty() {
        text = lines[..lines.len() - 1].join("\n");
    }

    if text.contains('\n') {
        text = dedent(&text);
    }
    text
}
