use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::notice::Notice;
use crate::view::ListView;

/// Terminal counterpart of the browser list region.
#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => io::stdout().is_terminal(),
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip_all, fields(items = view.items.len()))]
    pub fn write_list<W: Write>(&self, mut out: W, view: &ListView) -> anyhow::Result<()> {
        match view.empty {
            Some(message) => writeln!(out, "{message}")?,
            None => {
                let headers = vec![
                    "ID".to_string(),
                    "Done".to_string(),
                    "Task".to_string(),
                    "Created".to_string(),
                ];
                let rows = view
                    .items
                    .iter()
                    .map(|item| {
                        let done = match item.badge() {
                            Some(badge) => self.paint(badge, "32"),
                            None => String::new(),
                        };
                        let text = if item.completed {
                            self.paint(&item.text, "9")
                        } else {
                            item.text.clone()
                        };
                        let created = item
                            .created_label
                            .strip_prefix("Created: ")
                            .unwrap_or(&item.created_label)
                            .to_string();
                        vec![self.paint(item.id.as_str(), "33"), done, text, created]
                    })
                    .collect();
                write_table(&mut out, headers, rows)?;
            }
        }
        writeln!(out)?;
        writeln!(out, "{}", view.count_label())?;
        Ok(())
    }

    pub fn write_notice<W: Write>(&self, mut out: W, notice: &Notice) -> anyhow::Result<()> {
        let message = if notice.is_error() {
            self.paint(&notice.message, "31")
        } else {
            notice.message.clone()
        };
        writeln!(out, "{message}")?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let last = column_count.saturating_sub(1);
    for (idx, header) in headers.iter().enumerate() {
        if idx == last {
            write!(writer, "{header}")?;
        } else {
            write!(writer, "{:width$} ", header, width = widths[idx])?;
        }
    }
    writeln!(writer)?;

    for (idx, width) in widths.iter().enumerate() {
        let sep = if idx == last { "" } else { " " };
        write!(writer, "{:-<width$}{sep}", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if idx == last {
                write!(writer, "{cell}")?;
                continue;
            }
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Renderer, strip_ansi};
    use crate::filter::Filter;
    use crate::task::{Task, TaskId};
    use crate::view::render;

    fn task(id: &str, text: &str, completed: bool) -> Task {
        let now = Utc.with_ymd_and_hms(2026, 2, 16, 5, 0, 0).unwrap();
        let mut task = Task::new(text.to_string(), now);
        task.id = TaskId::from(id);
        task.completed = completed;
        task
    }

    #[test]
    fn writes_aligned_table_and_count() {
        let tasks = vec![task("b", "Walk dog", false), task("a1", "Buy milk", true)];
        let view = render(&tasks, Filter::All, &Utc);

        let mut out = Vec::new();
        Renderer::plain().write_list(&mut out, &view).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "ID Done Task     Created\n\
             -- ---- -------- -------------------\n\
             b       Walk dog 2026-02-16 05:00:00\n\
             a1 Done Buy milk 2026-02-16 05:00:00\n\
             \n\
             1 / 2 tasks remaining\n"
        );
    }

    #[test]
    fn empty_view_prints_message() {
        let view = render(&[], Filter::Active, &Utc);
        let mut out = Vec::new();
        Renderer::plain().write_list(&mut out, &view).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("No tasks yet"));
        assert!(text.ends_with("0 / 0 tasks remaining\n"));
    }

    #[test]
    fn strip_ansi_removes_color_codes() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m"), "red");
    }
}
