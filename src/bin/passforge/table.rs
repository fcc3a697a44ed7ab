use std::fmt::{self, Display};
use std::io::{self, Write};

use anyhow::Context;
use unicode_width::UnicodeWidthStr;

use passforge::CharacterClass;

pub(crate) fn list_classes() -> Result<(), crate::ProgError> {
    let rows = CharacterClass::ALL.map(ClassRow::new);
    display_table(&rows, io::stdout().lock()).context("failed to output table")?;
    Ok(())
}

struct ClassRow {
    name: &'static str,
    size: String,
    chars: String,
}

impl ClassRow {
    fn new(class: CharacterClass) -> ClassRow {
        ClassRow {
            name: class.name(),
            size: class.len().to_string(),
            chars: class.chars().iter().collect(),
        }
    }
}

impl TableDisplay for ClassRow {
    const COLUMNS: &'static [&'static str] = &["Class", "Size", "Characters"];

    fn item(&self, column_index: usize) -> &str {
        match column_index {
            0 => self.name,
            1 => &self.size,
            _ => &self.chars,
        }
    }
}

trait TableDisplay {
    const COLUMNS: &'static [&'static str];

    fn item(&self, column_index: usize) -> &str;
}

fn display_table<Row: TableDisplay>(rows: &[Row], mut output: impl Write) -> io::Result<()> {
    let mut column_widths = Row::COLUMNS
        .iter()
        .map(|name| name.width())
        .collect::<Vec<_>>();
    for row in rows {
        for (column_index, width) in column_widths.iter_mut().enumerate() {
            *width = std::cmp::max(row.item(column_index).width(), *width);
        }
    }

    output_row(&mut output, &column_widths, |column_index| {
        Padded(Row::COLUMNS[column_index], column_widths[column_index])
    })?;
    output_row(&mut output, &column_widths, |column_index| {
        Divider(column_widths[column_index])
    })?;
    for row in rows {
        output_row(&mut output, &column_widths, |column_index| {
            Padded(row.item(column_index), column_widths[column_index])
        })?;
    }

    Ok(())
}

fn output_row<F, D>(
    mut output: impl Write,
    column_widths: &[usize],
    get_column_display: F,
) -> io::Result<()>
where
    D: Display,
    F: Fn(usize) -> D,
{
    for column_index in 0..column_widths.len() {
        if column_index > 0 {
            write!(&mut output, "  ")?;
        }
        write!(&mut output, "{}", get_column_display(column_index))?;
    }
    writeln!(&mut output)?;
    Ok(())
}

struct Divider(usize);

impl Display for Divider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.0 {
            write!(f, "─")?;
        }
        Ok(())
    }
}

struct Padded<'a>(&'a str, usize);

impl Display for Padded<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let padding = self.1.saturating_sub(self.0.width());
        write!(f, "{}", self.0)?;
        for _ in 0..padding {
            write!(f, " ")?;
        }
        Ok(())
    }
}
