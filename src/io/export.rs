//! CSV export for bill statements.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::statement::BillStatement;

/// Column header for bill CSV export.
const HEADER: &str = "street,city,zip,utility,plan,usage,unit,generation,amount";

/// Exports a statement to a CSV file at the given path.
///
/// Writes a header row followed by one row per bill line. Produces
/// deterministic output for identical inputs.
///
/// # Arguments
///
/// * `statement` - Statement to export
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(statement: &BillStatement, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(statement, buf)
}

/// Writes a statement as CSV to any writer.
///
/// The `generation` column is empty for utilities without local generation.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(statement: &BillStatement, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for l in statement.lines() {
        wtr.write_record(&[
            l.address.street().to_string(),
            l.address.city().to_string(),
            l.address.zip().to_string(),
            l.utility.to_string(),
            l.plan.clone(),
            format!("{:.4}", l.usage),
            l.utility.unit().to_string(),
            l.generation.map(|g| format!("{g:.4}")).unwrap_or_default(),
            format!("{:.2}", l.amount),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::UtilityKind;
    use crate::address::Address;
    use crate::statement::BillLine;

    fn statement() -> BillStatement {
        BillStatement::from_lines(vec![
            BillLine {
                address: Address::new("4 Comma, Close", "Delim", "60006"),
                utility: UtilityKind::Electricity,
                plan: "grid_tied_solar".to_string(),
                usage: 100.0,
                generation: Some(120.0),
                amount: -60.0,
            },
            BillLine {
                address: Address::new("4 Comma, Close", "Delim", "60006"),
                utility: UtilityKind::Water,
                plan: "residential_standard".to_string(),
                usage: 15.0,
                generation: None,
                amount: 35.0,
            },
        ])
    }

    fn render() -> String {
        let mut buf = Vec::new();
        write_csv(&statement(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_is_fixed() {
        let out = render();
        assert_eq!(out.lines().next(), Some(HEADER));
    }

    #[test]
    fn row_count_matches_lines() {
        assert_eq!(render().lines().count(), 3);
    }

    #[test]
    fn deterministic_output() {
        assert_eq!(render(), render());
    }

    #[test]
    fn parses_back_with_quoted_street() {
        let out = render();
        let mut rdr = csv::ReaderBuilder::new().from_reader(out.as_bytes());
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "4 Comma, Close");
        assert_eq!(&rows[0][7], "120.0000");
        assert_eq!(rows[0][8].parse::<f64>().unwrap(), -60.0);
        assert_eq!(&rows[1][6], "m³");
        assert_eq!(&rows[1][7], "");
    }
}
