use crate::domain::mandate::MandateRecord;
use crate::error::Result;
use std::io::Write;

/// Writes mandate rows as CSV for the batch exporter.
pub struct MandateWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> MandateWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header and one row per record, then flushes.
    ///
    /// The header is written even when there are no records.
    pub fn write_mandates(&mut self, records: &[MandateRecord]) -> Result<()> {
        if records.is_empty() {
            self.writer.write_record([
                "order_id",
                "website_id",
                "store_id",
                "increment_id",
                "mandate_reference",
                "mandate_city",
                "is_generated",
            ])?;
        }
        for record in records {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_mandates() {
        let record = MandateRecord {
            order_id: 1,
            website_id: 1,
            store_id: 2,
            increment_id: "100000001".to_string(),
            mandate_reference: "SEPA0ABCDEF".to_string(),
            mandate_city: "Berlin".to_string(),
            is_generated: false,
        };

        let mut out = Vec::new();
        MandateWriter::new(&mut out).write_mandates(&[record]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with(
            "order_id,website_id,store_id,increment_id,mandate_reference,mandate_city,is_generated\n"
        ));
        assert!(text.contains("1,1,2,100000001,SEPA0ABCDEF,Berlin,false"));
    }

    #[test]
    fn test_write_empty() {
        let mut out = Vec::new();
        MandateWriter::new(&mut out).write_mandates(&[]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
