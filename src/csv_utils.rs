//! CSV import and export.
//!
//! Transfer history is exported through [`write_csv`]; bulk transfer
//! uploads are streamed through [`read_bulk_items`].

use csv_async::{AsyncReaderBuilder, Trim};
use serde::Serialize;
use std::io::Write;
use tokio_stream::StreamExt;

use crate::dto::{BulkUploadRow, TransferDetails};
use crate::error::{Error, Result};

/// Upper bound on rows in one bulk upload.
pub const MAX_BULK_ITEMS: usize = 1000;

/// Writes an iterator of records to a CSV writer.
/// Each record must implement Serialize.
pub fn write_csv<T, W>(writer: W, records: impl Iterator<Item = T>) -> csv::Result<()>
where
    T: Serialize,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Parses an uploaded bulk transfer file with the header
/// `bank_code,account_number,account_name,amount,remark`.
///
/// Rows are only parsed here; business validation happens when the items
/// are previewed or confirmed.
pub async fn read_bulk_items(contents: &[u8]) -> Result<Vec<TransferDetails>> {
    let mut reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .create_deserializer(contents);

    let mut items = Vec::new();
    let mut records = reader.deserialize::<BulkUploadRow>();
    while let Some(record) = records.next().await {
        // A malformed row rejects the whole upload
        items.push(TransferDetails::from(record?));
        if items.len() > MAX_BULK_ITEMS {
            return Err(Error::validation(format!(
                "Bulk upload is limited to {} rows",
                MAX_BULK_ITEMS
            )));
        }
    }
    if items.is_empty() {
        return Err(Error::validation("Bulk upload contains no rows"));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
        amount: rust_decimal::Decimal,
    }

    #[test]
    fn test_write_csv() -> csv::Result<()> {
        let mut output = Vec::new();
        let rows = vec![
            Row {
                name: "Ada",
                amount: dec!(1.5),
            },
            Row {
                name: "Bola",
                amount: dec!(20),
            },
        ];
        write_csv(&mut output, rows.into_iter())?;
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "name,amount\nAda,1.5\nBola,20\n"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_read_bulk_items() -> Result<()> {
        let upload = "bank_code, account_number, account_name, amount, remark
058, 0123456789, Ada Obi, 1500.509, Salary
044, 0987654321, Bola Ade, 2500,
";
        let items = read_bulk_items(upload.as_bytes()).await?;
        assert_eq!(
            items,
            vec![
                TransferDetails {
                    bank_code: "058".to_string(),
                    account_number: "0123456789".to_string(),
                    account_name: "Ada Obi".to_string(),
                    amount: dec!(1500.50),
                    remark: Some("Salary".to_string()),
                },
                TransferDetails {
                    bank_code: "044".to_string(),
                    account_number: "0987654321".to_string(),
                    account_name: "Bola Ade".to_string(),
                    amount: dec!(2500),
                    remark: None,
                },
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_read_bulk_items_rejects_bad_amount() {
        let upload = "bank_code,account_number,account_name,amount,remark\n058,0123456789,Ada,abc,\n";
        assert!(matches!(
            read_bulk_items(upload.as_bytes()).await,
            Err(Error::Csv(_))
        ));
    }

    #[tokio::test]
    async fn test_read_bulk_items_rejects_empty_upload() {
        let upload = "bank_code,account_number,account_name,amount,remark\n";
        assert!(matches!(
            read_bulk_items(upload.as_bytes()).await,
            Err(Error::Validation(_))
        ));
    }
}
