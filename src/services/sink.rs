use std::{fs::File, io::Write, path::Path};

use rust_xlsxwriter::Workbook;

use crate::domain::record::{BusinessRecord, NOT_INFORMED};

pub const COLUMN_LABELS: [&str; 7] = [
    "Nicho",
    "Cidade",
    "Nome da Empresa",
    "Endereço",
    "Telefone",
    "Avaliação",
    "Nº de Avaliações",
];

// Spreadsheet tools only detect the encoding of the delimited export with an
// explicit byte order mark.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes the whole accumulator to `path`, replacing whatever is there.
/// `.xlsx` selects the workbook writer, anything else the delimited one.
pub fn persist(records: &[BusinessRecord], path: &Path) -> anyhow::Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("xlsx") => write_workbook(records, path),
        _ => write_delimited(records, path),
    }
}

fn row_values(record: &BusinessRecord) -> [String; 7] {
    [
        informed(&record.nicho),
        informed(&record.cidade),
        informed(&record.nome),
        informed(&record.endereco),
        informed(&record.telefone),
        informed(&record.avaliacao),
        informed(&record.num_avaliacoes),
    ]
}

fn informed(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed.is_empty() {
        true => NOT_INFORMED.to_string(),
        false => trimmed.to_string(),
    }
}

fn write_delimited(records: &[BusinessRecord], path: &Path) -> anyhow::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new().from_writer(file);
    writer.write_record(COLUMN_LABELS)?;
    for record in records {
        writer.write_record(row_values(record))?;
    }
    writer.flush()?;

    Ok(())
}

fn write_workbook(records: &[BusinessRecord], path: &Path) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, label) in COLUMN_LABELS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *label)?;
    }
    for (row, record) in records.iter().enumerate() {
        for (col, value) in row_values(record).iter().enumerate() {
            worksheet.write_string(row as u32 + 1, col as u16, value.as_str())?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(nome: &str, telefone: &str) -> BusinessRecord {
        let mut record = BusinessRecord::not_informed().tag("padaria", "Cambé");
        record.nome = nome.to_string();
        record.telefone = telefone.to_string();
        record
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let raw = std::fs::read(path).unwrap();
        assert!(raw.starts_with(UTF8_BOM), "missing byte order mark");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(&raw[UTF8_BOM.len()..]);
        reader
            .records()
            .map(|row| row.unwrap().iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn delimited_export_keeps_column_order_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.csv");

        persist(&[record("Padaria Estrela", "(43) 3254-1234")], &path).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows[0], COLUMN_LABELS.to_vec());
        assert_eq!(
            rows[1],
            vec![
                "padaria",
                "Cambé",
                "Padaria Estrela",
                NOT_INFORMED,
                "(43) 3254-1234",
                NOT_INFORMED,
                NOT_INFORMED,
            ]
        );
    }

    #[test]
    fn blank_fields_become_the_sentinel_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.csv");

        persist(
            &[record("Com Telefone", "(43) 3254-1234"), record("Sem Telefone", "  ")],
            &path,
        )
        .unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows[1][4], "(43) 3254-1234");
        assert_eq!(rows[2][4], NOT_INFORMED);
        assert_eq!(rows[2][2], "Sem Telefone");
    }

    #[test]
    fn persisting_again_overwrites_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.csv");

        persist(
            &[record("A", ""), record("B", ""), record("C", "")],
            &path,
        )
        .unwrap();
        persist(&[record("Only", "")], &path).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][2], "Only");
    }

    #[test]
    fn xlsx_extension_selects_the_workbook_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.xlsx");

        persist(&[record("Padaria Estrela", "(43) 3254-1234")], &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
        // Workbook files are zip containers.
        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], b"PK");
    }
}
