// src/services/export.rs
//
// Codificadores das exportações: CSV, planilha SpreadsheetML e PDF paginado.

use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};
use genpdf::{
    elements::{self, FrameCellDecorator, Paragraph, TableLayout},
    fonts::{FontData, FontFamily},
    style::Style,
    Alignment, Element,
};
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event},
    Writer,
};

use crate::{
    common::error::AppError,
    models::{reports::MonthlyReport, social::Family},
};

const PDF_FONT_NAME: &str = "DejaVuSans";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportFile {
    pub content_type: &'static str,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Fontes TTF do PDF, carregadas uma vez. O `genpdf` mede o texto com elas.
#[derive(Clone)]
pub struct PdfFonts(FontFamily<FontData>);

impl PdfFonts {
    /// Espera `DejaVuSans-{Regular,Bold,Italic,BoldItalic}.ttf` em `dir`.
    pub fn load(dir: &Path) -> Result<Self, AppError> {
        genpdf::fonts::from_files(dir, PDF_FONT_NAME, None)
            .map(Self)
            .map_err(|e| {
                AppError::from(anyhow::anyhow!(
                    "fonte {PDF_FONT_NAME} não encontrada em {}: {e}",
                    dir.display()
                ))
            })
    }
}

/// Tabela neutra que cada formato sabe desenhar.
#[derive(Debug, Clone)]
pub struct ExportTable {
    pub title: String,
    pub sheet: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    // pesos das colunas no PDF
    pub widths: Vec<usize>,
    pub header_quote: QuoteStyle,
    pub row_quote: QuoteStyle,
}

impl ExportTable {
    pub fn families(families: &[Family]) -> Self {
        Self {
            title: "Relatório de famílias".to_string(),
            sheet: "families".to_string(),
            headers: vec![
                "id".to_string(),
                "responsible_full_name".to_string(),
                "responsible_cpf".to_string(),
            ],
            rows: families
                .iter()
                .map(|f| {
                    vec![
                        f.id.to_string(),
                        f.responsible_full_name.clone(),
                        f.responsible_cpf.clone(),
                    ]
                })
                .collect(),
            widths: vec![1, 4, 2],
            header_quote: QuoteStyle::Necessary,
            row_quote: QuoteStyle::NonNumeric,
        }
    }

    pub fn monthly(report: &MonthlyReport) -> Self {
        Self {
            title: format!("Relatório mensal {}", report.period),
            sheet: "monthly".to_string(),
            headers: vec!["period".to_string(), "metric".to_string(), "value".to_string()],
            rows: report
                .metrics()
                .into_iter()
                .map(|(metric, value)| vec![report.period.clone(), metric, value.to_string()])
                .collect(),
            widths: vec![1, 3, 1],
            header_quote: QuoteStyle::Always,
            row_quote: QuoteStyle::Always,
        }
    }
}

pub fn render(
    format: ExportFormat,
    table: &ExportTable,
    basename: &str,
    fonts: &PdfFonts,
) -> Result<ExportFile, AppError> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(table)?,
        ExportFormat::Xlsx => to_spreadsheet_xml(table)?,
        ExportFormat::Pdf => to_pdf(table, fonts)?,
    };

    Ok(ExportFile {
        content_type: format.content_type(),
        filename: format!("{basename}.{}", format.extension()),
        bytes,
    })
}

fn csv_lines(records: &[Vec<String>], style: QuoteStyle) -> Result<Vec<u8>, AppError> {
    let mut writer = WriterBuilder::new()
        .quote_style(style)
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(record).map_err(anyhow::Error::from)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::from(anyhow::anyhow!("falha ao finalizar CSV: {}", e.error())))
}

fn to_csv(table: &ExportTable) -> Result<Vec<u8>, AppError> {
    let mut out = csv_lines(std::slice::from_ref(&table.headers), table.header_quote)?;
    out.extend(csv_lines(&table.rows, table.row_quote)?);
    Ok(out)
}

fn xml_error<E>(e: E) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    AppError::from(anyhow::Error::from(e).context("falha ao gerar planilha"))
}

fn to_spreadsheet_xml(table: &ExportTable) -> Result<Vec<u8>, AppError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::PI(BytesPI::new(r#"mso-application progid="Excel.Sheet""#)))
        .map_err(xml_error)?;

    let workbook = BytesStart::new("Workbook").with_attributes([
        ("xmlns", "urn:schemas-microsoft-com:office:spreadsheet"),
        ("xmlns:ss", "urn:schemas-microsoft-com:office:spreadsheet"),
    ]);
    writer.write_event(Event::Start(workbook)).map_err(xml_error)?;
    let worksheet =
        BytesStart::new("Worksheet").with_attributes([("ss:Name", table.sheet.as_str())]);
    writer.write_event(Event::Start(worksheet)).map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("Table")))
        .map_err(xml_error)?;

    for row in std::iter::once(&table.headers).chain(table.rows.iter()) {
        writer
            .write_event(Event::Start(BytesStart::new("Row")))
            .map_err(xml_error)?;
        for cell in row {
            writer
                .write_event(Event::Start(BytesStart::new("Cell")))
                .map_err(xml_error)?;
            writer
                .write_event(Event::Start(
                    BytesStart::new("Data").with_attributes([("ss:Type", "String")]),
                ))
                .map_err(xml_error)?;
            writer
                .write_event(Event::Text(BytesText::new(cell)))
                .map_err(xml_error)?;
            writer
                .write_event(Event::End(BytesEnd::new("Data")))
                .map_err(xml_error)?;
            writer
                .write_event(Event::End(BytesEnd::new("Cell")))
                .map_err(xml_error)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("Row")))
            .map_err(xml_error)?;
    }

    for name in ["Table", "Worksheet", "Workbook"] {
        writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)?;
    }

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn pdf_error(e: genpdf::error::Error) -> AppError {
    AppError::from(anyhow::Error::msg(format!("falha ao gerar PDF: {e}")))
}

// A tabela quebra em quantas páginas forem necessárias.
fn to_pdf(table: &ExportTable, fonts: &PdfFonts) -> Result<Vec<u8>, AppError> {
    let mut doc = genpdf::Document::new(fonts.0.clone());
    doc.set_title(table.title.clone());
    doc.set_font_size(10);

    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    decorator.set_header(|page| {
        let mut number = Paragraph::new(format!("Página {page}"));
        number.set_alignment(Alignment::Right);
        number.styled(Style::new().with_font_size(8))
    });
    doc.set_page_decorator(decorator);

    doc.push(Paragraph::new(table.title.as_str()).styled(Style::new().bold().with_font_size(14)));
    doc.push(elements::Break::new(1));

    let mut layout = TableLayout::new(table.widths.clone());
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let bold = Style::new().bold();
    let mut header = layout.row();
    for name in &table.headers {
        header.push_element(Paragraph::new(name.as_str()).styled(bold));
    }
    header.push().map_err(pdf_error)?;

    for cells in &table.rows {
        let mut row = layout.row();
        for cell in cells {
            row.push_element(Paragraph::new(cell.as_str()));
        }
        row.push().map_err(pdf_error)?;
    }
    doc.push(layout);

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_error)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reports::MonthlySummary;
    use pretty_assertions::assert_eq;

    fn fonts() -> PdfFonts {
        PdfFonts::load(Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/fonts"))).unwrap()
    }

    fn family(id: u64, name: &str) -> Family {
        Family {
            id,
            responsible_full_name: name.into(),
            responsible_cpf: "52998224725".into(),
            phone: None,
            address: None,
        }
    }

    fn maria() -> Vec<Family> {
        vec![family(1, "Maria Silva")]
    }

    // Conta os dicionários /Type /Page (ignorando /Pages) do arquivo gerado.
    fn page_count(pdf: &[u8]) -> usize {
        let text = String::from_utf8_lossy(pdf);
        ["/Type/Page", "/Type /Page"]
            .iter()
            .map(|needle| {
                text.match_indices(needle)
                    .filter(|(at, _)| !text[at + needle.len()..].starts_with('s'))
                    .count()
            })
            .sum()
    }

    #[test]
    fn families_csv_matches_expected_layout() {
        let file = render(
            ExportFormat::Csv,
            &ExportTable::families(&maria()),
            "familias",
            &fonts(),
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(file.bytes).unwrap(),
            "id,responsible_full_name,responsible_cpf\n1,\"Maria Silva\",52998224725\n"
        );
        assert_eq!(file.filename, "familias.csv");
        assert!(file.content_type.starts_with("text/csv"));
    }

    #[test]
    fn spreadsheet_escapes_cells() {
        let mut families = maria();
        families[0].responsible_full_name = "Ana & <Filhos>".into();
        let file = render(
            ExportFormat::Xlsx,
            &ExportTable::families(&families),
            "familias",
            &fonts(),
        )
        .unwrap();
        let xml = String::from_utf8(file.bytes).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<?mso-application progid=\"Excel.Sheet\"?>"));
        assert!(xml.contains("<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\""));
        assert!(xml.contains("<Worksheet ss:Name=\"families\">"));
        assert!(xml.contains("Ana &amp; &lt;Filhos&gt;"));
        assert_eq!(xml.matches("<Row>").count(), 2);
        assert!(xml.trim_end().ends_with("</Workbook>"));
        assert!(file.content_type.contains("spreadsheetml"));
    }

    #[test]
    fn pdf_is_a_single_page_for_short_tables() {
        let file = render(
            ExportFormat::Pdf,
            &ExportTable::families(&maria()),
            "familias",
            &fonts(),
        )
        .unwrap();

        assert!(file.bytes.starts_with(b"%PDF-"));
        assert!(String::from_utf8_lossy(&file.bytes).trim_end().ends_with("%%EOF"));
        assert_eq!(page_count(&file.bytes), 1);
        assert_eq!(file.filename, "familias.pdf");
    }

    #[test]
    fn pdf_paginates_long_tables_instead_of_cutting_rows() {
        let families: Vec<Family> = (1..=150)
            .map(|id| family(id, &format!("Família número {id} da Conceição")))
            .collect();
        let file = render(
            ExportFormat::Pdf,
            &ExportTable::families(&families),
            "familias",
            &fonts(),
        )
        .unwrap();

        assert!(page_count(&file.bytes) > 1);
    }

    #[test]
    fn missing_font_directory_is_reported() {
        assert!(PdfFonts::load(Path::new("/nao/existe")).is_err());
    }

    #[test]
    fn monthly_csv_quotes_everything() {
        let report = MonthlyReport {
            period: "2026-04".into(),
            visit_status: None,
            summary: MonthlySummary {
                visits_total: 2,
                ..Default::default()
            },
        };
        let file = render(
            ExportFormat::Csv,
            &ExportTable::monthly(&report),
            "mensal",
            &fonts(),
        )
        .unwrap();
        let csv = String::from_utf8(file.bytes).unwrap();

        assert!(csv.starts_with("\"period\",\"metric\",\"value\"\n"));
        assert!(csv.contains("\"2026-04\",\"visits_total\",\"2\""));
    }
}
