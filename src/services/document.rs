use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::Datelike;
use text_placeholder::Template;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source, VirtualPath};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_kit::fonts::{FontSearcher, FontSlot};
use typst_pdf::PdfOptions;

use crate::dto::orders::OrderWithItems;
use crate::error::{AppError, AppResult};

const TEMPLATE: &str = include_str!("../../templates/service_order.typ");

static LIBRARY: LazyLock<LazyHash<Library>> =
    LazyLock::new(|| LazyHash::new(Library::builder().build()));

// Font discovery walks the filesystem; do it once per process.
static FONTS: LazyLock<(LazyHash<FontBook>, Vec<FontSlot>)> = LazyLock::new(|| {
    let fonts = FontSearcher::new().include_system_fonts(true).search();
    (LazyHash::new(fonts.book), fonts.fonts)
});

/// The exported document is a single in-memory source: no package access,
/// no local file access.
struct DocumentWorld {
    source: Source,
    main_id: FileId,
}

impl DocumentWorld {
    fn new(source_text: String) -> Self {
        let main_id = FileId::new(None, VirtualPath::new("main.typ"));
        let source = Source::new(main_id, source_text);
        Self { source, main_id }
    }
}

impl World for DocumentWorld {
    fn library(&self) -> &LazyHash<Library> {
        &LIBRARY
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &FONTS.0
    }

    fn main(&self) -> FileId {
        self.main_id
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main_id {
            Ok(self.source.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.1[index].get()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = chrono::Utc::now().date_naive();
        Datetime::from_ymd(now.year(), now.month() as u8, now.day() as u8)
    }
}

/// Compile the filled template to PDF bytes. Any compilation or export
/// failure surfaces as a render error; no partial output is returned.
pub fn render_order(bundle: &OrderWithItems) -> AppResult<Vec<u8>> {
    let source = fill_template(bundle);
    let world = DocumentWorld::new(source);

    let compiled = typst::compile(&world);
    let document = compiled
        .output
        .map_err(|errors| AppError::Render(format!("compilation failed: {errors:?}")))?;

    let pdf = typst_pdf::pdf(&document, &PdfOptions::default())
        .map_err(|errors| AppError::Render(format!("pdf export failed: {errors:?}")))?;

    Ok(pdf)
}

fn fill_template(bundle: &OrderWithItems) -> String {
    let order = &bundle.order;

    let order_id = order.id.to_string();
    let client_name = escape(&bundle.client.name);
    let client_tax_id = escape(bundle.client.tax_id.as_deref().unwrap_or("-"));
    let client_phone = escape(bundle.client.phone.as_deref().unwrap_or("-"));
    let equipment_label = escape(&bundle.equipment.display_label());
    let equipment_serial = escape(bundle.equipment.serial_number.as_deref().unwrap_or("-"));
    let status_label = order.status.label();
    let entered_at = order.entered_at.format("%Y-%m-%d %H:%M").to_string();
    let exited_at = order
        .exited_at
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let reported_defect = escape(&order.reported_defect);
    let technical_report = escape(order.technical_report.as_deref().unwrap_or("-"));
    let total = order.total.round_dp(2).to_string();

    let items_rows = bundle.items.iter().fold(String::new(), |rows, item| {
        rows + &format!(
            "[{}], [{}], [{}], [{}],\n",
            escape(&item.description),
            item.quantity,
            item.unit_price.round_dp(2),
            item.subtotal().round_dp(2),
        )
    });

    let vars: HashMap<&str, &str> = HashMap::from([
        ("order-id", order_id.as_str()),
        ("client-name", client_name.as_str()),
        ("client-tax-id", client_tax_id.as_str()),
        ("client-phone", client_phone.as_str()),
        ("equipment-label", equipment_label.as_str()),
        ("equipment-serial", equipment_serial.as_str()),
        ("status-label", status_label),
        ("entered-at", entered_at.as_str()),
        ("exited-at", exited_at.as_str()),
        ("reported-defect", reported_defect.as_str()),
        ("technical-report", technical_report.as_str()),
        ("items-rows", items_rows.as_str()),
        ("total", total.as_str()),
    ]);

    Template::new(TEMPLATE).fill_with_hashmap(&vars)
}

/// Backslash-escape characters that Typst would read as markup, so free-text
/// fields cannot break or inject into the document source.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(
            ch,
            '\\' | '#' | '*' | '_' | '[' | ']' | '$' | '@' | '<' | '>' | '`'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{Client, Equipment, EquipmentKind, LineItem, OrderStatus, ServiceOrder};

    fn sample_bundle() -> OrderWithItems {
        OrderWithItems {
            order: ServiceOrder {
                id: 42,
                client_id: 1,
                equipment_id: 1,
                reported_defect: "Does not power on".into(),
                technical_report: None,
                status: OrderStatus::InAnalysis,
                total: Decimal::new(15000, 2),
                entered_at: Utc::now(),
                exited_at: None,
            },
            client: Client {
                id: 1,
                name: "Ana Silva".into(),
                tax_id: Some("12345678900".into()),
                phone: None,
                email: None,
                address: None,
                created_at: Utc::now(),
            },
            equipment: Equipment {
                id: 1,
                client_id: 1,
                kind: EquipmentKind::Notebook,
                brand: "Dell".into(),
                model: "XPS".into(),
                serial_number: Some("SN1".into()),
            },
            items: vec![LineItem {
                id: 1,
                order_id: 42,
                description: "Power supply".into(),
                quantity: 2,
                unit_price: Decimal::new(7500, 2),
            }],
        }
    }

    #[test]
    fn filled_template_carries_order_fields() {
        let source = fill_template(&sample_bundle());
        assert!(source.contains("Service Order \\#42"));
        assert!(source.contains("Ana Silva"));
        assert!(source.contains("Notebook Dell XPS"));
        assert!(source.contains("In Analysis"));
        assert!(source.contains("[Power supply], [2], [75.00], [150.00],"));
        assert!(source.contains("Total: 150.00"));
        // No placeholder left unfilled.
        assert!(!source.contains("{{"));
    }

    #[test]
    fn free_text_markup_is_escaped() {
        let mut bundle = sample_bundle();
        bundle.order.reported_defect = "Broken [hinge] #left side".into();
        let source = fill_template(&bundle);
        assert!(source.contains("Broken \\[hinge\\] \\#left side"));
    }
}
