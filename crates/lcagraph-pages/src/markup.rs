//! Page markup writer.
//!
//! Emits product/process pages in exactly the markup [`parse_page`]
//! reads, so importers and exporters stay round-trip compatible with the
//! corpus: section headings, bullet-link syntax, and the
//! `Quantity:`/`Database:` trailing fields.
//!
//! [`parse_page`]: crate::parse_page

use std::fmt::Write as _;

/// One exchange bullet: a linked entity with optional amount metadata.
#[derive(Debug, Clone, Default)]
pub struct ExchangeSpec {
    pub id: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub database: Option<String>,
}

impl ExchangeSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_amount(mut self, quantity: f64, unit: impl Into<String>) -> Self {
        self.quantity = Some(quantity);
        self.unit = Some(unit.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

/// Inputs for a full process page.
#[derive(Debug, Clone, Default)]
pub struct ProcessPageSpec {
    pub process_id: String,
    pub product_id: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub database: Option<String>,
    pub location: Option<String>,
    pub consumed_products: Vec<ExchangeSpec>,
    pub consumed_processes: Vec<ExchangeSpec>,
    pub chimaera: Vec<ExchangeSpec>,
    pub biosphere: Vec<ExchangeSpec>,
}

fn push_bullet(out: &mut String, exchange: &ExchangeSpec) {
    let _ = write!(out, "* [{id}]({id})", id = exchange.id);
    if let Some(quantity) = exchange.quantity {
        let _ = write!(out, " - Quantity: {quantity}");
        if let Some(unit) = &exchange.unit {
            let _ = write!(out, " {unit}");
        }
    }
    if let Some(database) = &exchange.database {
        let _ = write!(out, " - Database: {database}");
    }
    out.push('\n');
}

/// Render a product page: title, `List of processes`, similarity stub.
pub fn render_product_page(product_id: &str, processes: &[ExchangeSpec]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Product: {product_id}");
    out.push('\n');
    out.push_str("## List of processes\n\n");
    for exchange in processes {
        push_bullet(&mut out, exchange);
    }
    out.push('\n');
    out.push_str("## May be similar to the following products\n");
    out
}

/// Render a process page with technosphere and biosphere sections.
pub fn render_process_page(spec: &ProcessPageSpec) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Process: {}", spec.process_id);
    out.push('\n');

    out.push_str("## Characteristics\n\n");
    if let Some(database) = &spec.database {
        let _ = writeln!(out, "  * Database: {database}");
    }
    if let Some(location) = &spec.location {
        let _ = writeln!(out, "  * Location: {location}");
    }
    out.push('\n');

    out.push_str("## Technosphere Flow\n\n");
    out.push_str("### Production\n\n");
    let production = ExchangeSpec {
        id: spec.product_id.clone(),
        quantity: spec.quantity,
        unit: spec.unit.clone(),
        database: None,
    };
    push_bullet(&mut out, &production);
    out.push('\n');

    out.push_str("### Consumption\n\n");
    out.push_str("Product:\n\n");
    for exchange in &spec.consumed_products {
        push_bullet(&mut out, exchange);
    }
    out.push('\n');
    out.push_str("Process:\n\n");
    for exchange in &spec.consumed_processes {
        push_bullet(&mut out, exchange);
    }
    out.push('\n');
    out.push_str("Chimaera (to be classified):\n\n");
    for exchange in &spec.chimaera {
        push_bullet(&mut out, exchange);
    }
    out.push('\n');

    out.push_str("## Biosphere Flow\n\n");
    for exchange in &spec.biosphere {
        push_bullet(&mut out, exchange);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_page, Relation};

    #[test]
    fn product_page_round_trips_through_parser() {
        let text = render_product_page(
            "pd_widget",
            &[ExchangeSpec::new("ps_make_widget")
                .with_amount(5.0, "kg")
                .with_database("ecoinvent")],
        );
        let page = parse_page(&text, "pd_widget", None);
        assert_eq!(page.edges_out.len(), 1);
        let edge = &page.edges_out[0];
        assert_eq!(edge.target, "ps_make_widget");
        assert_eq!(edge.relation, Relation::ProducedBy);
        assert_eq!(edge.quantity, Some(5.0));
        assert_eq!(edge.unit.as_deref(), Some("kg"));
        assert_eq!(edge.database.as_deref(), Some("ecoinvent"));
    }

    #[test]
    fn process_page_round_trips_through_parser() {
        let spec = ProcessPageSpec {
            process_id: "ps_make_widget".into(),
            product_id: "pd_widget".into(),
            quantity: Some(1.0),
            unit: Some("unit".into()),
            database: Some("ecoinvent".into()),
            location: Some("GLO".into()),
            consumed_products: vec![ExchangeSpec::new("pd_steel").with_amount(2.0, "kg")],
            consumed_processes: vec![ExchangeSpec::new("ps_transport").with_amount(10.0, "km")],
            chimaera: vec![ExchangeSpec::new("ps_unsorted")],
            biosphere: vec![ExchangeSpec::new("bp_co2").with_amount(0.5, "kg")],
        };
        let text = render_process_page(&spec);
        let page = parse_page(&text, "ps_make_widget", None);

        let find = |target: &str| {
            page.edges_out
                .iter()
                .find(|e| e.target == target)
                .unwrap_or_else(|| panic!("missing edge to {target}"))
        };
        assert_eq!(find("pd_widget").relation, Relation::Produces);
        assert_eq!(find("pd_steel").relation, Relation::ConsumesProduct);
        assert_eq!(find("ps_transport").relation, Relation::ConsumesProcess);
        assert_eq!(find("pd_steel").quantity, Some(2.0));
        // The chimaera marker is a plain line, not a heading, so the
        // `Process:` sub-category is still in effect for its bullets.
        assert_eq!(find("ps_unsorted").relation, Relation::ConsumesProcess);
        // Biosphere bullets live outside the technosphere section.
        assert_eq!(find("bp_co2").relation, Relation::References);
    }
}
