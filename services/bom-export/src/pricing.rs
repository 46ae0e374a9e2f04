//! Pricing Enricher
//!
//! Looks up every row that carries a manufacturer part number and writes
//! the best matching price break of each distributor onto the row.

use tracing::{debug, info};

use crate::findchips::{FindChipsClient, PriceBreak, SearchResponse};
use kicad_bom_models::BomTable;
use kicad_bom_utils::{BomError, BomResult};

/// Counts for one pricing pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricingSummary {
    pub lookups: usize,
    pub priced_rows: usize,
    pub prices_written: usize,
}

/// Picks the largest break whose quantity does not exceed `required`.
///
/// Breaks are expected in ascending quantity order; the scan stops at the
/// first break above `required`.
pub fn select_price_break(breaks: &[PriceBreak], required: u64) -> Option<&PriceBreak> {
    let mut selected = None;
    for price_break in breaks {
        if price_break.quantity > required {
            break;
        }
        if price_break.quantity > 0 {
            selected = Some(price_break);
        }
    }
    selected
}

/// Column names written for one distributor, in schema order
pub fn distributor_columns(distributor: &str) -> [String; 4] {
    [
        format!("{}_PARTNO", distributor),
        format!("{}_QTY", distributor),
        format!("{}_CURRENCY", distributor),
        format!("{}_PRICE", distributor),
    ]
}

pub struct PricingEnricher<'a> {
    client: &'a FindChipsClient,
    part_number_field: String,
}

impl<'a> PricingEnricher<'a> {
    pub fn new(client: &'a FindChipsClient, part_number_field: impl Into<String>) -> Self {
        Self {
            client,
            part_number_field: part_number_field.into(),
        }
    }

    /// Prices every row with a part number, in row order, one request each.
    ///
    /// The first failed lookup ends the pass and is returned as the error.
    /// Rows priced before the failure keep their columns.
    pub async fn enrich(&self, table: &mut BomTable) -> BomResult<PricingSummary> {
        let mut summary = PricingSummary::default();

        for row in 0..table.len() {
            let record = &table.records()[row];
            let Some(part_number) = record.get(&self.part_number_field).map(str::to_owned) else {
                continue;
            };
            let required = record.count().ok_or_else(|| {
                BomError::internal(format!("Row {} has a non-numeric Count", record.reference()))
            })?;

            summary.lookups += 1;
            let response = self.client.search(&part_number).await?;

            let written = apply_prices(table, row, &response, u64::from(required));
            if written > 0 {
                summary.priced_rows += 1;
                summary.prices_written += written;
            }
            debug!("{} distributor prices recorded for {}", written, part_number);
        }

        info!(
            "Pricing complete: {} lookups, {} rows priced",
            summary.lookups, summary.priced_rows
        );
        Ok(summary)
    }
}

/// Writes the distributor columns for one row. A later part from the same
/// distributor overwrites an earlier one. Returns the number of prices kept.
pub fn apply_prices(table: &mut BomTable, row: usize, response: &SearchResponse, required: u64) -> usize {
    let mut written = 0;

    for supplier in &response.response {
        for part in &supplier.parts {
            let Some(price_break) = select_price_break(&part.price, required) else {
                continue;
            };

            let [part_no, quantity, currency, price] = distributor_columns(&supplier.distributor.name);
            table.set(row, &part_no, part.item_number().unwrap_or_default());
            table.set(row, &quantity, price_break.quantity.to_string());
            table.set(row, &currency, price_break.currency.as_str());
            table.set(row, &price, price_break.price.to_string());
            written += 1;
        }
    }

    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use kicad_bom_models::ComponentRecord;
    use kicad_bom_utils::PricingConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn breaks(pairs: &[(u64, f64)]) -> Vec<PriceBreak> {
        pairs
            .iter()
            .map(|(quantity, price)| PriceBreak {
                quantity: *quantity,
                price: serde_json::Number::from_f64(*price).unwrap(),
                currency: "USD".to_string(),
            })
            .collect()
    }

    fn priced_response(distributor: &str, item: &str) -> serde_json::Value {
        json!({
            "response": [{
                "distributor": { "name": distributor },
                "parts": [{
                    "distributorItemNo": item,
                    "price": [
                        { "quantity": 1, "price": 0.1, "currency": "USD" },
                        { "quantity": 10, "price": 0.05, "currency": "USD" },
                        { "quantity": 100, "price": 0.01, "currency": "USD" }
                    ]
                }]
            }]
        })
    }

    fn table_with_parts(parts: &[(&str, Option<&str>, u32)]) -> BomTable {
        let mut table = BomTable::new();
        table.register_column("Mfg_Part_No");
        for (reference, part, count) in parts {
            let mut record = ComponentRecord::new(*reference);
            if let Some(part) = part {
                record.insert("Mfg_Part_No", *part);
            }
            record.set_count(*count);
            table.push(record);
        }
        table
    }

    #[test]
    fn test_select_price_break() {
        let list = breaks(&[(1, 10.0), (10, 8.0), (100, 5.0)]);

        assert_eq!(select_price_break(&list, 50).map(|b| b.quantity), Some(10));
        assert_eq!(select_price_break(&list, 5).map(|b| b.quantity), Some(1));
        assert_eq!(select_price_break(&list, 0), None);
        assert_eq!(select_price_break(&list, 100).map(|b| b.quantity), Some(100));
        assert_eq!(select_price_break(&list, 100_000).map(|b| b.quantity), Some(100));
        assert_eq!(select_price_break(&[], 10), None);
    }

    #[test]
    fn test_select_price_break_first_break_too_large() {
        let list = breaks(&[(25, 1.0), (100, 0.5)]);
        assert_eq!(select_price_break(&list, 10), None);
    }

    #[test]
    fn test_apply_prices_writes_columns_in_order() {
        let mut table = table_with_parts(&[("R1;R2;R3", Some("RC0402"), 12)]);
        let response: SearchResponse = serde_json::from_value(json!({
            "response": [
                {
                    "distributor": { "name": "Mouser" },
                    "parts": [{
                        "distributorItemNo": "603-RC0402",
                        "price": [
                            { "quantity": 1, "price": 0.1, "currency": "USD" },
                            { "quantity": 10, "price": 0.05, "currency": "USD" },
                            { "quantity": 100, "price": 0.01, "currency": "USD" }
                        ]
                    }]
                },
                {
                    "distributor": { "name": "Farnell" },
                    "parts": [{
                        "distributorItemNo": "2447153",
                        "price": [{ "quantity": 50, "price": 0.02, "currency": "GBP" }]
                    }]
                }
            ]
        }))
        .unwrap();

        let written = apply_prices(&mut table, 0, &response, 12);
        assert_eq!(written, 1);

        let row = &table.records()[0];
        assert_eq!(row.get("Mouser_PARTNO"), Some("603-RC0402"));
        assert_eq!(row.get("Mouser_QTY"), Some("10"));
        assert_eq!(row.get("Mouser_CURRENCY"), Some("USD"));
        assert_eq!(row.get("Mouser_PRICE"), Some("0.05"));
        assert!(!row.contains("Farnell_PRICE"));

        let tail: Vec<&str> = table.schema().iter().skip(6).collect();
        assert_eq!(tail, vec!["Mouser_PARTNO", "Mouser_QTY", "Mouser_CURRENCY", "Mouser_PRICE"]);
        assert!(table.schema_covers_records());
    }

    #[test]
    fn test_apply_prices_reuses_schema_entries() {
        let mut table = table_with_parts(&[("U1", Some("A"), 1), ("U2", Some("B"), 1)]);
        let response: SearchResponse = serde_json::from_value(priced_response("Mouser", "X")).unwrap();

        apply_prices(&mut table, 0, &response, 1);
        let len = table.schema().len();
        apply_prices(&mut table, 1, &response, 1);

        assert_eq!(table.schema().len(), len);
        assert_eq!(table.records()[1].get("Mouser_PRICE"), Some("0.1"));
    }

    #[tokio::test]
    async fn test_enrich_looks_up_each_row_with_part_number() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("part", "RC0402"))
            .respond_with(ResponseTemplate::new(200).set_body_json(priced_response("Mouser", "603-RC0402")))
            .expect(2)
            .mount(&server)
            .await;

        let config = PricingConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        let client = FindChipsClient::new(&config, "key").unwrap();

        // Two rows with the same part number are looked up separately
        let mut table = table_with_parts(&[
            ("R1", Some("RC0402"), 1),
            ("C1", None, 1),
            ("R2", Some("RC0402"), 150),
        ]);
        let summary = PricingEnricher::new(&client, "Mfg_Part_No")
            .enrich(&mut table)
            .await
            .unwrap();

        assert_eq!(summary, PricingSummary { lookups: 2, priced_rows: 2, prices_written: 2 });
        assert_eq!(table.records()[0].get("Mouser_QTY"), Some("1"));
        assert!(!table.records()[1].contains("Mouser_QTY"));
        assert_eq!(table.records()[2].get("Mouser_QTY"), Some("100"));
        assert_eq!(table.records()[2].get("Mouser_PRICE"), Some("0.01"));
    }

    #[tokio::test]
    async fn test_enrich_stops_at_first_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("part", "A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(priced_response("Mouser", "1")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("part", "B"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("part", "C"))
            .respond_with(ResponseTemplate::new(200).set_body_json(priced_response("Mouser", "3")))
            .expect(0)
            .mount(&server)
            .await;

        let config = PricingConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        let client = FindChipsClient::new(&config, "key").unwrap();
        let mut table = table_with_parts(&[("U1", Some("A"), 1), ("U2", Some("B"), 1), ("U3", Some("C"), 1)]);

        let error = PricingEnricher::new(&client, "Mfg_Part_No")
            .enrich(&mut table)
            .await
            .unwrap_err();

        assert!(error.is_recoverable());
        assert_eq!(table.records()[0].get("Mouser_PARTNO"), Some("1"));
        assert!(!table.records()[1].contains("Mouser_PARTNO"));
        assert!(!table.records()[2].contains("Mouser_PARTNO"));
    }
}
