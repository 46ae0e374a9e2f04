//! Export pipeline: load, group, price, write.

use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::findchips::FindChipsClient;
use crate::pricing::{PricingEnricher, PricingSummary};
use kicad_bom_models::BomTable;
use kicad_bom_utils::{
    BomError, BomGrouper, BomResult, GroupingConfig, NetlistLoader, NetlistValidator, OutputPaths,
    PricingConfig, PricingService, ReportWriter,
};

/// Everything one export run needs, already validated
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub input: PathBuf,
    pub output_base: PathBuf,
    pub grouping: GroupingConfig,
    pub pricing: PricingConfig,
}

/// What a run produced
#[derive(Debug)]
pub struct ExportReport {
    pub components: usize,
    pub rows: usize,
    pub paths: OutputPaths,
    pub pricing: Option<PricingSummary>,
    /// Set when the pricing pass was cut short
    pub pricing_error: Option<BomError>,
    pub table: BomTable,
}

pub async fn run_export(options: &ExportOptions) -> BomResult<ExportReport> {
    let netlist = NetlistLoader::new().load_file(&options.input)?;

    NetlistValidator::new(options.grouping.part_number_field.as_str())
        .validate(&netlist.components)
        .log();

    let mut table = BomTable::new();
    let summary = BomGrouper::new(options.grouping.clone()).add_all(&netlist.components, &mut table)?;
    info!(
        "{} components in {} rows ({} grouped)",
        summary.components, summary.rows, summary.merged
    );

    let mut pricing = None;
    let mut pricing_error = None;
    match options.pricing.service {
        Some(service) if table.schema().contains(&options.grouping.part_number_field) => {
            match price(service, options, &mut table).await {
                Ok(result) => pricing = Some(result),
                Err(e) if e.is_recoverable() => {
                    error!(error = %e, "Pricing stopped early");
                    println!("Error returned by pricing service - check log file");
                    pricing_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Some(service) => {
            warn!(
                "{} pricing requested but no component has a {} field",
                service, options.grouping.part_number_field
            );
        }
        None => {}
    }

    let paths = OutputPaths::from_base(&options.output_base);
    let writer = ReportWriter::new();

    writer.write_csv_file(&table, &paths.csv)?;
    println!("Created CSV File");
    info!("Created CSV file with {} items: {}", table.len(), paths.csv.display());

    writer.write_xml_file(&table, &paths.xml)?;
    println!("Created XML File");
    info!("Created XML file with {} items: {}", table.len(), paths.xml.display());

    Ok(ExportReport {
        components: summary.components,
        rows: table.len(),
        paths,
        pricing,
        pricing_error,
        table,
    })
}

async fn price(
    service: PricingService,
    options: &ExportOptions,
    table: &mut BomTable,
) -> BomResult<PricingSummary> {
    let api_key = options.pricing.api_key.as_deref().ok_or_else(|| {
        BomError::configuration(format!("Have asked for online pricing {} but no API Key given", service))
    })?;

    match service {
        PricingService::FindChips => {
            let client = FindChipsClient::new(&options.pricing, api_key)?;
            PricingEnricher::new(&client, options.grouping.part_number_field.as_str())
                .enrich(table)
                .await
        }
    }
}
