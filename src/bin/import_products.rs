// Import products from a local spreadsheet, bypassing HTTP.
//
// Usage:
//   cargo run --bin import_products -- <file.xlsx|file.csv> [--db PATH] [--batch ID]
//       [--update-existing] [--skip-duplicates] [--status draft|published|archived]
//       [--category ID] [--brand ID]
//
// Rows with critical errors are excluded; everything else is upserted.

use anyhow::Context;
use clap::Parser;
use showroom_import::config::{get_default_db_path, ConfigManager};
use showroom_import::db::{ensure_schema, open_sqlite_connection};
use showroom_import::domain::{ImportOptions, ProductStatus};
use showroom_import::importer::{ProductImporter, ProductImporterImpl};
use showroom_import::logging;
use showroom_import::repository::ProductRepositoryImpl;
use std::sync::{Arc, Mutex};

#[derive(Parser, Debug)]
#[command(name = "import_products")]
#[command(about = "Bulk import products from an Excel or CSV file")]
struct CliArgs {
    /// Spreadsheet to import (.xlsx / .xls / .csv)
    file_path: String,
    /// SQLite database path (defaults to the per-user data directory)
    #[arg(long = "db")]
    db_path: Option<String>,
    #[arg(long = "batch")]
    batch_id: Option<String>,
    #[arg(long = "category")]
    category_id: Option<String>,
    #[arg(long = "brand")]
    brand_id: Option<String>,
    #[arg(long, value_parser = parse_status)]
    status: Option<ProductStatus>,
    #[arg(long, default_value_t = false)]
    update_existing: bool,
    #[arg(long, default_value_t = false)]
    skip_duplicates: bool,
}

fn parse_status(raw: &str) -> Result<ProductStatus, String> {
    ProductStatus::parse_lenient(raw).ok_or_else(|| format!("invalid status: {}", raw))
}

impl CliArgs {
    fn import_options(&self) -> ImportOptions {
        ImportOptions {
            update_existing: self.update_existing,
            skip_duplicates: self.skip_duplicates,
            default_status: self.status,
            default_category_id: self.category_id.clone(),
            default_brand_id: self.brand_id.clone(),
            bulk_import_batch: self.batch_id.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let args = CliArgs::parse();
    let db_path = args.db_path.clone().unwrap_or_else(get_default_db_path);

    let conn =
        open_sqlite_connection(&db_path).with_context(|| format!("failed to open {}", db_path))?;
    ensure_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let product_repo = Arc::new(ProductRepositoryImpl::from_connection(conn.clone()));
    let config = Arc::new(
        ConfigManager::from_connection(conn).map_err(|e| anyhow::anyhow!(e.to_string()))?,
    );
    let importer = ProductImporterImpl::new(product_repo, config);

    let (result, commit) = importer
        .import_file(&args.file_path, None, &args.import_options())
        .await?;

    let report = serde_json::json!({
        "batchId": commit.batch_id,
        "results": commit.results,
        "originalResult": result.summary(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
