//! Create an index from a struct, then add a field to its mapping.
//!
//! Expects a cluster at `ELASTICSEARCH_URL` (default `http://localhost:9200`).
//! Pass `v7` as the first argument to talk to a 7.x cluster.
//!
//! ```sh
//! cargo run --example mapping_roundtrip -- v8
//! ```

use chrono::{DateTime, Utc};
use esconvert::{EsConfig, EsMapping, EsVersion, MappingTool, connect};
use serde::Serialize;

#[derive(Serialize, EsMapping)]
#[allow(dead_code)]
struct Trade {
    mid: String,
    date: DateTime<Utc>,
    number: i32,
}

#[derive(Serialize, EsMapping)]
#[allow(dead_code)]
struct TradeWithParam {
    mid: String,
    date: DateTime<Utc>,
    number: i32,
    new_param: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    esconvert_log::init();

    let version: EsVersion = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "v8".to_string())
        .parse()?;

    let config = EsConfig::from_env().ignore_above(256);
    let tool = connect(version, &config)?;
    let index = "esconvert_demo_trades";

    println!("create: {}", tool.create_for::<Trade>(index).await?);
    println!("mapping: {}", tool.get_mapping(index).await?);

    let tool: Box<dyn MappingTool> = Box::new(tool);
    let record = TradeWithParam {
        mid: "m-1".to_string(),
        date: Utc::now(),
        number: 1,
        new_param: 2,
    };
    println!("put: {}", tool.put(index, &record).await?);
    println!("mapping: {}", tool.get_mapping(index).await?);

    Ok(())
}
