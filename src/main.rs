//! Apigee Provider CLI
//!
//! Runs one resource operation against a JSON state document:
//!
//! ```text
//! apigee_provider <cache|environment_kvm> <create|read|update|delete|apply|import> <state.json> [id]
//! ```
//!
//! The document holds `id`, `prior` and `attributes`. After the operation
//! the refreshed attributes are saved as the new prior state.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apigee_provider::{ApigeeClient, Config, ResourceData, ResourceKind};

const USAGE: &str = "usage: apigee_provider <cache|environment_kvm> \
                     <create|read|update|delete|apply|import> <state.json> [import-id]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Apply,
    Import,
}

impl FromStr for Operation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Operation::Create),
            "read" => Ok(Operation::Read),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            "apply" => Ok(Operation::Apply),
            "import" => Ok(Operation::Import),
            other => bail!("unknown operation '{}'\n{}", other, USAGE),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    kind: ResourceKind,
    operation: Operation,
    state_path: PathBuf,
    import_id: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let kind = args.next().ok_or_else(|| anyhow!(USAGE))?;
    let kind = ResourceKind::from_type_name(&kind)
        .ok_or_else(|| anyhow!("unknown resource type '{}'\n{}", kind, USAGE))?;
    let operation: Operation = args.next().ok_or_else(|| anyhow!(USAGE))?.parse()?;
    let state_path = PathBuf::from(args.next().ok_or_else(|| anyhow!(USAGE))?);
    let import_id = args.next();

    if operation == Operation::Import && import_id.is_none() {
        bail!("import needs the id of the existing resource\n{}", USAGE);
    }
    Ok(Args {
        kind,
        operation,
        state_path,
        import_id,
    })
}

fn load_state(path: &Path) -> Result<ResourceData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("state file {} is not a valid state document", path.display()))
}

fn save_state(path: &Path, data: &ResourceData) -> Result<()> {
    let raw = serde_json::to_string_pretty(data)?;
    fs::write(path, raw).with_context(|| format!("failed to write state file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apigee_provider=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = parse_args(std::env::args().skip(1))?;

    let config = Config::from_env();
    info!(
        "Configuration loaded: organization={}, server={}, public={}",
        config.organization,
        config.server,
        config.is_public()
    );
    let client = ApigeeClient::from_config(&config)?;
    let kind = args.kind;

    let mut data = match (&args.operation, &args.import_id) {
        (Operation::Import, Some(id)) => kind.import(&client, id).await?,
        _ => load_state(&args.state_path)?,
    };

    match args.operation {
        Operation::Create => kind.create(&client, &mut data).await?,
        Operation::Read => kind.read(&client, &mut data).await?,
        Operation::Update => kind.update(&client, &mut data).await?,
        Operation::Delete => kind.delete(&client, &mut data).await?,
        Operation::Apply => kind.apply(&client, &mut data).await?,
        Operation::Import => {}
    }

    data.commit();
    save_state(&args.state_path, &data)?;
    debug!(
        "State saved: id={:?} attributes={:?}",
        data.id(),
        kind.schema().redacted(data.current())
    );
    info!(
        "{} {:?} complete, state written to {}",
        kind.type_name(),
        args.operation,
        args.state_path.display()
    );
    Ok(())
}
