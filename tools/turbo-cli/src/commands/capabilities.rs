//! List exposed capabilities.

use anyhow::{bail, Result};
use serde::Serialize;

use super::CapabilitiesArgs;
use crate::context::Context;

#[derive(Serialize)]
struct OperationInfo<'a> {
    group: &'a str,
    operation: &'a str,
    provider: &'a str,
}

/// Run the capabilities command.
pub async fn run(args: CapabilitiesArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client(false)?;

    let groups: Vec<&str> = match &args.group {
        Some(group) if client.capability(group).is_none() => bail!("Capability '{}' is not exposed", group),
        Some(group) => vec![group.as_str()],
        None => client.capabilities().collect(),
    };

    let mut rows = Vec::new();
    for group in groups {
        let Some(capability) = client.capability(group) else {
            continue;
        };
        for name in capability.operations() {
            if let Some(operation) = capability.operation(name) {
                rows.push(OperationInfo {
                    group: capability.name(),
                    operation: name,
                    provider: operation.provider(),
                });
            }
        }
    }

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    if let Some(path) = &ctx.config_path {
        ctx.output.info(&format!("Config: {}", path.display()));
    }
    ctx.output.header("Capabilities");
    for row in &rows {
        ctx.output.list_item(&format!("{}.{} ({})", row.group, row.operation, row.provider));
    }
    ctx.output.success(&format!("{} operations exposed", rows.len()));

    Ok(())
}
