//! Invoke a capability operation.

use anyhow::{bail, Context as _, Result};
use serde_json::Value;
use turbo_core::RequestContext;

use super::CallArgs;
use crate::context::Context;
use crate::output::cache_badge;

/// Run the call command.
pub async fn run(args: CallArgs, ctx: &Context) -> Result<()> {
    let input: Value = serde_json::from_str(&args.input).context("--input is not valid JSON")?;
    let client = ctx.client(args.cache)?;

    let Some(operation) = client.operation(&args.group, &args.operation) else {
        bail!(
            "{}.{} is not exposed; run `turbo capabilities` to list operations",
            args.group,
            args.operation
        );
    };

    let mut request = request_context(&args);
    ctx.output.debug(&format!("Correlation id {}", request.correlation_id));

    let repeat = args.repeat.max(1);
    let mut last = None;
    for attempt in 1..=repeat {
        match operation.call_raw(&input, &mut request).await {
            Ok(response) => {
                if repeat > 1 {
                    ctx.output.kv(&format!("call {}", attempt), &cache_badge(response.meta.cache));
                }
                last = Some(response);
            }
            Err(error) => {
                if ctx.output.is_json() {
                    ctx.output.json(&error);
                }
                bail!("{} failed: {}", operation.path(), error);
            }
        }
    }

    let Some(response) = last else {
        return Ok(());
    };

    if ctx.output.is_json() {
        ctx.output.json(&response);
        return Ok(());
    }

    ctx.output.header(&response.meta.procedure);
    ctx.output.kv("provider", &response.meta.provider);
    ctx.output.kv("cache", &cache_badge(response.meta.cache));
    if let Some(key) = &response.meta.cache_key {
        ctx.output.kv("cache key", key);
    }
    ctx.output.json(&response.value);

    if ctx.output.is_verbose() {
        for name in request.session.extension_names() {
            if let Some(state) = request.session.extension_value(name) {
                ctx.output.debug(&format!("session[{}] = {}", name, state));
            }
        }
    }

    Ok(())
}

fn request_context(args: &CallArgs) -> RequestContext {
    let mut request = RequestContext::new()
        .with_locale(&args.locale)
        .with_currency(&args.currency);
    if let Some(store) = &args.store {
        request = request.with_store(store);
    }
    if let Some(user_agent) = &args.user_agent {
        request = request.with_user_agent(user_agent);
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CallArgs {
        CallArgs {
            group: "product".into(),
            operation: "byId".into(),
            input: "{}".into(),
            locale: "de-DE".into(),
            currency: "EUR".into(),
            store: Some("eu".into()),
            user_agent: Some("AhrefsBot".into()),
            repeat: 1,
            cache: false,
        }
    }

    #[test]
    fn test_request_context_from_args() {
        let request = request_context(&args());
        assert_eq!(request.locale(), "de-DE");
        assert_eq!(request.currency_code(), "EUR");
        assert_eq!(request.store_identifier.key, "eu");
        assert!(request.is_bot);
    }
}
