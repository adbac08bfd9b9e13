//! Password-protected HTML page for browsing and editing entries.

use futures::future::try_join_all;
use lambda_http::http::Method;
use lambda_http::{Body, Error, Request, Response};

use crate::auth::{admin_authorized, unauthorized};
use crate::handler::Ctx;
use crate::html::render_page;
use crate::model::LinkEntry;
use crate::store::PutOptions;
use crate::util::{body_bytes, resp_html, see_other};

#[derive(Debug, PartialEq, Eq)]
enum FormAction {
    BulkDelete(Vec<String>),
    Upsert { key: String, value: String },
    Ignore,
}

fn parse_form(body: &[u8]) -> FormAction {
    let mut action = None;
    let mut selected = Vec::new();
    let mut key = None;
    let mut value = None;

    for (name, v) in url::form_urlencoded::parse(body) {
        match name.as_ref() {
            "action" => action = Some(v.into_owned()),
            "keys_to_delete" => selected.push(v.into_owned()),
            "key" if key.is_none() => key = Some(v.into_owned()),
            "value" if value.is_none() => value = Some(v.into_owned()),
            _ => {}
        }
    }

    if action.as_deref() == Some("bulk_delete") {
        return FormAction::BulkDelete(selected);
    }
    match (key, value) {
        (Some(key), Some(value)) if !key.is_empty() && !value.is_empty() => {
            FormAction::Upsert { key, value }
        }
        _ => FormAction::Ignore,
    }
}

pub async fn handle_admin(req: Request, ctx: &Ctx) -> Result<Response<Body>, Error> {
    if !admin_authorized(req.headers(), &ctx.config) {
        tracing::info!(path = %req.uri().path(), "admin request without valid credentials");
        return unauthorized();
    }

    if req.method() == Method::POST {
        apply_form(&req, ctx).await?;
        return see_other(&req.uri().to_string());
    }

    render_listing(ctx).await
}

async fn apply_form(req: &Request, ctx: &Ctx) -> Result<(), Error> {
    match parse_form(&body_bytes(req)) {
        FormAction::BulkDelete(keys) => {
            if keys.is_empty() {
                return Ok(());
            }
            try_join_all(keys.iter().map(|k| ctx.store.delete(k))).await?;
            tracing::info!(count = keys.len(), "bulk delete");
        }
        FormAction::Upsert { key, value } => {
            ctx.store.put(&key, &value, PutOptions::default()).await?;
            tracing::info!(key = %key, "entry saved");
        }
        FormAction::Ignore => {
            tracing::debug!("form submission without a usable key/value");
        }
    }
    Ok(())
}

async fn render_listing(ctx: &Ctx) -> Result<Response<Body>, Error> {
    let keys = ctx.store.list().await?;
    let values = try_join_all(keys.iter().map(|k| ctx.store.get(k))).await?;

    // A key can expire or be deleted between list and get.
    let entries: Vec<LinkEntry> = keys
        .into_iter()
        .zip(values)
        .filter_map(|(key, value)| value.map(|value| LinkEntry { key, value }))
        .collect();

    resp_html(render_page(&entries))
}
