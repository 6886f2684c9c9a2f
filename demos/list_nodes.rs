//! List one page of public nodes using a declared resource client.
//!
//! Run:
//! `cargo run --example list_nodes`
//!
//! Optional env vars:
//! - `OSF_API_URL` (defaults to the public OSF API)
//! - `OSF_ACCESS_TOKEN` (sent as a bearer token)

use std::sync::Arc;

use osf_resources::{ApiContext, DEFAULT_API_URL, ListOptions, resources};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::var("OSF_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
    let mut context = ApiContext::new(base_url)?;
    if let Ok(token) = std::env::var("OSF_ACCESS_TOKEN") {
        context = context.with_authorization_token(token);
    }
    let context = Arc::new(context);

    let nodes = context.client(resources::nodes())?;
    let page = nodes.list(&ListOptions::new().page_size(10)).await?;

    for node in &page {
        println!("{node} {}", node.get_str("title").unwrap_or("(untitled)"));
    }
    if let Some(next) = page.next_page_url() {
        println!("next page: {next}");
    }
    Ok(())
}
