//! Fetch a user and list the nodes linked from their record.
//!
//! Run:
//! `cargo run --example follow_links -- <user-id> [attribute]`
//!
//! The attribute defaults to `nodes`. Any attribute whose value was an API
//! collection URL can be followed.

use std::sync::Arc;

use osf_resources::{ApiContext, ListOptions, resources};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let Some(user_id) = args.next() else {
        eprintln!("Usage: follow_links <user-id> [attribute]");
        std::process::exit(2);
    };
    let attribute = args.next().unwrap_or_else(|| "nodes".to_owned());

    let context = Arc::new(ApiContext::from_default_url()?);
    let user = context.client(resources::users())?.detail(&user_id).await?;
    println!("{user}");

    let Some(linked) = user.link(&attribute) else {
        eprintln!("{user} has no linked collection under '{attribute}'");
        std::process::exit(1);
    };
    for record in linked.list(&ListOptions::new()).await? {
        println!("  {record}");
    }
    Ok(())
}
