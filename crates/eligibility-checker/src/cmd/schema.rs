use anyhow::Result;
use clap::Args;
use eligibility_session::session_schema;

#[derive(Args, Debug, Clone, Default)]
pub struct SchemaArgs {}

pub fn run(_args: SchemaArgs) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&session_schema())?);
    Ok(())
}
