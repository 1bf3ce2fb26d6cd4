use anyhow::Result;
use clap::Args;
use eligibility_session::{CALLING_CODES, DEFAULT_CALLING_CODE};

use crate::cmd::i18n::tr;

#[derive(Args, Debug, Clone, Default)]
pub struct CountryCodesArgs {
    /// Emit the list as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

pub fn run(args: CountryCodesArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(CALLING_CODES)?);
        return Ok(());
    }
    println!("{}", tr("cli.country_codes.header"));
    for entry in CALLING_CODES {
        let marker = if entry.code == DEFAULT_CALLING_CODE {
            " *"
        } else {
            ""
        };
        println!("  {}{marker}", entry.label);
    }
    Ok(())
}
