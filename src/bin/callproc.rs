//! Calls one stored procedure directly and prints what it returns.
//!
//! ```text
//! callproc Select_Files '{"data":"ALL"}' --list file_lists
//! ```

use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;
use uweek::{
    client::ProcedureResult,
    procedures::Procedure,
    rpc::runner::{MysqlRunner, ProcedureRunner},
    settings::{Profile, Settings},
    state::build_pool,
};

#[derive(Parser)]
pub struct CallProc {
    /// Name of the stored procedure.
    spname: String,
    /// The JSON payload passed as the procedure's argument.
    #[clap(default_value = "{}")]
    data: String,
    /// Connect to this database instead of the configured one.
    #[clap(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    #[clap(long, short)]
    config: Option<PathBuf>,
    #[clap(long, env = "APP_PROFILE", default_value = "dev")]
    profile: Profile,
    /// Print the decoded rows of this list field. Known procedures default
    /// to their usual field.
    #[clap(long)]
    list: Option<String>,
    /// Print the raw row even when the procedure reports a failure.
    #[clap(long, action)]
    raw: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = CallProc::parse();

    let data: Value = serde_json::from_str(&args.data)
        .unwrap_or_else(|e| panic!("payload is not valid JSON: {e}"));

    let url = match args.database_url {
        Some(url) => url,
        None => Settings::load(args.config.as_deref(), args.profile)
            .and_then(|settings| settings.database.url())
            .unwrap_or_else(|e| panic!("could not load settings: {e}")),
    };

    if args.spname.parse::<Procedure>().is_err() {
        tracing::warn!("`{}` is not one of the known procedures", args.spname);
    }

    let runner = MysqlRunner::new(build_pool(&url, 1));
    let row = match runner.call(&args.spname, data.to_string()).await {
        Ok(Some(row)) => row,
        Ok(None) => {
            println!("(no rows)");
            return;
        }
        Err(e) => {
            eprintln!("call failed: {e}");
            std::process::exit(1);
        }
    };

    if args.raw {
        print_json(&row);
        return;
    }

    let result = match ProcedureResult::from_row(row) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let field = args.list.or_else(|| {
        args.spname
            .parse::<Procedure>()
            .ok()
            .and_then(Procedure::list_field)
            .map(str::to_string)
    });

    match field.as_deref() {
        Some("log_details") => {
            for line in result.log_lines() {
                println!("{line}");
            }
        }
        Some(field) => {
            for row in result.list::<Value>(field) {
                print_json(&row);
            }
        }
        None => {
            if let Some(message) = result.message() {
                println!("{message}");
            }
        }
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{value}"),
    }
}
