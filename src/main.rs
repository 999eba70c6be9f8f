use std::env;
use std::error::Error;
use std::path::Path;

use codefix::{CodefixConfig, Engine, KnowledgeBase, default_solutions};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SAMPLE_REPORTS: &[&str] = &[
    "My component does not re-render after I push an item into the state array",
    "useEffect hook keeps running forever and the page freezes",
    "onClick handler loses this context when passed as a prop",
    "Database connection pool exhausted under load",
];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if env::var("CODEFIX_LOG_JSON").is_ok_and(|v| v == "1") {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Usage: `codefix [CONFIG.yaml] [REPORT...]`
fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let mut args = env::args().skip(1).peekable();
    let config = match args.peek() {
        Some(first) if first.ends_with(".yaml") || first.ends_with(".yml") => {
            let path = args.next().unwrap_or_default();
            info!(path = %path, "loading config");
            CodefixConfig::from_file(Path::new(&path))?
        }
        _ => CodefixConfig::default(),
    };
    let reports: Vec<String> = args.collect();

    let docs = config
        .knowledge_base
        .read_documents()?
        .unwrap_or_else(default_solutions);
    let embedder = config.embedder();
    // Load must finish before the first lookup; a bad knowledge base aborts here.
    let kb = KnowledgeBase::build(docs, &embedder, config.load_options())?;
    let engine = Engine::new(kb, config.policy())?;
    println!("{}", serde_json::to_string_pretty(&engine.status())?);

    let reports: Vec<&str> = if reports.is_empty() {
        SAMPLE_REPORTS.to_vec()
    } else {
        reports.iter().map(String::as_str).collect()
    };

    for report in reports {
        let verdict = engine.analyze(report, &embedder);
        println!("> {report}");
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    }

    println!("{}", serde_json::to_string_pretty(&engine.metrics())?);
    Ok(())
}
