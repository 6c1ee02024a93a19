use clap::{Arg, ArgAction, Command, value_parser};
use rueo_markup::{
    MarkupConfig, load_config_from_file, load_shortenings_from_file, parse_article,
    split_articles,
};
use rueo_review::{
    CandidateDecision, ReviewError, ReviewResult, apply_candidate_selection, format_review,
    needs_review, review_batch,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn file_arg() -> Arg {
    Arg::new("file")
        .help("Dictionary file, articles separated by blank lines")
        .required(true)
        .index(1)
}

fn cli() -> Command {
    Command::new("rueo-review")
        .version("0.1.0")
        .about("Parse rueo dictionary articles and review their translations")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every pipeline stage")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("JSON file with abbreviations, labels and indent width")
                .global(true),
        )
        .arg(
            Arg::new("shortenings")
                .long("shortenings")
                .help("List of 'сокр. - расшифровка' lines added to the known labels")
                .global(true),
        )
        .subcommand(
            Command::new("parse")
                .about("Print the block tree of every article as JSON")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("review")
                .about("Print translation candidate groups for every article")
                .arg(file_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print JSON instead of the text report")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("jobs")
                        .long("jobs")
                        .short('j')
                        .help("Articles reviewed at the same time")
                        .value_parser(value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    Arg::new("decisions")
                        .long("decisions")
                        .help("JSON object of earlier decisions, keyed by headword"),
                ),
        )
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "rueo_review=debug,rueo_markup=debug"
    } else {
        "rueo_review=info,rueo_markup=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(config: Option<&String>, shortenings: Option<&String>) -> ReviewResult<MarkupConfig> {
    let mut markup = match config {
        Some(path) => load_config_from_file(Path::new(path)).map_err(ReviewError::Config)?,
        None => MarkupConfig::default(),
    };
    if let Some(path) = shortenings {
        let added = load_shortenings_from_file(Path::new(path), &mut markup.labels)
            .map_err(ReviewError::Config)?;
        tracing::info!(added, path = %path, "shortenings loaded");
    }
    Ok(markup)
}

fn load_decisions(path: &str) -> ReviewResult<HashMap<String, Vec<CandidateDecision>>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn read_articles(path: &str) -> ReviewResult<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let articles = split_articles(&content);
    tracing::info!(path, articles = articles.len(), "dictionary file read");
    Ok(articles)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let config = load_config(
        matches.get_one::<String>("config"),
        matches.get_one::<String>("shortenings"),
    )?;

    match matches.subcommand() {
        Some(("parse", sub)) => {
            let file = sub
                .get_one::<String>("file")
                .ok_or_else(|| ReviewError::Other("missing dictionary file".to_string()))?;
            let parsed: Vec<_> = read_articles(file)?
                .iter()
                .map(|article| parse_article(article, &config))
                .collect();
            for article in &parsed {
                for issue in &article.issues {
                    tracing::warn!(headword = article.headword.display_name(), "{}", issue);
                }
            }
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Some(("review", sub)) => {
            let file = sub
                .get_one::<String>("file")
                .ok_or_else(|| ReviewError::Other("missing dictionary file".to_string()))?;
            let jobs = sub.get_one::<usize>("jobs").copied().unwrap_or(4);
            let decisions = match sub.get_one::<String>("decisions") {
                Some(path) => load_decisions(path)?,
                None => HashMap::new(),
            };

            let articles = read_articles(file)?;
            let outcomes = review_batch(articles, Arc::new(config), jobs).await;

            let mut payloads = Vec::with_capacity(outcomes.len());
            let mut pending = 0;
            for outcome in outcomes {
                match outcome.result {
                    Ok(mut review) => {
                        if let Some(earlier) = decisions.get(&review.headword) {
                            apply_candidate_selection(&mut review.groups, earlier);
                        }
                        if needs_review(&review.groups) {
                            pending += 1;
                        }
                        if sub.get_flag("json") {
                            payloads.push(serde_json::json!({
                                "index": outcome.index,
                                "review": review,
                            }));
                        } else {
                            println!("{}", format_review(&review));
                        }
                    }
                    Err(e) => {
                        eprintln!("❌ article {}: {}", outcome.index, e);
                        if sub.get_flag("json") {
                            payloads.push(serde_json::json!({
                                "index": outcome.index,
                                "error": e.to_string(),
                            }));
                        }
                    }
                }
            }

            if sub.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&payloads)?);
            }
            tracing::info!(pending, "articles waiting for review");
        }
        _ => unreachable!("subcommand_required is set"),
    }

    Ok(())
}
