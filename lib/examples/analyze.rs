use anyhow::{Context, Result};
use crossplay_solver::{Analyzer, AnalyzerConfig, Dictionary, UncertainPolicy};
use std::sync::Arc;
use std::time::Instant;

fn run() -> Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let usage = "Usage: analyze SCREENSHOT WORDLIST [--guess]";
    let path = args.next().expect(usage);
    let wordlist = args.next().expect(usage);
    let policy = match args.next().as_deref() {
        Some("--guess") => UncertainPolicy::BestGuess,
        _ => UncertainPolicy::Reject,
    };

    let t0 = Instant::now();
    let dictionary = Dictionary::from_file(&wordlist)
        .with_context(|| format!("Failed to load {}", wordlist))?;
    println!("loaded {} words in {:?}", dictionary.len(), t0.elapsed());

    let config = AnalyzerConfig::default()
        .with_top_n(Some(10))
        .with_uncertain_policy(policy);
    let analyzer = Analyzer::new(config, Arc::new(dictionary));
    let t0 = Instant::now();
    let analysis = analyzer
        .analyze_file(&path)
        .with_context(|| format!("Failed to analyze {}", path))?;
    println!("analyze took {:?}", t0.elapsed());
    println!("{}\n", analysis.state.board);
    println!("Rack: {}", analysis.state.rack);
    if analysis.moves.is_empty() {
        println!("No legal moves");
    }
    for m in &analysis.moves {
        println!("{}", m);
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:?}", err);
    }
}
