//! Shows story previews one after another; press Enter for the next one.
//!
//! ```sh
//! cargo run -- [config.toml] [analyses.json]
//! ```
//!
//! `analyses.json` holds an array of story analyses. Without it the fallback
//! analyses of every industry are shown.

use anyhow::Context;
use story_ngin::{Generation, Industry, PreviewConfig, StoryAnalysis};

fn load_generations(path: Option<&str>) -> anyhow::Result<Vec<Generation>> {
    let analyses = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("could not read analyses from {}", path))?;
            serde_json::from_str::<Vec<StoryAnalysis>>(&json)
                .with_context(|| format!("{} is not an array of analyses", path))?
        }
        None => [Industry::Gaming, Industry::Education, Industry::Architecture]
            .into_iter()
            .map(StoryAnalysis::fallback)
            .collect(),
    };

    Ok(analyses
        .into_iter()
        .enumerate()
        .map(|(i, analysis)| Generation::new(format!("scene-{}", i + 1), analysis))
        .collect())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match args.first() {
        Some(path) => PreviewConfig::load(path)
            .with_context(|| format!("could not load config {}", path))?,
        None => PreviewConfig::default(),
    };
    let generations = load_generations(args.get(1).map(String::as_str))?;

    story_ngin::flow::run(config, generations)
}
