//! `protochain init` — scaffold configuration, pattern documents, and a
//! starter reservoir in the current directory.

use protochain_config::{AppConfig, CONFIG_FILE};
use std::path::Path;

const EXTRACT_MD: &str = "\
# Extract

Read the user input closely and extract its essential claims, observations,
and questions. Quote or closely paraphrase the source; do not interpret yet.
Present the extractions as a flat list, one item per idea.
";

const ATOMIZE_MD: &str = "\
# Atomize

Take the extracted material and break each item into atomic abstractions:
single, self-contained statements that stand on their own without the
surrounding text. Name each abstraction with a short handle and give its
one-sentence definition.
";

const REFLECT_MD: &str = "\
# Reflect

Examine the newly atomized abstractions against the supplied theory and
guidance. Note tensions, overlaps, and gaps. Where two abstractions
conflict, say which reading you favor and why.
";

const INTEGRATE_MD: &str = "\
# Integrate

Weave the reflected abstractions into the existing body of material.
Produce a consolidated statement that a later run could build on: merged
abstractions first, open questions last.
";

const INTUITION_RESERVOIR_MD: &str = "\
# Intuition Reservoir

Accumulated heuristics for working with raw material:

- Prefer the author's own words over summaries when extracting.
- An abstraction that needs its source text to make sense is not atomic yet.
- Conflicts between abstractions are signal, not noise; keep both sides.
";

const ABSTRACTION_THEORY_MD: &str = "\
# Abstraction Theory

An abstraction is a named, self-contained statement with a stable meaning
across contexts. Good abstractions compose: integrating two of them should
not require re-reading their sources. When integration fails, the fault is
usually an abstraction that smuggled in unstated context.
";

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        return Err(format!("{CONFIG_FILE} already exists; refusing to overwrite").into());
    }

    let config = AppConfig::default();

    std::fs::write(config_path, AppConfig::default_toml())?;
    println!("  Wrote {CONFIG_FILE}");

    std::fs::create_dir_all(&config.paths.patterns_dir)?;
    let patterns = [
        ("Extract.md", EXTRACT_MD),
        ("Atomize.md", ATOMIZE_MD),
        ("Reflect.md", REFLECT_MD),
        ("Integrate.md", INTEGRATE_MD),
    ];
    for (name, content) in patterns {
        let path = config.paths.patterns_dir.join(name);
        if path.exists() {
            println!("  Keeping existing {}", path.display());
            continue;
        }
        std::fs::write(&path, content)?;
        println!("  Wrote {}", path.display());
    }

    std::fs::create_dir_all(&config.paths.reservoir_dir)?;
    let reservoirs = [
        ("Intuition_Reservoir.md", INTUITION_RESERVOIR_MD),
        ("Abstraction_Theory.md", ABSTRACTION_THEORY_MD),
    ];
    for (name, content) in reservoirs {
        let path = config.paths.reservoir_dir.join(name);
        if path.exists() {
            println!("  Keeping existing {}", path.display());
            continue;
        }
        std::fs::write(&path, content)?;
        println!("  Wrote {}", path.display());
    }

    println!();
    println!("  Ready. Set ANTHROPIC_API_KEY (or PROTOCHAIN_API_KEY), then:");
    println!("    protochain run");
    println!();

    Ok(())
}
